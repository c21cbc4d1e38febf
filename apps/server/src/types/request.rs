// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request types for the API.

use frag_viewer_core::Viewport;
use serde::Deserialize;

/// New dimensions of the mount point.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ResizeRequest {
    pub width: u32,
    pub height: u32,
}

impl From<ResizeRequest> for Viewport {
    fn from(req: ResizeRequest) -> Self {
        Viewport::new(req.width, req.height)
    }
}

/// A user-supplied fragment path or URL.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadCustomRequest {
    /// Absolute URL, rooted path (`/fragments/x.frag`) or bare file name.
    pub path: String,
}
