// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use frag_viewer_core::{LoadReport, Viewport};
use serde::Serialize;

/// Result of loading the default fragment batch.
#[derive(Debug, Clone, Serialize)]
pub struct LoadResponse {
    /// Model ids added to the collection, in completion order.
    pub loaded: Vec<String>,
    /// Paths skipped because no model id could be derived.
    pub skipped: Vec<String>,
    /// Resident models after the batch.
    pub models_count: usize,
}

impl LoadResponse {
    pub fn new(report: LoadReport, models_count: usize) -> Self {
        Self {
            loaded: report.loaded,
            skipped: report.skipped,
            models_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadCustomResponse {
    pub model_id: String,
    pub models_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteArchResponse {
    /// Disposed model, or `None` when no id matched the pattern.
    pub deleted: Option<String>,
    pub models_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteAllResponse {
    pub removed: usize,
}

/// Files written by "download all".
#[derive(Debug, Clone, Serialize)]
pub struct DownloadResponse {
    pub directory: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResizeResponse {
    /// False when the viewer was not ready and the call was ignored.
    pub resized: bool,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraRestResponse {
    pub redrawn: bool,
}

/// First event on the model stream: the models resident at subscription.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEvent {
    pub models: Vec<String>,
}
