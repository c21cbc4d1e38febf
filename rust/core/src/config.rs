// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer configuration.

use crate::camera::CameraPreset;
use serde::Serialize;

/// Worker script handed to the fragment engine at mount.
pub const DEFAULT_WORKER_URL: &str = "https://thatopen.github.io/engine_fragment/resources/worker.mjs";

/// Demo fragments loaded by the "Load Fragments" action.
pub const DEFAULT_FRAGMENTS: [&str; 2] = [
    "https://thatopen.github.io/engine_components/resources/frags/school_arq.frag",
    "https://thatopen.github.io/engine_components/resources/frags/school_str.frag",
];

/// Substring identifying the architectural model.
pub const DEFAULT_ARCH_PATTERN: &str = "arq";

/// Settings for [`crate::ViewerController`].
#[derive(Debug, Clone, Serialize)]
pub struct ViewerConfig {
    /// Base URL that rooted fragment paths are resolved against.
    pub base_url: String,
    /// Directory (under `base_url`) holding bare fragment names.
    pub fragments_dir: String,
    pub worker_url: String,
    /// Paths loaded by [`crate::ViewerController::load_fragments`].
    pub default_fragments: Vec<String>,
    /// Model ids containing this substring count as architectural.
    pub arch_pattern: String,
    pub camera: CameraPreset,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".into(),
            fragments_dir: "fragments".into(),
            worker_url: DEFAULT_WORKER_URL.into(),
            default_fragments: DEFAULT_FRAGMENTS.iter().map(|s| s.to_string()).collect(),
            arch_pattern: DEFAULT_ARCH_PATTERN.into(),
            camera: CameraPreset::default(),
        }
    }
}
