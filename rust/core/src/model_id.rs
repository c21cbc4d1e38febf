// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model identifiers derived from fragment paths.

/// File extension used when exporting a model.
pub const FRAGMENT_EXTENSION: &str = "frag";

/// Derive the model identifier for a fragment path.
///
/// Takes the last `/`-separated segment and keeps everything before its
/// first `.`, so `/fragments/school_arq.ifc.frag` becomes `school_arq`.
/// Returns `None` when nothing is left.
pub fn derive_model_id(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let stem = segment.split('.').next().unwrap_or(segment);
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// File name a model is exported under.
pub fn fragment_file_name(model_id: &str) -> String {
    format!("{}.{}", model_id, FRAGMENT_EXTENSION)
}

/// Validate a model id before it is used as a file name.
///
/// Rejects empty ids, path separators and parent references.
pub fn validate_file_stem(model_id: &str) -> Result<(), String> {
    if model_id.is_empty() {
        return Err("model id cannot be empty".to_string());
    }
    if model_id.contains('/') || model_id.contains('\\') || model_id.contains("..") {
        return Err(format!(
            "model id '{}' contains path separators or parent references",
            model_id
        ));
    }
    if model_id.chars().any(|c| c.is_control()) {
        return Err(format!("model id '{}' contains control characters", model_id));
    }
    Ok(())
}
