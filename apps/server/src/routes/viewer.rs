// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer state and viewport endpoints.

use crate::error::ApiError;
use crate::types::{CameraRestResponse, ResizeRequest, ResizeResponse};
use crate::AppState;
use axum::{extract::State, Json};
use frag_viewer_core::{ViewModel, Viewport};

/// GET /api/v1/viewer - Current view model.
pub async fn view(State(state): State<AppState>) -> Json<ViewModel> {
    Json(state.viewer.view())
}

/// POST /api/v1/viewer/resize - Track a new viewport size.
pub async fn resize(
    State(state): State<AppState>,
    Json(request): Json<ResizeRequest>,
) -> Result<Json<ResizeResponse>, ApiError> {
    if request.width == 0 || request.height == 0 {
        return Err(ApiError::BadRequest(format!(
            "viewport must be non-empty, got {}x{}",
            request.width, request.height
        )));
    }

    let viewport = Viewport::from(request);
    let resized = state.viewer.resize(viewport);
    tracing::debug!(width = viewport.width, height = viewport.height, resized, "Resize");

    Ok(Json(ResizeResponse { resized, viewport }))
}

/// POST /api/v1/viewer/camera-rest - The camera stopped moving.
pub async fn camera_rest(State(state): State<AppState>) -> Json<CameraRestResponse> {
    Json(CameraRestResponse {
        redrawn: state.viewer.on_camera_rest(),
    })
}
