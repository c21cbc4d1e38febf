// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health check endpoint.

use crate::AppState;
use axum::{extract::State, Json};
use frag_viewer_core::ShellState;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
    pub viewer: ShellState,
}

/// API information response.
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

/// Endpoint information.
#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

const fn endpoint(
    method: &'static str,
    path: &'static str,
    description: &'static str,
) -> EndpointInfo {
    EndpointInfo {
        method,
        path,
        description,
    }
}

/// GET /api/v1/health - Health check endpoint.
///
/// The server is healthy while the viewer initializes; a failed mount is
/// reported as degraded.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let viewer = state.viewer.shell().state();
    let status = match viewer {
        ShellState::Error(_) => "degraded",
        _ => "healthy",
    };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        service: "frag-viewer-server",
        viewer,
    })
}

/// GET / - API information endpoint.
pub async fn info() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: "frag-viewer-server",
        version: env!("CARGO_PKG_VERSION"),
        description: "Viewer for IFC fragment files",
        endpoints: vec![
            endpoint("GET", "/api/v1/health", "Health check endpoint"),
            endpoint("GET", "/api/v1/viewer", "Current view model"),
            endpoint("POST", "/api/v1/viewer/resize", "Resize the viewport"),
            endpoint("POST", "/api/v1/viewer/camera-rest", "Redraw after camera movement"),
            endpoint("POST", "/api/v1/models/load", "Load the default fragments"),
            endpoint("POST", "/api/v1/models/load-custom", "Load one fragment by path or URL"),
            endpoint("DELETE", "/api/v1/models/arch", "Delete the architecture model"),
            endpoint("DELETE", "/api/v1/models", "Delete all models"),
            endpoint("POST", "/api/v1/models/download", "Save every model to the download directory"),
            endpoint("GET", "/api/v1/models/:id/download", "Download one model as a .frag file"),
            endpoint("GET", "/api/v1/events", "Model events (Server-Sent Events)"),
        ],
    })
}
