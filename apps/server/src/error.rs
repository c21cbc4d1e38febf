// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types and handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use frag_viewer_core::Error as ViewerError;
use serde::Serialize;
use thiserror::Error;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Viewer(#[from] ViewerError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Viewer(err) => match err {
                ViewerError::NotReady => (StatusCode::SERVICE_UNAVAILABLE, "VIEWER_NOT_READY"),
                ViewerError::EngineNotInitialized => {
                    (StatusCode::SERVICE_UNAVAILABLE, "ENGINE_NOT_INITIALIZED")
                }
                ViewerError::Busy => (StatusCode::CONFLICT, "BUSY"),
                ViewerError::UnknownModel(_) => (StatusCode::NOT_FOUND, "UNKNOWN_MODEL"),
                ViewerError::NotFound { .. } => (StatusCode::BAD_GATEWAY, "FETCH_FAILED"),
                ViewerError::Network { .. } => (StatusCode::BAD_GATEWAY, "NETWORK_ERROR"),
                ViewerError::InvalidModelId(_) => (StatusCode::BAD_REQUEST, "INVALID_MODEL_ID"),
                ViewerError::InvalidUrl { .. } => (StatusCode::BAD_REQUEST, "INVALID_URL"),
                ViewerError::Decode { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "DECODE_ERROR"),
                ViewerError::Initialization(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INITIALIZATION_ERROR")
                }
                ViewerError::Download { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "DOWNLOAD_ERROR"),
                ViewerError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
