// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model loading, deletion and download endpoints.

use crate::error::ApiError;
use crate::types::{
    DeleteAllResponse, DeleteArchResponse, DownloadResponse, LoadCustomRequest,
    LoadCustomResponse, LoadResponse,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use frag_viewer_core::{fragment_file_name, model_id::validate_file_stem, DirectorySink};
use sha2::{Digest, Sha256};

/// POST /api/v1/models/load - Load the configured fragments.
pub async fn load(State(state): State<AppState>) -> Result<Json<LoadResponse>, ApiError> {
    let report = state.viewer.load_fragments().await?;
    tracing::info!(
        loaded = report.loaded.len(),
        skipped = report.skipped.len(),
        "Default fragments loaded"
    );
    Ok(Json(LoadResponse::new(report, state.viewer.models_count())))
}

/// POST /api/v1/models/load-custom - Load one fragment from a path or URL.
pub async fn load_custom(
    State(state): State<AppState>,
    Json(request): Json<LoadCustomRequest>,
) -> Result<Json<LoadCustomResponse>, ApiError> {
    if request.path.trim().is_empty() {
        return Err(ApiError::BadRequest("path cannot be empty".into()));
    }

    let model_id = state.viewer.load_custom(&request.path).await?;
    Ok(Json(LoadCustomResponse {
        model_id,
        models_count: state.viewer.models_count(),
    }))
}

/// DELETE /api/v1/models/arch - Delete the architecture model if present.
pub async fn delete_arch(
    State(state): State<AppState>,
) -> Result<Json<DeleteArchResponse>, ApiError> {
    let deleted = state.viewer.delete_arch_model()?;
    Ok(Json(DeleteArchResponse {
        deleted,
        models_count: state.viewer.models_count(),
    }))
}

/// DELETE /api/v1/models - Delete every model.
pub async fn delete_all(State(state): State<AppState>) -> Result<Json<DeleteAllResponse>, ApiError> {
    let removed = state.viewer.delete_all()?;
    Ok(Json(DeleteAllResponse { removed }))
}

/// POST /api/v1/models/download - Save every model to the download directory.
pub async fn download_all(
    State(state): State<AppState>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let sink = DirectorySink::new(&state.config.download_dir);
    let files = state.viewer.download_all(&sink).await?;
    tracing::info!(count = files.len(), dir = %state.config.download_dir, "Fragments saved");

    Ok(Json(DownloadResponse {
        directory: state.config.download_dir.clone(),
        files,
    }))
}

/// GET /api/v1/models/:id/download - Serialize one model as an attachment.
pub async fn download_one(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    validate_file_stem(&model_id).map_err(ApiError::BadRequest)?;

    let data = state.viewer.download_one(&model_id).await?;
    let etag = format!("\"{}\"", hex::encode(Sha256::digest(&data)));

    let cached = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == etag);
    if cached {
        tracing::debug!(model_id = %model_id, "Download not modified");
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    let disposition = format!("attachment; filename=\"{}\"", fragment_file_name(&model_id));
    tracing::info!(model_id = %model_id, size = data.len(), "Serving fragment download");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::ETAG, etag),
        ],
        data,
    )
        .into_response())
}
