// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP routes.

pub mod events;
pub mod health;
pub mod models;
pub mod viewer;

use crate::AppState;
use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let config = &state.config;
    let fragments_route = format!("/{}", config.fragments_path);

    Router::new()
        // Root endpoint - API information
        .route("/", get(health::info))
        // Health check
        .route("/api/v1/health", get(health::check))
        // Viewer
        .route("/api/v1/viewer", get(viewer::view))
        .route("/api/v1/viewer/resize", post(viewer::resize))
        .route("/api/v1/viewer/camera-rest", post(viewer::camera_rest))
        // Models
        .route("/api/v1/models", delete(models::delete_all))
        .route("/api/v1/models/load", post(models::load))
        .route("/api/v1/models/load-custom", post(models::load_custom))
        .route("/api/v1/models/arch", delete(models::delete_arch))
        .route("/api/v1/models/download", post(models::download_all))
        .route("/api/v1/models/:id/download", get(models::download_one))
        // Events
        .route("/api/v1/events", get(events::stream))
        // Static fragment files, the default target of rooted fragment paths
        .nest_service(&fragments_route, ServeDir::new(&config.fragments_dir))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(cors(&config.cors_origins))
        .with_state(state)
}

fn cors(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
