// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fragment Viewer Server - HTTP front end for the fragment viewer.
//!
//! The viewer is mounted in the background at startup; until it is ready
//! the view model shows the initializing banner and actions answer 503.
//!
//! # Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `GET /api/v1/viewer` - View model (buttons, banners, progress)
//! - `POST /api/v1/viewer/resize` - Resize the viewport
//! - `POST /api/v1/viewer/camera-rest` - Redraw after camera movement
//! - `POST /api/v1/models/load` - Load the default fragments
//! - `POST /api/v1/models/load-custom` - Load one fragment by path or URL
//! - `DELETE /api/v1/models/arch` - Delete the architecture model
//! - `DELETE /api/v1/models` - Delete all models
//! - `POST /api/v1/models/download` - Save every model to disk
//! - `GET /api/v1/models/:id/download` - Download one model
//! - `GET /api/v1/events` - Model events (SSE)

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;

mod config;
mod error;
mod routes;
mod services;
mod types;

use config::Config;
use services::{build_viewer, spawn_mount, Viewer};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub viewer: Arc<Viewer>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,tower_http=debug,frag_viewer_server=debug".into()),
        )
        .pretty()
        .init();

    let config = Config::from_env();

    tracing::info!(
        port = config.port,
        public_url = %config.public_url,
        fragments_dir = %config.fragments_dir,
        download_dir = %config.download_dir,
        default_fragments = config.default_fragments.len(),
        "Starting Fragment Viewer Server"
    );

    let viewer = Arc::new(build_viewer(&config).context("Invalid viewer configuration")?);
    spawn_mount(Arc::clone(&viewer), config.viewport());

    let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_addr, config.port))?;

    let state = AppState {
        viewer: Arc::clone(&viewer),
        config: Arc::new(config),
    };
    let app = routes::router(state);

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    viewer.teardown();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, tearing down viewer");
}
