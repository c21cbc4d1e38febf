// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The server-side viewer: buffer engine, headless renderer, HTTP fetcher.

use crate::config::Config;
use frag_viewer_core::{
    BufferEngine, HeadlessRenderer, HttpFetcher, ShellState, ViewerController, Viewport,
};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub type Viewer = ViewerController<BufferEngine, HeadlessRenderer, HttpFetcher>;

/// Build an unmounted viewer from the server configuration.
pub fn build_viewer(config: &Config) -> frag_viewer_core::Result<Viewer> {
    let fetcher = HttpFetcher::with_timeout(config.fetch_timeout())?;
    ViewerController::new(
        Arc::new(BufferEngine::new()),
        Arc::new(fetcher),
        config.viewer_config(),
    )
}

/// Mount the viewer off the request path.
///
/// Until this finishes the view model reports the initializing banner and
/// every action answers "not ready".
pub fn spawn_mount(viewer: Arc<Viewer>, viewport: Viewport) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            worker_url = %viewer.config().worker_url,
            "Mounting viewer"
        );
        match viewer.mount(viewport).await {
            Ok(()) if viewer.shell().state() == ShellState::Ready => {
                tracing::info!("Viewer ready");
            }
            Ok(()) => {}
            Err(e) => tracing::error!(error = %e, "Viewer failed to initialize"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_a_fetch_timeout() {
        let config = Config::from_lookup(|key| match key {
            "FETCH_TIMEOUT_SECS" => Some("15".into()),
            _ => None,
        });
        let viewer = build_viewer(&config).unwrap();
        assert_eq!(viewer.shell().state(), ShellState::Uninitialized);
        assert_eq!(viewer.models_count(), 0);
    }
}
