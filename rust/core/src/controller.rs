// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-facing actions and the state they are reflected in.
//!
//! Every action goes through the same gate: the shell must be Ready and no
//! other action may be in flight. A gated call returns [`Error::NotReady`]
//! or [`Error::Busy`] and leaves the error banner alone. Real failures are
//! caught here, turned into the banner message and returned as well.

use crate::config::ViewerConfig;
use crate::download::{download_models, DownloadSink};
use crate::engine::FragmentEngine;
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, UrlResolver};
use crate::loader::{FragmentLoader, LoadReport};
use crate::progress::LoadingProgress;
use crate::render::{RenderContext, Viewport};
use crate::shell::{ShellState, ViewerShell};
use crate::view::{find_match, ViewModel, ViewSnapshot};
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Status {
    error: Option<String>,
    progress: Option<LoadingProgress>,
}

/// Clears the in-flight flag when the action ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives the viewer shell, loader and downloads on behalf of the UI.
pub struct ViewerController<E, R, F> {
    shell: ViewerShell<E, R, F>,
    loader: FragmentLoader<E, F>,
    config: ViewerConfig,
    in_flight: AtomicBool,
    status: Mutex<Status>,
}

impl<E, R, F> ViewerController<E, R, F>
where
    E: FragmentEngine,
    R: RenderContext,
    F: Fetcher,
{
    pub fn new(engine: Arc<E>, fetcher: Arc<F>, config: ViewerConfig) -> Result<Self> {
        let resolver = UrlResolver::new(&config.base_url, &config.fragments_dir)?;
        let shell = ViewerShell::new(
            Arc::clone(&engine),
            Arc::clone(&fetcher),
            config.worker_url.clone(),
            config.camera,
        );
        let loader = FragmentLoader::new(engine, fetcher, resolver);
        Ok(Self {
            shell,
            loader,
            config,
            in_flight: AtomicBool::new(false),
            status: Mutex::new(Status::default()),
        })
    }

    pub fn shell(&self) -> &ViewerShell<E, R, F> {
        &self.shell
    }

    pub fn engine(&self) -> &Arc<E> {
        self.shell.engine()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn models_count(&self) -> usize {
        self.engine().models().len()
    }

    pub fn error(&self) -> Option<String> {
        self.status.lock().error.clone()
    }

    pub fn progress(&self) -> Option<LoadingProgress> {
        self.status.lock().progress
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Mount the shell. Failures land in the error banner.
    ///
    /// A mount abandoned because of a teardown leaves the banner alone.
    pub async fn mount(&self, viewport: Viewport) -> Result<()> {
        self.shell.mount(viewport).await.map_err(|e| {
            if let ShellState::Error(_) = self.shell.state() {
                let message = match &e {
                    Error::Initialization(reason) => format!("Initialization failed: {}", reason),
                    other => format!("Initialization failed: {}", other),
                };
                self.status.lock().error = Some(message);
            }
            e
        })
    }

    /// Tear the shell down and forget per-session state.
    pub fn teardown(&self) {
        self.shell.teardown();
        *self.status.lock() = Status::default();
    }

    pub fn resize(&self, viewport: Viewport) -> bool {
        self.shell.resize(viewport)
    }

    pub fn on_camera_rest(&self) -> bool {
        self.shell.on_camera_rest()
    }

    /// Load the configured demo fragments.
    pub async fn load_fragments(&self) -> Result<LoadReport> {
        let _guard = self.begin()?;
        let paths = &self.config.default_fragments;
        self.status.lock().progress = Some(LoadingProgress::new(paths.len()));

        self.loader
            .load_all(paths, |progress| self.status.lock().progress = Some(progress))
            .await
            .map_err(|e| self.fail("Failed to load fragments", e))
    }

    /// Load one fragment from a user-supplied path or URL.
    pub async fn load_custom(&self, path: &str) -> Result<String> {
        let _guard = self.begin()?;
        let mut progress = LoadingProgress::new(1);
        self.status.lock().progress = Some(progress);

        let model_id = self
            .loader
            .load_one(path.trim())
            .await
            .map_err(|e| self.fail("Failed to load fragment", e))?;

        progress.advance();
        self.status.lock().progress = Some(progress);
        Ok(model_id)
    }

    /// Dispose the first model whose id matches the architecture pattern.
    ///
    /// Returns `Ok(None)` when nothing matches.
    pub fn delete_arch_model(&self) -> Result<Option<String>> {
        let _guard = self.begin()?;
        let ids = self.engine().models().keys();
        let Some(model_id) = find_match(&ids, &self.config.arch_pattern).cloned() else {
            return Ok(None);
        };

        if !self.engine().dispose_model(&model_id) {
            return Err(self.fail("Failed to delete model", Error::UnknownModel(model_id)));
        }
        tracing::info!(model_id = %model_id, "Deleted architecture model");
        Ok(Some(model_id))
    }

    /// Dispose every resident model. Returns how many were removed.
    pub fn delete_all(&self) -> Result<usize> {
        let _guard = self.begin()?;
        let mut removed = 0;
        for model_id in self.engine().models().keys() {
            if self.engine().dispose_model(&model_id) {
                removed += 1;
            }
        }
        tracing::info!(removed, "Deleted all models");
        Ok(removed)
    }

    /// Export every resident model through `sink`.
    pub async fn download_all<S: DownloadSink>(&self, sink: &S) -> Result<Vec<String>> {
        let _guard = self.begin()?;
        download_models(self.engine().as_ref(), sink)
            .await
            .map_err(|e| self.fail("Failed to download fragments", e))
    }

    /// Serialize a single model for download.
    pub async fn download_one(&self, model_id: &str) -> Result<Bytes> {
        if !self.shell.is_ready() {
            return Err(Error::NotReady);
        }
        self.engine()
            .get_buffer(model_id, false)
            .await
            .map_err(|e| match e {
                Error::UnknownModel(_) => e,
                other => self.fail("Failed to download fragments", other),
            })
    }

    pub fn view(&self) -> ViewModel {
        let status = self.status.lock();
        ViewModel::render(ViewSnapshot {
            shell: self.shell.state(),
            model_ids: self.engine().models().keys(),
            is_loading: self.is_loading(),
            progress: status.progress,
            error: status.error.clone(),
            arch_pattern: &self.config.arch_pattern,
        })
    }

    /// Gate an action and clear the previous error.
    fn begin(&self) -> Result<InFlight<'_>> {
        if !self.shell.is_ready() {
            return Err(Error::NotReady);
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Action rejected: another operation is in flight");
            return Err(Error::Busy);
        }
        self.status.lock().error = None;
        Ok(InFlight(&self.in_flight))
    }

    fn fail(&self, context: &str, error: Error) -> Error {
        let message = format!("{}: {}", context, error);
        tracing::error!(error = %error, "{}", context);
        self.status.lock().error = Some(message);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::tests::MemorySink;
    use crate::engine::{compress, BufferEngine};
    use crate::loader::tests::StaticFetcher;
    use crate::render::HeadlessRenderer;
    use crate::view::Action;

    type TestController = ViewerController<BufferEngine, HeadlessRenderer, StaticFetcher>;

    const WORKER: &str = "https://cdn.test/worker.mjs";

    fn config() -> ViewerConfig {
        ViewerConfig {
            base_url: "http://viewer.test".into(),
            fragments_dir: "fragments".into(),
            worker_url: WORKER.into(),
            default_fragments: vec![
                "/fragments/school_arq.ifc.frag".into(),
                "/fragments/school_str.ifc.frag".into(),
            ],
            ..ViewerConfig::default()
        }
    }

    fn demo_fetcher() -> StaticFetcher {
        StaticFetcher::default()
            .with(WORKER, Bytes::from_static(b"worker"))
            .with(
                "http://viewer.test/fragments/school_arq.ifc.frag",
                compress(b"arq"),
            )
            .with(
                "http://viewer.test/fragments/school_str.ifc.frag",
                compress(b"str"),
            )
    }

    async fn mounted(fetcher: StaticFetcher, config: ViewerConfig) -> TestController {
        let controller =
            ViewerController::new(Arc::new(BufferEngine::new()), Arc::new(fetcher), config)
                .unwrap();
        controller.mount(Viewport::new(1280, 720)).await.unwrap();
        controller
    }

    #[tokio::test]
    async fn actions_require_ready_shell() {
        let controller: TestController = ViewerController::new(
            Arc::new(BufferEngine::new()),
            Arc::new(demo_fetcher()),
            config(),
        )
        .unwrap();

        assert!(matches!(controller.load_fragments().await, Err(Error::NotReady)));
        assert!(matches!(controller.delete_all(), Err(Error::NotReady)));
        assert!(controller.error().is_none());
        assert!(controller.view().initializing);
    }

    #[tokio::test]
    async fn init_failure_shows_banner() {
        let controller: TestController = ViewerController::new(
            Arc::new(BufferEngine::new()),
            Arc::new(StaticFetcher::default()),
            config(),
        )
        .unwrap();

        assert!(controller.mount(Viewport::new(800, 600)).await.is_err());
        let view = controller.view();
        assert!(view.error.unwrap().starts_with("Initialization failed: "));
        assert!(!view.viewer_ready);
    }

    #[tokio::test]
    async fn load_fragments_populates_collection() {
        let controller = mounted(demo_fetcher(), config()).await;

        let report = controller.load_fragments().await.unwrap();

        assert_eq!(report.loaded.len(), 2);
        assert_eq!(controller.models_count(), 2);
        assert_eq!(
            controller.progress(),
            Some(LoadingProgress { current: 2, total: 2 })
        );
        assert!(!controller.is_loading());

        let view = controller.view();
        assert_eq!(view.model_ids, vec!["school_arq", "school_str"]);
        assert!(view.button(Action::LoadFragments).is_none());
        assert!(view.button(Action::DeleteArchModel).is_some());
        assert_eq!(
            controller
                .shell()
                .with_renderer(|r| r.scene())
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn missing_fragment_sets_error() {
        let mut config = config();
        config.default_fragments = vec!["/fragments/missing.frag".into()];
        let controller = mounted(demo_fetcher(), config).await;

        assert!(controller.load_fragments().await.is_err());

        let error = controller.error().unwrap();
        assert!(error.starts_with("Failed to load fragments: "));
        assert_eq!(controller.models_count(), 0);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn next_action_clears_previous_error() {
        let controller = mounted(demo_fetcher(), config()).await;
        assert!(controller.load_custom("/fragments/nope.frag").await.is_err());
        assert!(controller.error().is_some());

        controller.load_custom("/fragments/school_arq.ifc.frag").await.unwrap();
        assert!(controller.error().is_none());
        assert_eq!(
            controller.progress(),
            Some(LoadingProgress { current: 1, total: 1 })
        );
    }

    #[tokio::test]
    async fn load_custom_rejects_path_without_id() {
        let controller = mounted(demo_fetcher(), config()).await;
        let err = controller.load_custom("/fragments/.frag").await.unwrap_err();
        assert!(matches!(err, Error::InvalidModelId(_)));
        assert_eq!(controller.models_count(), 0);
        assert!(controller.error().is_some());
    }

    #[tokio::test]
    async fn concurrent_batch_is_rejected() {
        let controller = mounted(demo_fetcher(), config()).await;

        let guard = controller.begin().unwrap();
        assert!(controller.is_loading());
        assert!(matches!(controller.load_fragments().await, Err(Error::Busy)));
        assert!(matches!(controller.delete_all(), Err(Error::Busy)));
        assert!(controller.view().buttons.iter().all(|b| !b.enabled));
        drop(guard);

        assert!(controller.load_fragments().await.is_ok());
    }

    #[tokio::test]
    async fn delete_arch_without_match_is_noop() {
        let mut config = config();
        config.default_fragments = vec!["/fragments/school_str.ifc.frag".into()];
        let controller = mounted(demo_fetcher(), config).await;
        controller.load_fragments().await.unwrap();

        assert_eq!(controller.delete_arch_model().unwrap(), None);
        assert_eq!(controller.models_count(), 1);
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn delete_arch_removes_matching_model() {
        let controller = mounted(demo_fetcher(), config()).await;
        controller.load_fragments().await.unwrap();

        assert_eq!(
            controller.delete_arch_model().unwrap().as_deref(),
            Some("school_arq")
        );
        assert_eq!(controller.engine().models().keys(), vec!["school_str"]);
        assert!(controller.view().button(Action::DeleteArchModel).is_none());
    }

    #[tokio::test]
    async fn delete_all_empties_collection() {
        let controller = mounted(demo_fetcher(), config()).await;
        controller.load_fragments().await.unwrap();

        assert_eq!(controller.delete_all().unwrap(), 2);
        assert_eq!(controller.models_count(), 0);
        assert_eq!(controller.delete_all().unwrap(), 0);
        assert!(controller.view().button(Action::LoadFragments).is_some());
    }

    #[tokio::test]
    async fn download_saves_each_model() {
        let controller = mounted(demo_fetcher(), config()).await;
        controller.load_fragments().await.unwrap();

        let sink = MemorySink::default();
        let saved = controller.download_all(&sink).await.unwrap();

        assert_eq!(saved, vec!["school_arq.frag", "school_str.frag"]);
        assert_eq!(sink.saved.lock().len(), 2);
    }

    #[tokio::test]
    async fn download_one_unknown_model_keeps_banner_clear() {
        let controller = mounted(demo_fetcher(), config()).await;
        assert!(matches!(
            controller.download_one("ghost").await,
            Err(Error::UnknownModel(_))
        ));
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn teardown_resets_session() {
        let controller = mounted(demo_fetcher(), config()).await;
        controller.load_fragments().await.unwrap();

        controller.teardown();
        assert_eq!(controller.models_count(), 0);
        assert_eq!(controller.shell().state(), ShellState::Uninitialized);
        assert!(controller.progress().is_none());
    }
}
