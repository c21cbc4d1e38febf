// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer shell: rendering context lifecycle and engine wiring.
//!
//! ```text
//! Uninitialized --mount--> Initializing --ok--> Ready
//!                               |
//!                               +--failure--> Error
//! any state --teardown--> Uninitialized
//! ```
//!
//! Mounting binds the render context, orients the camera, boots the engine
//! from its worker script and attaches the collection observer, in that
//! order. Ready is only entered once every step succeeded. There is no
//! retry from Error; tear down and mount again.

use crate::camera::{Camera, CameraPreset};
use crate::collection::{CollectionEvent, ObserverId};
use crate::engine::{FragmentEngine, FragmentModel};
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::render::{RenderContext, Viewport};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lifecycle state of the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ShellState {
    Uninitialized,
    Initializing,
    Ready,
    Error(String),
}

/// Render context and camera, shared with the collection observer.
struct Scene<R> {
    render: Option<R>,
    camera: Option<Camera>,
}

impl<R: RenderContext> Scene<R> {
    fn draw(&mut self) {
        if let (Some(render), Some(camera)) = (self.render.as_mut(), self.camera.as_ref()) {
            render.render(camera);
        }
    }

    fn release(&mut self) {
        if let Some(mut render) = self.render.take() {
            render.dispose();
        }
        self.camera = None;
    }
}

/// Owns the rendering surface and connects it to the fragment engine.
pub struct ViewerShell<E, R, F> {
    engine: Arc<E>,
    fetcher: Arc<F>,
    worker_url: String,
    camera_preset: CameraPreset,
    state: RwLock<ShellState>,
    scene: Arc<Mutex<Scene<R>>>,
    observer: Mutex<Option<ObserverId>>,
    /// Bumped by every teardown; a mount only commits within its own.
    generation: AtomicU64,
}

impl<E, R, F> ViewerShell<E, R, F>
where
    E: FragmentEngine,
    R: RenderContext,
    F: Fetcher,
{
    pub fn new(
        engine: Arc<E>,
        fetcher: Arc<F>,
        worker_url: impl Into<String>,
        camera_preset: CameraPreset,
    ) -> Self {
        Self {
            engine,
            fetcher,
            worker_url: worker_url.into(),
            camera_preset,
            state: RwLock::new(ShellState::Uninitialized),
            scene: Arc::new(Mutex::new(Scene {
                render: None,
                camera: None,
            })),
            observer: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> ShellState {
        self.state.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), ShellState::Ready)
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    pub fn camera(&self) -> Option<Camera> {
        self.scene.lock().camera.clone()
    }

    /// Run `f` against the render context, if one is bound.
    pub fn with_renderer<T>(&self, f: impl FnOnce(&R) -> T) -> Option<T> {
        self.scene.lock().render.as_ref().map(f)
    }

    /// Mount the shell on a surface of the given size.
    ///
    /// Only the first mount after construction or teardown does anything.
    /// A teardown while the mount is in flight wins: the mount undoes its own
    /// work, leaves the state alone and returns an error.
    pub async fn mount(&self, viewport: Viewport) -> Result<()> {
        let generation = {
            let mut state = self.state.write();
            if *state != ShellState::Uninitialized {
                tracing::debug!(state = ?*state, "Mount ignored");
                return Ok(());
            }
            *state = ShellState::Initializing;
            self.generation.load(Ordering::Acquire)
        };

        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            worker_url = %self.worker_url,
            generation,
            "Initializing viewer"
        );

        let result = self.initialize(viewport, generation).await;

        // Teardown bumps the generation under this lock.
        let mut state = self.state.write();
        if self.generation.load(Ordering::Acquire) != generation {
            if let Ok(observer) = result {
                self.engine.models().unobserve(observer);
            }
            // A newer mount owns the engine once it has started.
            if *state == ShellState::Uninitialized {
                self.engine.dispose();
            }
            tracing::info!(generation, "Mount abandoned after teardown");
            return Err(Error::Initialization(
                "viewer was torn down during initialization".into(),
            ));
        }

        match result {
            Ok(observer) => {
                *self.observer.lock() = Some(observer);
                *state = ShellState::Ready;
                tracing::info!("Viewer ready");
                Ok(())
            }
            Err(e) => {
                let e = match e {
                    Error::Initialization(_) => e,
                    other => Error::Initialization(other.to_string()),
                };
                *state = ShellState::Error(e.to_string());
                self.scene.lock().release();
                tracing::error!(error = %e, "Viewer initialization failed");
                Err(e)
            }
        }
    }

    async fn initialize(&self, viewport: Viewport, generation: u64) -> Result<ObserverId> {
        let render = R::create(viewport)?;
        let mut camera = Camera::new(viewport.aspect());
        camera.apply_preset(&self.camera_preset);
        {
            let mut scene = self.scene.lock();
            if self.generation.load(Ordering::Acquire) != generation {
                return Err(Error::Initialization("torn down".into()));
            }
            scene.render = Some(render);
            scene.camera = Some(camera);
        }

        let worker_script = self.fetcher.fetch(&self.worker_url).await?;
        self.engine.init(worker_script).await?;

        Ok(self.attach_observer())
    }

    fn attach_observer(&self) -> ObserverId {
        let scene = Arc::clone(&self.scene);
        let engine = Arc::downgrade(&self.engine);

        self.engine.models().observe(move |event| {
            let mut scene = scene.lock();
            let Scene { render, camera } = &mut *scene;
            match event {
                CollectionEvent::Set { model_id, model } => {
                    if let Some(camera) = camera.as_ref() {
                        model.use_camera(camera);
                    }
                    if let Some(render) = render.as_mut() {
                        render.add_to_scene(model_id);
                    }
                }
                CollectionEvent::Deleted { model_id } => {
                    if let Some(render) = render.as_mut() {
                        render.remove_from_scene(model_id);
                    }
                }
            }
            if let Some(engine) = engine.upgrade() {
                engine.update(true);
            }
            scene.draw();
        })
    }

    fn detach_observer(&self) {
        if let Some(id) = self.observer.lock().take() {
            self.engine.models().unobserve(id);
        }
    }

    /// Forward a camera-rest event to the engine. Ignored unless Ready.
    pub fn on_camera_rest(&self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.engine.update(true);
        self.scene.lock().draw();
        true
    }

    /// Track a new surface size. Ignored unless Ready or when zero-sized.
    pub fn resize(&self, viewport: Viewport) -> bool {
        if !self.is_ready() {
            return false;
        }

        let mut scene = self.scene.lock();
        let Scene { render, camera } = &mut *scene;
        let resized = camera
            .as_mut()
            .map(|camera| camera.set_viewport(viewport.width, viewport.height))
            .unwrap_or(false);
        if !resized {
            tracing::debug!(width = viewport.width, height = viewport.height, "Resize ignored");
            return false;
        }
        if let Some(render) = render.as_mut() {
            render.set_size(viewport);
        }
        scene.draw();
        true
    }

    /// Release the render context and the engine, whatever the state.
    ///
    /// In-flight fetches are not cancelled.
    pub fn teardown(&self) {
        let mut state = self.state.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.detach_observer();
        self.scene.lock().release();
        self.engine.dispose();
        let previous = std::mem::replace(&mut *state, ShellState::Uninitialized);
        tracing::info!(previous = ?previous, "Viewer torn down");
    }
}
