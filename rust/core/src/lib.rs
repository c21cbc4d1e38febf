// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Fragment Viewer Core
//!
//! Orchestration for a viewer of IFC fragment files. Decoding and rendering
//! belong to external engines; this crate wires them together.
//!
//! ## Overview
//!
//! - **Fetching**: [`HttpFetcher`] retrieves fragment files and the engine
//!   worker script over plain HTTP GET
//! - **Loading**: [`FragmentLoader`] derives model ids from paths and loads
//!   batches concurrently into a [`FragmentEngine`]
//! - **Collection**: [`ModelCollection`] holds resident models and notifies
//!   observers and subscribers of changes
//! - **Shell**: [`ViewerShell`] owns the render context lifecycle
//!   (`Uninitialized -> Initializing -> Ready | Error`)
//! - **Controller**: [`ViewerController`] exposes the user actions and
//!   renders a [`ViewModel`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use frag_viewer_core::{BufferEngine, HeadlessRenderer, HttpFetcher, ViewerConfig,
//!     ViewerController, Viewport};
//! use std::sync::Arc;
//!
//! let controller: ViewerController<BufferEngine, HeadlessRenderer, HttpFetcher> =
//!     ViewerController::new(
//!         Arc::new(BufferEngine::new()),
//!         Arc::new(HttpFetcher::new()?),
//!         ViewerConfig::default(),
//!     )?;
//!
//! controller.mount(Viewport::new(1280, 720)).await?;
//! controller.load_fragments().await?;
//! println!("{} models loaded", controller.models_count());
//! ```

pub mod camera;
pub mod collection;
pub mod config;
pub mod controller;
pub mod download;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod model_id;
pub mod progress;
pub mod render;
pub mod shell;
pub mod view;

pub use camera::{Camera, CameraPreset};
pub use collection::{CollectionEvent, ModelCollection, ModelEvent, ObserverId};
pub use config::{ViewerConfig, DEFAULT_ARCH_PATTERN, DEFAULT_FRAGMENTS, DEFAULT_WORKER_URL};
pub use controller::ViewerController;
pub use download::{download_models, DirectorySink, DownloadSink};
pub use engine::{BufferEngine, BufferModel, FragmentEngine, FragmentModel, LoadOptions};
pub use error::{Error, Result};
pub use fetch::{Fetcher, HttpFetcher, UrlResolver};
pub use loader::{FragmentLoader, LoadReport};
pub use model_id::{derive_model_id, fragment_file_name, FRAGMENT_EXTENSION};
pub use progress::LoadingProgress;
pub use render::{HeadlessRenderer, RenderContext, Viewport};
pub use shell::{ShellState, ViewerShell};
pub use view::{Action, Button, ProgressView, ViewModel};
