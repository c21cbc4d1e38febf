// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fragment engine seam.
//!
//! Decoding fragment buffers into renderable models belongs to an external
//! engine. The viewer talks to it through [`FragmentEngine`]: initialize it
//! with the worker script, load buffers under a model id, dispose models,
//! serialize them back, and request redraws. Loaded models live in the
//! engine's [`ModelCollection`].

mod buffer;

pub use buffer::{BufferEngine, BufferModel};

#[cfg(test)]
pub(crate) use buffer::compress;

use crate::camera::Camera;
use crate::collection::ModelCollection;
use crate::error::Result;
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;

/// A model resident in the engine.
pub trait FragmentModel: Send + Sync + 'static {
    fn model_id(&self) -> &str;

    /// Size of the decoded payload in bytes.
    fn byte_len(&self) -> usize;

    /// Bind the camera used for culling and level of detail.
    fn use_camera(&self, camera: &Camera);
}

/// Options for [`FragmentEngine::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub model_id: String,
    /// The buffer is already uncompressed.
    pub raw: bool,
}

impl LoadOptions {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            raw: false,
        }
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }
}

/// External fragment decoding engine.
pub trait FragmentEngine: Send + Sync + 'static {
    type Model: FragmentModel;

    /// Start the engine with the bytes of its worker script.
    fn init(&self, worker_script: Bytes) -> impl Future<Output = Result<()>> + Send;

    fn is_initialized(&self) -> bool;

    /// Decode a buffer and publish the model into [`FragmentEngine::models`].
    fn load(
        &self,
        buffer: Bytes,
        options: LoadOptions,
    ) -> impl Future<Output = Result<Arc<Self::Model>>> + Send;

    /// Serialize a resident model. `raw` skips compression.
    fn get_buffer(&self, model_id: &str, raw: bool) -> impl Future<Output = Result<Bytes>> + Send;

    /// Remove a model. Returns whether it was resident.
    fn dispose_model(&self, model_id: &str) -> bool;

    fn models(&self) -> &ModelCollection<Self::Model>;

    /// Request a redraw. `force` redraws even when nothing changed.
    fn update(&self, force: bool);

    /// Release every model and the worker.
    fn dispose(&self);
}
