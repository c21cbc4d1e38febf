// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process engine that keeps fragment payloads as decoded buffers.
//!
//! Fragment files are zlib-framed. Loading inflates the buffer on the
//! blocking pool (standing in for the engine's worker), exporting deflates
//! it again. The payload itself stays opaque.

use super::{FragmentEngine, FragmentModel, LoadOptions};
use crate::camera::Camera;
use crate::collection::ModelCollection;
use crate::error::{Error, Result};
use bytes::Bytes;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use parking_lot::{Mutex, RwLock};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// A decoded fragment payload.
pub struct BufferModel {
    model_id: String,
    data: Bytes,
    camera: Mutex<Option<Camera>>,
}

impl BufferModel {
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Camera bound through [`FragmentModel::use_camera`], if any.
    pub fn camera(&self) -> Option<Camera> {
        self.camera.lock().clone()
    }
}

impl FragmentModel for BufferModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn byte_len(&self) -> usize {
        self.data.len()
    }

    fn use_camera(&self, camera: &Camera) {
        *self.camera.lock() = Some(camera.clone());
    }
}

/// Worker script the engine was started with.
#[derive(Debug, Clone, Copy)]
struct WorkerInfo {
    size: usize,
}

/// Engine that decodes zlib-framed fragment buffers.
pub struct BufferEngine {
    worker: RwLock<Option<WorkerInfo>>,
    models: ModelCollection<BufferModel>,
    dirty: AtomicBool,
    frames: AtomicU64,
}

impl BufferEngine {
    pub fn new() -> Self {
        Self {
            worker: RwLock::new(None),
            models: ModelCollection::new(),
            dirty: AtomicBool::new(false),
            frames: AtomicU64::new(0),
        }
    }

    /// Number of redraws performed so far.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Size of the worker script, once initialized.
    pub fn worker_size(&self) -> Option<usize> {
        self.worker.read().map(|w| w.size)
    }
}

impl Default for BufferEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentEngine for BufferEngine {
    type Model = BufferModel;

    async fn init(&self, worker_script: Bytes) -> Result<()> {
        if worker_script.is_empty() {
            return Err(Error::Initialization("worker script is empty".into()));
        }
        *self.worker.write() = Some(WorkerInfo {
            size: worker_script.len(),
        });
        tracing::debug!(size = worker_script.len(), "Fragment engine initialized");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.worker.read().is_some()
    }

    async fn load(&self, buffer: Bytes, options: LoadOptions) -> Result<Arc<BufferModel>> {
        if !self.is_initialized() {
            return Err(Error::EngineNotInitialized);
        }

        let LoadOptions { model_id, raw } = options;
        let data = if raw {
            buffer
        } else {
            let id = model_id.clone();
            tokio::task::spawn_blocking(move || inflate(&buffer))
                .await
                .map_err(|e| Error::Decode {
                    model_id: id,
                    reason: e.to_string(),
                })?
                .map_err(|reason| Error::Decode {
                    model_id: model_id.clone(),
                    reason,
                })?
        };

        if data.is_empty() {
            return Err(Error::Decode {
                model_id,
                reason: "fragment payload is empty".into(),
            });
        }

        let model = Arc::new(BufferModel {
            model_id: model_id.clone(),
            data,
            camera: Mutex::new(None),
        });

        tracing::debug!(model_id = %model_id, bytes = model.byte_len(), "Decoded fragment");
        self.dirty.store(true, Ordering::Relaxed);
        if self.models.set(model_id.clone(), Arc::clone(&model)).is_some() {
            tracing::warn!(model_id = %model_id, "Replaced resident model with the same id");
        }
        Ok(model)
    }

    async fn get_buffer(&self, model_id: &str, raw: bool) -> Result<Bytes> {
        let model = self
            .models
            .get(model_id)
            .ok_or_else(|| Error::UnknownModel(model_id.to_string()))?;

        if raw {
            return Ok(model.data.clone());
        }

        let data = model.data.clone();
        tokio::task::spawn_blocking(move || deflate(&data))
            .await
            .map_err(|e| e.to_string())
            .and_then(|r| r)
            .map_err(|reason| Error::Download {
                model_id: model_id.to_string(),
                reason,
            })
    }

    fn dispose_model(&self, model_id: &str) -> bool {
        let removed = self.models.delete(model_id).is_some();
        if removed {
            self.dirty.store(true, Ordering::Relaxed);
        }
        removed
    }

    fn models(&self) -> &ModelCollection<BufferModel> {
        &self.models
    }

    fn update(&self, force: bool) {
        let dirty = self.dirty.swap(false, Ordering::Relaxed);
        if force || dirty {
            self.frames.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn dispose(&self) {
        let released = self.models.clear();
        *self.worker.write() = None;
        tracing::debug!(released, "Fragment engine disposed");
    }
}

fn inflate(buffer: &[u8]) -> std::result::Result<Bytes, String> {
    let mut decoder = ZlibDecoder::new(buffer);
    let mut out = Vec::with_capacity(buffer.len() * 4);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| format!("not a zlib fragment buffer: {}", e))?;
    Ok(Bytes::from(out))
}

fn deflate(data: &[u8]) -> std::result::Result<Bytes, String> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data).map_err(|e| e.to_string())?;
    encoder.finish().map(Bytes::from).map_err(|e| e.to_string())
}

#[cfg(test)]
pub(crate) fn compress(data: &[u8]) -> Bytes {
    deflate(data).expect("in-memory deflate")
}
