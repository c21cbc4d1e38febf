// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rendering surface seam.
//!
//! Scene rendering is owned by an external library. The shell only needs to
//! bind a context to a mount point, place models in the scene, keep the
//! pixel size in sync and release the context on teardown.

use crate::camera::Camera;
use crate::error::{Error, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Pixel dimensions of the mount point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}

/// A rendering context bound to one mount point.
pub trait RenderContext: Send + 'static {
    /// Bind a new context to the viewport.
    fn create(viewport: Viewport) -> Result<Self>
    where
        Self: Sized;

    fn add_to_scene(&mut self, model_id: &str);

    fn remove_from_scene(&mut self, model_id: &str);

    fn set_size(&mut self, viewport: Viewport);

    /// Draw one frame.
    fn render(&mut self, camera: &Camera);

    /// Release GPU and DOM resources. Called once on teardown.
    fn dispose(&mut self);
}

/// Render context that tracks scene contents without drawing.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    viewport: Option<Viewport>,
    scene: FxHashSet<String>,
    frames: u64,
    disposed: bool,
}

impl HeadlessRenderer {
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Model ids currently in the scene, sorted.
    pub fn scene(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.scene.iter().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl RenderContext for HeadlessRenderer {
    fn create(viewport: Viewport) -> Result<Self> {
        if viewport.width == 0 || viewport.height == 0 {
            return Err(Error::Initialization(format!(
                "cannot bind a {}x{} surface",
                viewport.width, viewport.height
            )));
        }
        Ok(Self {
            viewport: Some(viewport),
            ..Self::default()
        })
    }

    fn add_to_scene(&mut self, model_id: &str) {
        self.scene.insert(model_id.to_string());
    }

    fn remove_from_scene(&mut self, model_id: &str) {
        self.scene.remove(model_id);
    }

    fn set_size(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn render(&mut self, _camera: &Camera) {
        if !self.disposed {
            self.frames += 1;
        }
    }

    fn dispose(&mut self) {
        self.scene.clear();
        self.viewport = None;
        self.disposed = true;
    }
}
