// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Perspective camera used by the viewer shell.

use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Camera placement applied when the viewer mounts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPreset {
    pub position: [f64; 3],
    pub target: [f64; 3],
}

impl Default for CameraPreset {
    /// Overview of the school demo models.
    fn default() -> Self {
        Self {
            position: [78.0, 20.0, -2.2],
            target: [26.0, -4.0, 25.0],
        }
    }
}

/// Perspective camera with a look-at target.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Point3<f64>,
    target: Point3<f64>,
    up: Vector3<f64>,
    fov_y: f64,
    aspect: f64,
    near: f64,
    far: f64,
}

impl Camera {
    const DEFAULT_FOV_DEG: f64 = 60.0;
    const DEFAULT_NEAR: f64 = 0.1;
    const DEFAULT_FAR: f64 = 1000.0;

    /// Camera at the origin looking down -Z.
    pub fn new(aspect: f64) -> Self {
        Self {
            position: Point3::origin(),
            target: Point3::new(0.0, 0.0, -1.0),
            up: Vector3::y(),
            fov_y: Self::DEFAULT_FOV_DEG.to_radians(),
            aspect: sanitize_aspect(aspect),
            near: Self::DEFAULT_NEAR,
            far: Self::DEFAULT_FAR,
        }
    }

    pub fn set_look_at(&mut self, position: Point3<f64>, target: Point3<f64>) {
        self.position = position;
        self.target = target;
    }

    pub fn apply_preset(&mut self, preset: &CameraPreset) {
        let [px, py, pz] = preset.position;
        let [tx, ty, tz] = preset.target;
        self.set_look_at(Point3::new(px, py, pz), Point3::new(tx, ty, tz));
    }

    /// Recompute the aspect ratio from pixel dimensions.
    ///
    /// Zero-sized dimensions leave the camera unchanged.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect = width as f64 / height as f64;
        true
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn target(&self) -> Point3<f64> {
        self.target
    }

    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Unit vector from the camera towards its target.
    pub fn direction(&self) -> Vector3<f64> {
        (self.target - self.position)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(|| -Vector3::z())
    }

    pub fn view_matrix(&self) -> Matrix4<f64> {
        Isometry3::look_at_rh(&self.position, &self.target, &self.up).to_homogeneous()
    }

    pub fn projection_matrix(&self) -> Matrix4<f64> {
        Perspective3::new(self.aspect, self.fov_y, self.near, self.far).to_homogeneous()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn sanitize_aspect(aspect: f64) -> f64 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn preset_orients_camera() {
        let mut camera = Camera::new(16.0 / 9.0);
        camera.apply_preset(&CameraPreset::default());

        assert_relative_eq!(camera.position(), Point3::new(78.0, 20.0, -2.2));
        assert_relative_eq!(camera.target(), Point3::new(26.0, -4.0, 25.0));
        assert_relative_eq!(camera.direction().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn viewport_updates_aspect_and_projection() {
        let mut camera = Camera::new(1.0);
        let before = camera.projection_matrix();

        assert!(camera.set_viewport(1600, 800));
        assert_relative_eq!(camera.aspect(), 2.0);
        assert!(camera.projection_matrix() != before);
    }

    #[test]
    fn zero_viewport_is_ignored() {
        let mut camera = Camera::new(1.5);
        assert!(!camera.set_viewport(0, 720));
        assert!(!camera.set_viewport(1280, 0));
        assert_relative_eq!(camera.aspect(), 1.5);
    }

    #[test]
    fn invalid_aspect_falls_back_to_square() {
        assert_relative_eq!(Camera::new(f64::NAN).aspect(), 1.0);
        assert_relative_eq!(Camera::new(-2.0).aspect(), 1.0);
    }

    #[test]
    fn view_matrix_maps_target_onto_forward_axis() {
        let mut camera = Camera::default();
        camera.set_look_at(Point3::new(0.0, 0.0, 10.0), Point3::origin());
        let target = camera.view_matrix().transform_point(&Point3::origin());
        assert_relative_eq!(target, Point3::new(0.0, 0.0, -10.0), epsilon = 1e-9);
    }
}
