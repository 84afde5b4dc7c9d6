use std::f32::consts::PI;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Distance from the camera to the z = 0 plane the images live on.
pub const CAMERA_DISTANCE: f32 = 200.0;
pub const NEAR_PLANE: f32 = 100.0;
pub const FAR_PLANE: f32 = 2000.0;

/// Vertical field of view, in degrees, at which one container pixel spans one
/// scene unit on the z = 0 plane.
pub fn field_of_view(height: f32) -> f32 {
    2.0 * (height / 2.0 / CAMERA_DISTANCE).atan() * (180.0 / PI)
}

/// Camera state derived from the container size. Recomputed wholesale on resize.
///
/// A zero-height container is not guarded against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub fov: f32,
    pub aspect: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            fov: field_of_view(height),
            aspect: width / height,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        *self = Self::new(width, height);
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn camera_position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, CAMERA_DISTANCE)
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.camera_position(), Vec3::ZERO, Vec3::Y);
        let projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, NEAR_PLANE, FAR_PLANE);
        projection * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn fov_matches_container_height() {
        let sizes: [(f32, f32); 4] = [(1280.0, 720.0), (300.0, 900.0), (1.0, 1.0), (4096.0, 2160.0)];
        for (width, height) in sizes {
            let viewport = Viewport::new(width, height);
            let expected = 2.0 * (height / 400.0).atan() * (180.0 / PI);
            assert!((viewport.fov - expected).abs() < 1e-4);
            assert!((viewport.aspect - width / height).abs() < 1e-6);
        }
    }

    #[test]
    fn resize_recomputes_everything() {
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.resize(1000.0, 400.0);
        assert_eq!(viewport, Viewport::new(1000.0, 400.0));
    }

    #[test]
    fn one_pixel_is_one_unit_at_the_image_plane() {
        let viewport = Viewport::new(1000.0, 500.0);
        let corner = viewport.view_proj() * Vec4::new(500.0, 250.0, 0.0, 1.0);
        let ndc = corner.truncate() / corner.w;
        assert!((ndc.x - 1.0).abs() < 1e-3);
        assert!((ndc.y - 1.0).abs() < 1e-3);
    }
}
