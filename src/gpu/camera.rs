//! Fixed perspective camera looking down -z at the field.

use crate::config::VisualsConfig;
use glam::{Mat4, Vec3};

pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(distance: f32, fov_y_degrees: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, distance),
            target: Vec3::ZERO,
            fov_y: fov_y_degrees.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn from_visuals(visuals: &VisualsConfig) -> Self {
        Self::new(visuals.camera_distance, visuals.fov_y_degrees)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(f32::EPSILON), self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_visuals(&VisualsConfig::default())
    }
}
