//! Perspective camera and picking rays.
//!
//! The camera looks straight down -Z at the tile plane. It is recentred over
//! the grid whenever the grid is rebuilt.

use crate::constants::{CAMERA_FAR, CAMERA_NEAR, CAMERA_Z_DISTANCE};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Right-handed camera description with perspective projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(fov_degrees: f32, aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_Z_DISTANCE),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            fovy_radians: fov_degrees.to_radians(),
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Place the eye over `(x, y)` at the camera distance, looking at the plane.
    pub fn center_on(&mut self, x: f32, y: f32) {
        self.eye = Vec3::new(x, y, CAMERA_Z_DISTANCE);
        self.target = Vec3::new(x, y, 0.0);
    }

    /// Height of the frustum slice at `depth`, compensating for the eye offset.
    pub fn visible_height_at_depth(&self, depth: f32) -> f32 {
        let offset = self.eye.z;
        let depth = if depth < offset {
            depth - offset
        } else {
            depth + offset
        };
        2.0 * (self.fovy_radians / 2.0).tan() * depth.abs()
    }

    pub fn visible_width_at_depth(&self, depth: f32) -> f32 {
        self.visible_height_at_depth(depth) * self.aspect
    }

    /// World-space ray through a point given in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let p = inv * Vec4::new(ndc.x, ndc.y, 0.5, 1.0);
        let p: Vec3 = p.truncate() / p.w;
        Ray {
            origin: self.eye,
            direction: (p - self.eye).normalize(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_points_at_target() {
        let mut cam = Camera::new(70.0, 16.0 / 9.0);
        cam.center_on(4.0, 2.0);
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-5);
        let hit = ray.at(CAMERA_Z_DISTANCE);
        assert!((hit - Vec3::new(4.0, 2.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn visible_extent_matches_fov() {
        let cam = Camera::new(90.0, 2.0);
        // depth 10 with eye at z=10 -> 20 units away, tan(45deg) = 1
        assert!((cam.visible_height_at_depth(10.0) - 40.0).abs() < 1e-3);
        assert!((cam.visible_width_at_depth(10.0) - 80.0).abs() < 1e-3);
    }
}
