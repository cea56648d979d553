//! 2D and 3D cameras.
//!
//! Cameras are plain values: they own nothing and are passed by value to the
//! mode primitives. `begin()` returns a guard that ends the mode on drop.

use glam::{Mat4, Vec3, Vec4};

use crate::math::{Matrix, Vector2, Vector3};
use crate::sys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraProjection {
    #[default]
    Perspective,
    Orthographic,
}

// ============================================================================
// Camera2D
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    /// Screen position the target is displayed at.
    pub offset: Vector2,
    pub target: Vector2,
    /// Rotation in degrees.
    pub rotation: f32,
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            offset: Vector2::ZERO,
            target: Vector2::ZERO,
            rotation: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera2D {
    #[must_use]
    pub fn new(offset: Vector2, target: Vector2, rotation: f32, zoom: f32) -> Self {
        Self {
            offset,
            target,
            rotation,
            zoom,
        }
    }

    /// World to screen transform.
    #[must_use]
    pub fn matrix(&self) -> Matrix {
        let origin = Mat4::from_translation(Vec3::new(-self.target.x, -self.target.y, 0.0));
        let rotation = Mat4::from_rotation_z(self.rotation.to_radians());
        let scale = Mat4::from_scale(Vec3::new(self.zoom, self.zoom, 1.0));
        let translation = Mat4::from_translation(Vec3::new(self.offset.x, self.offset.y, 0.0));
        Matrix(translation * rotation * scale * origin)
    }

    #[must_use]
    pub fn world_to_screen(&self, position: Vector2) -> Vector2 {
        let p = self.matrix().0.transform_point3(Vec3::new(position.x, position.y, 0.0));
        Vector2::new(p.x, p.y)
    }

    #[must_use]
    pub fn screen_to_world(&self, position: Vector2) -> Vector2 {
        let inverse = self.matrix().0.inverse();
        let p = inverse.transform_point3(Vec3::new(position.x, position.y, 0.0));
        Vector2::new(p.x, p.y)
    }

    /// Enters 2D mode until the guard is dropped.
    #[must_use = "the mode ends when the guard is dropped"]
    pub fn begin(&self) -> Mode2D {
        sys::begin_mode_2d(*self);
        Mode2D { _private: () }
    }
}

/// Active 2D mode. Dropping it calls `end_mode_2d`.
#[derive(Debug)]
pub struct Mode2D {
    _private: (),
}

impl Drop for Mode2D {
    fn drop(&mut self) {
        sys::end_mode_2d();
    }
}

// ============================================================================
// Camera3D
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera3D {
    pub position: Vector3,
    pub target: Vector3,
    pub up: Vector3,
    /// Field of view in degrees for perspective cameras, view height for
    /// orthographic ones.
    pub fovy: f32,
    pub projection: CameraProjection,
}

impl Default for Camera3D {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 10.0, 10.0),
            target: Vector3::ZERO,
            up: Vector3::UP,
            fovy: 45.0,
            projection: CameraProjection::Perspective,
        }
    }
}

/// Near and far planes used by 3D mode.
pub const CULL_DISTANCE_NEAR: f32 = 0.01;
pub const CULL_DISTANCE_FAR: f32 = 1000.0;

impl Camera3D {
    #[must_use]
    pub fn perspective(position: Vector3, target: Vector3, up: Vector3, fovy: f32) -> Self {
        Self {
            position,
            target,
            up,
            fovy,
            projection: CameraProjection::Perspective,
        }
    }

    #[must_use]
    pub fn orthographic(position: Vector3, target: Vector3, up: Vector3, fovy: f32) -> Self {
        Self {
            position,
            target,
            up,
            fovy,
            projection: CameraProjection::Orthographic,
        }
    }

    #[must_use]
    pub fn view_matrix(&self) -> Matrix {
        Matrix::look_at(self.position, self.target, self.up)
    }

    #[must_use]
    pub fn projection_matrix(&self, aspect: f32) -> Matrix {
        match self.projection {
            CameraProjection::Perspective => Matrix::perspective(
                self.fovy.to_radians(),
                aspect,
                CULL_DISTANCE_NEAR,
                CULL_DISTANCE_FAR,
            ),
            CameraProjection::Orthographic => {
                let top = self.fovy / 2.0;
                let right = top * aspect;
                Matrix::ortho(-right, right, -top, top, CULL_DISTANCE_NEAR, CULL_DISTANCE_FAR)
            }
        }
    }

    #[must_use]
    pub fn view_projection(&self, aspect: f32) -> Matrix {
        Matrix(self.projection_matrix(aspect).0 * self.view_matrix().0)
    }

    /// Projects a world position to pixel coordinates of a `width` x `height`
    /// viewport.
    #[must_use]
    pub fn world_to_screen(&self, position: Vector3, width: i32, height: i32) -> Vector2 {
        let aspect = width as f32 / height.max(1) as f32;
        let clip = self.view_projection(aspect).0 * position.to_glam().extend(1.0);
        let ndc = clip.truncate() / clip.w;
        Vector2::new(
            (ndc.x + 1.0) / 2.0 * width as f32,
            (1.0 - ndc.y) / 2.0 * height as f32,
        )
    }

    #[must_use]
    pub fn frustum(&self, aspect: f32) -> Frustum {
        Frustum::from_matrix(self.view_projection(aspect).0)
    }

    /// Enters 3D mode until the guard is dropped.
    #[must_use = "the mode ends when the guard is dropped"]
    pub fn begin(&self) -> Mode3D {
        sys::begin_mode_3d(*self);
        Mode3D { _private: () }
    }
}

/// Active 3D mode. Dropping it calls `end_mode_3d`.
#[derive(Debug)]
pub struct Mode3D {
    _private: (),
}

impl Drop for Mode3D {
    fn drop(&mut self) {
        sys::end_mode_3d();
    }
}

/// Clip planes of a view-projection matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frustum {
    planes: [Vec4; 6], // left, right, bottom, top, near, far
}

impl Frustum {
    /// Gribb-Hartmann extraction for an OpenGL style [-1, 1] depth range.
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];
        let mut planes = [
            rows[3] + rows[0],
            rows[3] - rows[0],
            rows[3] + rows[1],
            rows[3] - rows[1],
            rows[3] + rows[2],
            rows[3] - rows[2],
        ];

        for plane in &mut planes {
            let length = plane.truncate().length();
            if length > 0.0 {
                *plane /= length;
            }
        }

        Self { planes }
    }

    #[must_use]
    pub fn intersects_sphere(&self, center: Vector3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(center.to_glam()) + plane.w >= -radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_2d_round_trips_screen_coordinates() {
        let camera = Camera2D::new(Vector2::new(400.0, 225.0), Vector2::new(10.0, 20.0), 30.0, 2.0);
        let screen = camera.world_to_screen(Vector2::new(15.0, 5.0));
        let world = camera.screen_to_world(screen);
        assert!((world.x - 15.0).abs() < 1e-3);
        assert!((world.y - 5.0).abs() < 1e-3);
        assert_eq!(camera.world_to_screen(camera.target), camera.offset);
    }

    #[test]
    fn camera_3d_projects_target_to_center() {
        let camera = Camera3D::default();
        let p = camera.world_to_screen(camera.target, 800, 600);
        assert!((p.x - 400.0).abs() < 1e-2);
        assert!((p.y - 300.0).abs() < 1e-2);
    }

    #[test]
    fn frustum_culls_objects_behind_camera() {
        let camera = Camera3D::perspective(Vector3::new(0.0, 0.0, 10.0), Vector3::ZERO, Vector3::UP, 45.0);
        let frustum = camera.frustum(1.0);
        assert!(frustum.intersects_sphere(Vector3::ZERO, 1.0));
        assert!(!frustum.intersects_sphere(Vector3::new(0.0, 0.0, 30.0), 1.0));
    }
}
