use glam::{Mat4, Vec3};
use std::ops::Mul;

use crate::math::{Quaternion, Vector3};

/// 4x4 column-major transform matrix.
///
/// Wraps [`glam::Mat4`]; the default value is the identity, matching the
/// library's `MatrixIdentity()` which every model transform starts from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Matrix(pub Mat4);

impl Matrix {
    pub const IDENTITY: Self = Self(Mat4::IDENTITY);

    #[inline]
    #[must_use]
    pub const fn from_glam(m: Mat4) -> Self {
        Self(m)
    }

    #[inline]
    #[must_use]
    pub fn to_glam(self) -> Mat4 {
        self.0
    }

    #[must_use]
    pub fn translate(x: f32, y: f32, z: f32) -> Self {
        Self(Mat4::from_translation(Vec3::new(x, y, z)))
    }

    /// Rotation of `angle` radians around `axis`.
    #[must_use]
    pub fn rotate(axis: Vector3, angle: f32) -> Self {
        Self(Mat4::from_axis_angle(axis.normalize().to_glam(), angle))
    }

    /// Rotation from Euler angles in radians, X then Y then Z.
    #[must_use]
    pub fn rotate_xyz(angles: Vector3) -> Self {
        Self(Mat4::from_euler(
            glam::EulerRot::XYZ,
            angles.x,
            angles.y,
            angles.z,
        ))
    }

    #[must_use]
    pub fn rotate_y(angle: f32) -> Self {
        Self(Mat4::from_rotation_y(angle))
    }

    #[must_use]
    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        Self(Mat4::from_scale(Vec3::new(x, y, z)))
    }

    #[must_use]
    pub fn from_quaternion(q: Quaternion) -> Self {
        Self(Mat4::from_quat(q.to_quat()))
    }

    #[must_use]
    pub fn look_at(eye: Vector3, target: Vector3, up: Vector3) -> Self {
        Self(Mat4::look_at_rh(eye.to_glam(), target.to_glam(), up.to_glam()))
    }

    /// Perspective projection with an OpenGL style [-1, 1] depth range.
    #[must_use]
    pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self(Mat4::perspective_rh_gl(fovy, aspect, near, far))
    }

    #[must_use]
    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self(Mat4::orthographic_rh_gl(left, right, bottom, top, near, far))
    }

    /// `self` applied first, then `other`; the library's `MatrixMultiply` order.
    #[must_use]
    pub fn multiply(self, other: Self) -> Self {
        Self(other.0 * self.0)
    }

    #[must_use]
    pub fn invert(self) -> Self {
        Self(self.0.inverse())
    }

    #[must_use]
    pub fn transpose(self) -> Self {
        Self(self.0.transpose())
    }

    #[must_use]
    pub fn determinant(self) -> f32 {
        self.0.determinant()
    }

    #[must_use]
    pub fn transform_point(self, point: Vector3) -> Vector3 {
        self.0.transform_point3(point.to_glam()).into()
    }

    /// The sixteen values in column-major order, as uploaded to shaders.
    #[must_use]
    pub fn to_cols_array(self) -> [f32; 16] {
        self.0.to_cols_array()
    }
}

impl Mul for Matrix {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }
}

impl From<Mat4> for Matrix {
    fn from(m: Mat4) -> Self {
        Self(m)
    }
}

impl From<Matrix> for Mat4 {
    fn from(m: Matrix) -> Self {
        m.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_applies_left_operand_first() {
        let t = Matrix::translate(1.0, 0.0, 0.0);
        let s = Matrix::scale(2.0, 2.0, 2.0);
        // Translate then scale: (0 + 1) * 2
        let p = t.multiply(s).transform_point(Vector3::ZERO);
        assert!((p.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn invert_round_trips() {
        let m = Matrix::translate(3.0, -2.0, 5.0) * Matrix::rotate_y(0.7);
        let p = Vector3::new(1.0, 2.0, 3.0);
        let q = m.invert().transform_point(m.transform_point(p));
        assert!(p.distance(q) < 1e-4);
    }
}
