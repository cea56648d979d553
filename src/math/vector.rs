use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec2, Vec3, Vec4};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::math::{Color, Matrix};
use crate::sys;

/// Two-component vector, layout-compatible with the library's `Vector2`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

/// Three-component vector, layout-compatible with the library's `Vector3`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Four-component vector, layout-compatible with the library's `Vector4`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Rotations are stored as `Vector4` (x, y, z, w), like the library does.
pub type Quaternion = Vector4;

// Arithmetic goes through glam so the math matches the rest of the crate.
macro_rules! impl_vector_ops {
    ($ty:ident, $glam:ident, $($field:ident),+) => {
        impl $ty {
            pub const ZERO: Self = Self { $($field: 0.0),+ };
            pub const ONE: Self = Self { $($field: 1.0),+ };

            #[inline]
            #[must_use]
            pub const fn new($($field: f32),+) -> Self {
                Self { $($field),+ }
            }

            #[inline]
            #[must_use]
            pub fn to_glam(self) -> $glam {
                $glam::new($(self.$field),+)
            }

            #[inline]
            #[must_use]
            pub fn length(self) -> f32 {
                self.to_glam().length()
            }

            #[inline]
            #[must_use]
            pub fn length_sqr(self) -> f32 {
                self.to_glam().length_squared()
            }

            /// Returns a unit vector, or zero when the length is zero.
            #[inline]
            #[must_use]
            pub fn normalize(self) -> Self {
                self.to_glam().normalize_or_zero().into()
            }

            #[inline]
            #[must_use]
            pub fn dot(self, other: Self) -> f32 {
                self.to_glam().dot(other.to_glam())
            }

            #[inline]
            #[must_use]
            pub fn distance(self, other: Self) -> f32 {
                self.to_glam().distance(other.to_glam())
            }

            #[inline]
            #[must_use]
            pub fn lerp(self, other: Self, amount: f32) -> Self {
                self.to_glam().lerp(other.to_glam(), amount).into()
            }

            #[inline]
            #[must_use]
            pub fn min(self, other: Self) -> Self {
                self.to_glam().min(other.to_glam()).into()
            }

            #[inline]
            #[must_use]
            pub fn max(self, other: Self) -> Self {
                self.to_glam().max(other.to_glam()).into()
            }
        }

        impl From<$glam> for $ty {
            #[inline]
            fn from(v: $glam) -> Self {
                Self { $($field: v.$field),+ }
            }
        }

        impl From<$ty> for $glam {
            #[inline]
            fn from(v: $ty) -> Self {
                v.to_glam()
            }
        }

        impl Add for $ty {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self { $($field: self.$field + rhs.$field),+ }
            }
        }

        impl AddAssign for $ty {
            fn add_assign(&mut self, rhs: Self) {
                $(self.$field += rhs.$field;)+
            }
        }

        impl Sub for $ty {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self { $($field: self.$field - rhs.$field),+ }
            }
        }

        impl SubAssign for $ty {
            fn sub_assign(&mut self, rhs: Self) {
                $(self.$field -= rhs.$field;)+
            }
        }

        impl Mul<f32> for $ty {
            type Output = Self;
            fn mul(self, rhs: f32) -> Self {
                Self { $($field: self.$field * rhs),+ }
            }
        }

        impl Mul for $ty {
            type Output = Self;
            fn mul(self, rhs: Self) -> Self {
                Self { $($field: self.$field * rhs.$field),+ }
            }
        }

        impl MulAssign<f32> for $ty {
            fn mul_assign(&mut self, rhs: f32) {
                $(self.$field *= rhs;)+
            }
        }

        impl Div<f32> for $ty {
            type Output = Self;
            fn div(self, rhs: f32) -> Self {
                Self { $($field: self.$field / rhs),+ }
            }
        }

        impl Neg for $ty {
            type Output = Self;
            fn neg(self) -> Self {
                Self { $($field: -self.$field),+ }
            }
        }
    };
}

impl_vector_ops!(Vector2, Vec2, x, y);
impl_vector_ops!(Vector3, Vec3, x, y, z);
impl_vector_ops!(Vector4, Vec4, x, y, z, w);

// ============================================================================
// Vector2
// ============================================================================

impl Vector2 {
    /// Angle in radians between the X axis and the vector from `self` to `other`.
    #[must_use]
    pub fn angle_to(self, other: Self) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    #[must_use]
    pub fn rotate(self, angle: f32) -> Self {
        Vec2::from_angle(angle).rotate(self.to_glam()).into()
    }

    #[must_use]
    pub fn transform(self, mat: Matrix) -> Self {
        let v = mat.transform_point(Vector3::new(self.x, self.y, 0.0));
        Self::new(v.x, v.y)
    }

    pub fn draw_pixel(self, color: Color) {
        sys::draw_pixel_v(self, color);
    }

    pub fn draw_line(self, end: Self, thickness: f32, color: Color) {
        sys::draw_line_ex(self, end, thickness, color);
    }

    pub fn draw_circle(self, radius: f32, color: Color) {
        sys::draw_circle_v(self, radius, color);
    }

    pub fn check_collision_circle(self, radius: f32, center: Self, other_radius: f32) -> bool {
        self.distance(center) <= radius + other_radius
    }
}

// ============================================================================
// Vector3
// ============================================================================

impl Vector3 {
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);

    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        self.to_glam().cross(other.to_glam()).into()
    }

    #[must_use]
    pub fn transform(self, mat: Matrix) -> Self {
        mat.transform_point(self)
    }

    #[must_use]
    pub fn rotate_by_quaternion(self, q: Quaternion) -> Self {
        (q.to_quat() * self.to_glam()).into()
    }

    pub fn draw_sphere(self, radius: f32, color: Color) {
        sys::draw_sphere(self, radius, color);
    }

    pub fn draw_cube(self, size: Self, color: Color) {
        sys::draw_cube_v(self, size, color);
    }
}

// ============================================================================
// Vector4 / Quaternion
// ============================================================================

impl Vector4 {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    #[must_use]
    pub fn to_quat(self) -> Quat {
        Quat::from_xyzw(self.x, self.y, self.z, self.w)
    }

    #[must_use]
    pub fn from_quat(q: Quat) -> Self {
        Self::new(q.x, q.y, q.z, q.w)
    }

    /// Rotation from Euler angles in radians, applied in X-Y-Z order.
    #[must_use]
    pub fn from_euler(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self::from_quat(Quat::from_euler(glam::EulerRot::XYZ, pitch, yaw, roll))
    }

    #[must_use]
    pub fn from_axis_angle(axis: Vector3, angle: f32) -> Self {
        Self::from_quat(Quat::from_axis_angle(axis.normalize().to_glam(), angle))
    }

    #[must_use]
    pub fn slerp(self, other: Self, amount: f32) -> Self {
        Self::from_quat(self.to_quat().slerp(other.to_quat(), amount))
    }

    #[must_use]
    pub fn invert(self) -> Self {
        Self::from_quat(self.to_quat().inverse())
    }

    #[must_use]
    pub fn multiply(self, other: Self) -> Self {
        Self::from_quat(self.to_quat() * other.to_quat())
    }

    #[must_use]
    pub fn to_matrix(self) -> Matrix {
        Matrix::from_glam(glam::Mat4::from_quat(self.to_quat()))
    }
}

/// Translation, rotation and scale of a bone.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: Quaternion,
    pub scale: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3::ZERO,
            rotation: Quaternion::IDENTITY,
            scale: Vector3::ONE,
        }
    }
}

impl Transform {
    #[must_use]
    pub fn to_matrix(&self) -> Matrix {
        Matrix::from_glam(glam::Mat4::from_scale_rotation_translation(
            self.scale.to_glam(),
            self.rotation.to_quat(),
            self.translation.to_glam(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_zero_stays_zero() {
        assert_eq!(Vector3::ZERO.normalize(), Vector3::ZERO);
        let n = Vector2::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = Vector2::new(1.0, 0.0).rotate(std::f32::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cross_of_axes() {
        let z = Vector3::new(1.0, 0.0, 0.0).cross(Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(z, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn quaternion_rotates_vector() {
        let q = Quaternion::from_axis_angle(Vector3::UP, std::f32::consts::PI);
        let v = Vector3::new(1.0, 0.0, 0.0).rotate_by_quaternion(q);
        assert!((v.x + 1.0).abs() < 1e-5);
    }
}
