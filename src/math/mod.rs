//! Math and geometry value types.
//!
//! These are plain `Copy` values with the same layout as the library's C
//! structs. They own nothing and are used by every other module. Arithmetic
//! is delegated to [`glam`]; conversions in both directions are provided.

mod color;
mod matrix;
mod rectangle;
mod vector;

pub use color::Color;
pub use matrix::Matrix;
pub use rectangle::{BoundingBox, Rectangle};
pub use vector::{Quaternion, Transform, Vector2, Vector3, Vector4};
