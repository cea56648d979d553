use bytemuck::{Pod, Zeroable};

use crate::math::{Color, Vector2, Vector3};
use crate::sys;

/// Axis-aligned rectangle in screen or image space.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn from_position_size(position: Vector2, size: Vector2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    #[must_use]
    pub fn position(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    #[must_use]
    pub fn size(&self) -> Vector2 {
        Vector2::new(self.width, self.height)
    }

    #[must_use]
    pub fn center(&self) -> Vector2 {
        Vector2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn check_collision(&self, other: &Rectangle) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    #[must_use]
    pub fn check_collision_point(&self, point: Vector2) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    #[must_use]
    pub fn check_collision_circle(&self, center: Vector2, radius: f32) -> bool {
        let closest = Vector2::new(
            center.x.clamp(self.x, self.x + self.width),
            center.y.clamp(self.y, self.y + self.height),
        );
        closest.distance(center) <= radius
    }

    /// Overlapping area of two rectangles; zero-sized when they do not touch.
    #[must_use]
    pub fn get_collision(&self, other: &Rectangle) -> Rectangle {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);

        if right > left && bottom > top {
            Rectangle::new(left, top, right - left, bottom - top)
        } else {
            Rectangle::default()
        }
    }

    pub fn draw(&self, color: Color) {
        sys::draw_rectangle_rec(*self, color);
    }

    pub fn draw_lines(&self, thickness: f32, color: Color) {
        sys::draw_rectangle_lines_ex(*self, thickness, color);
    }
}

/// Axis-aligned bounding box in world space.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct BoundingBox {
    pub min: Vector3,
    pub max: Vector3,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing every point; zero-sized for an empty set.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vector3>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        iter.fold(Self::new(first, first), |acc, p| {
            Self::new(acc.min.min(p), acc.max.max(p))
        })
    }

    #[must_use]
    pub fn merge(&self, other: &BoundingBox) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    #[must_use]
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    #[must_use]
    pub fn check_collision(&self, other: &BoundingBox) -> bool {
        self.max.x >= other.min.x
            && self.min.x <= other.max.x
            && self.max.y >= other.min.y
            && self.min.y <= other.max.y
            && self.max.z >= other.min.z
            && self.min.z <= other.max.z
    }

    #[must_use]
    pub fn check_collision_sphere(&self, center: Vector3, radius: f32) -> bool {
        let closest = center.max(self.min).min(self.max);
        closest.distance(center) <= radius
    }

    pub fn draw(&self, color: Color) {
        sys::draw_bounding_box(*self, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_rectangle_is_overlap() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.check_collision(&b));
        assert_eq!(a.get_collision(&b), Rectangle::new(5.0, 5.0, 5.0, 5.0));
    }

    #[test]
    fn disjoint_rectangles_have_empty_collision() {
        let a = Rectangle::new(0.0, 0.0, 1.0, 1.0);
        let b = Rectangle::new(2.0, 2.0, 1.0, 1.0);
        assert!(!a.check_collision(&b));
        assert_eq!(a.get_collision(&b), Rectangle::default());
    }

    #[test]
    fn bounding_box_from_points() {
        let bb = BoundingBox::from_points([
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(-2.0, 3.0, 4.0),
        ]);
        assert_eq!(bb.min, Vector3::new(-2.0, -1.0, 0.0));
        assert_eq!(bb.max, Vector3::new(1.0, 3.0, 4.0));
    }
}
