use bytemuck::{Pod, Zeroable};

use crate::math::{Vector3, Vector4};

/// RGBA color, 8 bits per channel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const LIGHTGRAY: Self = Self::new(200, 200, 200, 255);
    pub const GRAY: Self = Self::new(130, 130, 130, 255);
    pub const DARKGRAY: Self = Self::new(80, 80, 80, 255);
    pub const YELLOW: Self = Self::new(253, 249, 0, 255);
    pub const GOLD: Self = Self::new(255, 203, 0, 255);
    pub const ORANGE: Self = Self::new(255, 161, 0, 255);
    pub const PINK: Self = Self::new(255, 109, 194, 255);
    pub const RED: Self = Self::new(230, 41, 55, 255);
    pub const MAROON: Self = Self::new(190, 33, 55, 255);
    pub const GREEN: Self = Self::new(0, 228, 48, 255);
    pub const LIME: Self = Self::new(0, 158, 47, 255);
    pub const DARKGREEN: Self = Self::new(0, 117, 44, 255);
    pub const SKYBLUE: Self = Self::new(102, 191, 255, 255);
    pub const BLUE: Self = Self::new(0, 121, 241, 255);
    pub const DARKBLUE: Self = Self::new(0, 82, 172, 255);
    pub const PURPLE: Self = Self::new(200, 122, 255, 255);
    pub const VIOLET: Self = Self::new(135, 60, 190, 255);
    pub const DARKPURPLE: Self = Self::new(112, 31, 126, 255);
    pub const BEIGE: Self = Self::new(211, 176, 131, 255);
    pub const BROWN: Self = Self::new(127, 106, 79, 255);
    pub const DARKBROWN: Self = Self::new(76, 63, 47, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const BLANK: Self = Self::new(0, 0, 0, 0);
    pub const MAGENTA: Self = Self::new(255, 0, 255, 255);
    pub const RAYWHITE: Self = Self::new(245, 245, 245, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with alpha scaled to `alpha` in [0, 1].
    #[must_use]
    pub fn fade(self, alpha: f32) -> Self {
        let alpha = alpha.clamp(0.0, 1.0);
        Self {
            a: (255.0 * alpha) as u8,
            ..self
        }
    }

    /// Packed as `0xRRGGBBAA`.
    #[must_use]
    pub const fn to_int(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    #[must_use]
    pub const fn from_int(value: u32) -> Self {
        let [r, g, b, a] = value.to_be_bytes();
        Self { r, g, b, a }
    }

    #[must_use]
    pub fn normalize(self) -> Vector4 {
        Vector4::new(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        )
    }

    #[must_use]
    pub fn from_normalized(v: Vector4) -> Self {
        let c = |x: f32| (x.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(c(v.x), c(v.y), c(v.z), c(v.w))
    }

    /// Hue in degrees, saturation and value in [0, 1].
    #[must_use]
    pub fn to_hsv(self) -> Vector3 {
        let rgb = self.normalize();
        let max = rgb.x.max(rgb.y).max(rgb.z);
        let min = rgb.x.min(rgb.y).min(rgb.z);
        let delta = max - min;

        if delta < 1e-5 || max <= 0.0 {
            return Vector3::new(0.0, 0.0, max);
        }

        let saturation = delta / max;
        let sector = if rgb.x >= max {
            (rgb.y - rgb.z) / delta
        } else if rgb.y >= max {
            2.0 + (rgb.z - rgb.x) / delta
        } else {
            4.0 + (rgb.x - rgb.y) / delta
        };
        let mut hue = sector * 60.0;
        if hue < 0.0 {
            hue += 360.0;
        }

        Vector3::new(hue, saturation, max)
    }

    #[must_use]
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let channel = |n: f32| {
            let k = (n + hue / 60.0) % 6.0;
            let t = k.min(4.0 - k).clamp(0.0, 1.0);
            ((value - value * saturation * t) * 255.0).round() as u8
        };
        Self::new(channel(5.0), channel(3.0), channel(1.0), 255)
    }

    /// Multiplies each channel by the matching channel of `tint`.
    #[must_use]
    pub fn tint(self, tint: Color) -> Self {
        let m = |a: u8, b: u8| ((u16::from(a) * u16::from(b)) / 255) as u8;
        Self::new(
            m(self.r, tint.r),
            m(self.g, tint.g),
            m(self.b, tint.b),
            m(self.a, tint.a),
        )
    }

    /// Source-over composition of `src` onto `self`, with `tint` applied to `src`.
    #[must_use]
    pub fn alpha_blend(self, src: Color, tint: Color) -> Self {
        let src = src.tint(tint).normalize();
        let dst = self.normalize();
        let out_a = src.w + dst.w * (1.0 - src.w);
        if out_a <= 0.0 {
            return Color::BLANK;
        }
        let blend = |s: f32, d: f32| (s * src.w + d * dst.w * (1.0 - src.w)) / out_a;
        Color::from_normalized(Vector4::new(
            blend(src.x, dst.x),
            blend(src.y, dst.y),
            blend(src.z, dst.z),
            out_a,
        ))
    }

    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_round_trip_uses_rgba_order() {
        assert_eq!(Color::RED.to_int(), 0xE62937FF);
        assert_eq!(Color::from_int(0xE62937FF), Color::RED);
    }

    #[test]
    fn hsv_of_primaries() {
        let hsv = Color::rgb(255, 0, 0).to_hsv();
        assert!(hsv.x.abs() < 1e-3);
        assert!((hsv.y - 1.0).abs() < 1e-3);
        assert_eq!(Color::from_hsv(120.0, 1.0, 1.0), Color::rgb(0, 255, 0));
        assert_eq!(Color::from_hsv(240.0, 1.0, 1.0), Color::rgb(0, 0, 255));
    }

    #[test]
    fn fade_scales_alpha_only() {
        let c = Color::WHITE.fade(0.5);
        assert_eq!((c.r, c.g, c.b), (255, 255, 255));
        assert_eq!(c.a, 127);
    }

    #[test]
    fn opaque_blend_replaces_destination() {
        let out = Color::BLUE.alpha_blend(Color::RED, Color::WHITE);
        assert_eq!(out, Color::RED);
    }
}
