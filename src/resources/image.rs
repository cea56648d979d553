//! CPU images.

use std::path::Path;

use crate::errors::{RaywrapError, Result};
use crate::handle::Owned;
use crate::math::{Color, Rectangle};
use crate::sys::{self, PixelFormat, RawImage};

/// Pixel buffer in CPU memory. Cloning deep-copies the pixels.
pub type Image = Owned<RawImage>;

impl Image {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::from_load(sys::load_image(path), path.display().to_string())
    }

    /// `file_type` is an extension such as `".png"`.
    pub fn load_from_memory(file_type: &str, data: &[u8]) -> Result<Self> {
        Self::from_load(
            sys::load_image_from_memory(file_type, data),
            format!("memory ({file_type})"),
        )
    }

    pub fn gen_color(width: i32, height: i32, color: Color) -> Result<Self> {
        Self::from_load(sys::gen_image_color(width, height, color), "color generator")
    }

    pub fn gen_checked(
        width: i32,
        height: i32,
        checks_x: i32,
        checks_y: i32,
        col1: Color,
        col2: Color,
    ) -> Result<Self> {
        Self::from_load(
            sys::gen_image_checked(width, height, checks_x, checks_y, col1, col2),
            "checked generator",
        )
    }

    pub fn gen_gradient_linear(width: i32, height: i32, direction: i32, start: Color, end: Color) -> Result<Self> {
        Self::from_load(
            sys::gen_image_gradient_linear(width, height, direction, start, end),
            "linear gradient generator",
        )
    }

    pub fn gen_gradient_radial(width: i32, height: i32, density: f32, inner: Color, outer: Color) -> Result<Self> {
        Self::from_load(
            sys::gen_image_gradient_radial(width, height, density, inner, outer),
            "radial gradient generator",
        )
    }

    /// New image holding the part of this one inside `rec`.
    pub fn from_image(&self, rec: Rectangle) -> Result<Self> {
        Self::from_load(sys::image_from_image(*self.raw(), rec), "sub-image")
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn width(&self) -> i32 {
        self.raw().width
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.raw().height
    }

    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.raw().format
    }

    #[must_use]
    pub fn mipmaps(&self) -> i32 {
        self.raw().mipmaps
    }

    #[must_use]
    pub fn get_color(&self, x: i32, y: i32) -> Color {
        sys::get_image_color(*self.raw(), x, y)
    }

    #[must_use]
    pub fn colors(&self) -> Vec<Color> {
        sys::load_image_colors(*self.raw())
    }

    /// Raw pixel bytes in the image's format.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        sys::get_image_data(*self.raw())
    }

    #[must_use]
    pub fn average_color(&self) -> Color {
        sys::get_image_average_color(*self.raw())
    }

    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if sys::export_image(*self.raw(), path) {
            Ok(())
        } else {
            Err(RaywrapError::ExportFailed(path.display().to_string()))
        }
    }

    pub fn export_to_memory(&self, file_type: &str) -> Result<Vec<u8>> {
        sys::export_image_to_memory(*self.raw(), file_type)
            .ok_or_else(|| RaywrapError::ExportFailed(format!("memory ({file_type})")))
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    pub fn crop(&mut self, rec: Rectangle) -> &mut Self {
        sys::image_crop(self.raw_mut(), rec);
        self
    }

    /// Bilinear resize.
    pub fn resize(&mut self, width: i32, height: i32) -> &mut Self {
        sys::image_resize(self.raw_mut(), width, height);
        self
    }

    /// Nearest-neighbor resize.
    pub fn resize_nn(&mut self, width: i32, height: i32) -> &mut Self {
        sys::image_resize_nn(self.raw_mut(), width, height);
        self
    }

    pub fn resize_canvas(&mut self, width: i32, height: i32, offset_x: i32, offset_y: i32, fill: Color) -> &mut Self {
        sys::image_resize_canvas(self.raw_mut(), width, height, offset_x, offset_y, fill);
        self
    }

    pub fn flip_vertical(&mut self) -> &mut Self {
        sys::image_flip_vertical(self.raw_mut());
        self
    }

    pub fn flip_horizontal(&mut self) -> &mut Self {
        sys::image_flip_horizontal(self.raw_mut());
        self
    }

    pub fn rotate_cw(&mut self) -> &mut Self {
        sys::image_rotate_cw(self.raw_mut());
        self
    }

    pub fn rotate_ccw(&mut self) -> &mut Self {
        sys::image_rotate_ccw(self.raw_mut());
        self
    }

    pub fn color_invert(&mut self) -> &mut Self {
        sys::image_color_invert(self.raw_mut());
        self
    }

    pub fn color_tint(&mut self, tint: Color) -> &mut Self {
        sys::image_color_tint(self.raw_mut(), tint);
        self
    }

    pub fn color_grayscale(&mut self) -> &mut Self {
        sys::image_color_grayscale(self.raw_mut());
        self
    }

    pub fn set_format(&mut self, format: PixelFormat) -> &mut Self {
        sys::image_format(self.raw_mut(), format);
        self
    }

    pub fn clear_background(&mut self, color: Color) -> &mut Self {
        sys::image_clear_background(self.raw_mut(), color);
        self
    }

    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) -> &mut Self {
        sys::image_draw_pixel(self.raw_mut(), x, y, color);
        self
    }

    pub fn draw_rectangle(&mut self, rec: Rectangle, color: Color) -> &mut Self {
        sys::image_draw_rectangle_rec(self.raw_mut(), rec, color);
        self
    }

    /// Blits `src_rec` of `src` into `dst_rec` of this image.
    pub fn draw_image(&mut self, src: &Image, src_rec: Rectangle, dst_rec: Rectangle, tint: Color) -> &mut Self {
        sys::image_draw(self.raw_mut(), *src.raw(), src_rec, dst_rec, tint);
        self
    }
}

impl Clone for Image {
    fn clone(&self) -> Self {
        Self::from_raw(sys::image_copy(*self.raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::ResourceKind;

    #[test]
    fn clone_is_deep() {
        let original = Image::gen_color(8, 8, Color::RED).unwrap();
        let mut copy = original.clone();
        copy.color_invert();
        assert_eq!(original.get_color(0, 0), Color::RED);
        assert_ne!(copy.get_color(0, 0), Color::RED);

        copy.unload();
        assert!(original.is_ready());
        drop(original);
        assert_eq!(sys::resource_stats().live(ResourceKind::Image), 0);
    }

    #[test]
    fn editing_chains() {
        let mut image = Image::gen_checked(64, 64, 8, 8, Color::WHITE, Color::BLACK).unwrap();
        image
            .crop(Rectangle::new(0.0, 0.0, 32.0, 16.0))
            .resize(16, 8)
            .rotate_cw();
        assert_eq!((image.width(), image.height()), (8, 16));
    }
}
