//! GPU textures and render targets.

use std::path::Path;

use crate::errors::Result;
use crate::handle::{AsRaw, Owned, Unmanaged};
use crate::math::{Color, Rectangle, Vector2};
use crate::resources::image::Image;
use crate::sys::{self, PixelFormat, RawRenderTexture, RawTexture, TextureFilter, TextureWrap};

/// Texture in GPU memory. Not clonable: copying would need a new upload.
pub type Texture = Owned<RawTexture>;

/// A texture released by someone else: a render target's color attachment,
/// a font atlas, the default texture.
pub type TextureUnmanaged = Unmanaged<RawTexture>;

/// Queries and draw calls shared by owning and borrowed textures.
pub trait TextureDraw: AsRaw<RawTexture> {
    fn width(&self) -> i32 {
        self.as_raw().width
    }

    fn height(&self) -> i32 {
        self.as_raw().height
    }

    fn size(&self) -> Vector2 {
        Vector2::new(self.width() as f32, self.height() as f32)
    }

    fn format(&self) -> PixelFormat {
        self.as_raw().format
    }

    fn mipmaps(&self) -> i32 {
        self.as_raw().mipmaps
    }

    fn filter(&self) -> Option<TextureFilter> {
        sys::get_texture_filter(*self.as_raw())
    }

    fn wrap(&self) -> Option<TextureWrap> {
        sys::get_texture_wrap(*self.as_raw())
    }

    /// Reads the pixels back into a new image.
    fn to_image(&self) -> Result<Image> {
        Image::from_load(
            sys::load_image_from_texture(*self.as_raw()),
            format!("texture {}", self.as_raw().id),
        )
    }

    fn draw(&self, x: i32, y: i32, tint: Color) {
        sys::draw_texture(*self.as_raw(), x, y, tint);
    }

    fn draw_v(&self, position: Vector2, tint: Color) {
        sys::draw_texture_v(*self.as_raw(), position, tint);
    }

    fn draw_ex(&self, position: Vector2, rotation: f32, scale: f32, tint: Color) {
        sys::draw_texture_ex(*self.as_raw(), position, rotation, scale, tint);
    }

    fn draw_rec(&self, source: Rectangle, position: Vector2, tint: Color) {
        sys::draw_texture_rec(*self.as_raw(), source, position, tint);
    }

    fn draw_pro(&self, source: Rectangle, dest: Rectangle, origin: Vector2, rotation: f32, tint: Color) {
        sys::draw_texture_pro(*self.as_raw(), source, dest, origin, rotation, tint);
    }
}

impl<T: AsRaw<RawTexture>> TextureDraw for T {}

impl Texture {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::from_load(sys::load_texture(path), path.display().to_string())
    }

    pub fn from_image(image: &Image) -> Result<Self> {
        Self::from_load(sys::load_texture_from_image(*image.raw()), "image")
    }

    /// The library's 1x1 white texture.
    #[must_use]
    pub fn default_texture() -> TextureUnmanaged {
        Unmanaged::new(sys::get_default_texture())
    }

    /// Replaces the whole contents; `pixels` must match the format.
    pub fn update(&mut self, pixels: &[u8]) -> &mut Self {
        sys::update_texture(*self.raw(), pixels);
        self
    }

    pub fn update_rec(&mut self, rec: Rectangle, pixels: &[u8]) -> &mut Self {
        sys::update_texture_rec(*self.raw(), rec, pixels);
        self
    }

    pub fn gen_mipmaps(&mut self) -> &mut Self {
        sys::gen_texture_mipmaps(self.raw_mut());
        self
    }

    pub fn set_filter(&mut self, filter: TextureFilter) -> &mut Self {
        sys::set_texture_filter(*self.raw(), filter);
        self
    }

    pub fn set_wrap(&mut self, wrap: TextureWrap) -> &mut Self {
        sys::set_texture_wrap(*self.raw(), wrap);
        self
    }
}

// ============================================================================
// RenderTexture
// ============================================================================

/// Framebuffer with a color and a depth attachment, released together.
pub type RenderTexture = Owned<RawRenderTexture>;

impl RenderTexture {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        Self::from_load(
            sys::load_render_texture(width, height),
            format!("framebuffer {width}x{height}"),
        )
    }

    /// Color attachment. Owned by the render texture.
    #[must_use]
    pub fn texture(&self) -> TextureUnmanaged {
        Unmanaged::new(self.raw().texture)
    }

    #[must_use]
    pub fn depth(&self) -> TextureUnmanaged {
        Unmanaged::new(self.raw().depth)
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.raw().texture.width
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.raw().texture.height
    }

    /// Redirects drawing into this target until the guard is dropped.
    #[must_use = "the mode ends when the guard is dropped"]
    pub fn begin(&mut self) -> TextureMode<'_> {
        sys::begin_texture_mode(*self.raw());
        TextureMode { _target: self }
    }
}

/// Active texture mode. Dropping it calls `end_texture_mode`.
#[derive(Debug)]
pub struct TextureMode<'a> {
    _target: &'a mut RenderTexture,
}

impl Drop for TextureMode<'_> {
    fn drop(&mut self) {
        sys::end_texture_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::ResourceKind;

    #[test]
    fn render_texture_mode_is_scoped() {
        let mut target = RenderTexture::new(32, 16).unwrap();
        let id = target.raw().id;
        {
            let _mode = target.begin();
            assert_eq!(sys::active_render_target(), id);
        }
        assert_eq!(sys::active_render_target(), 0);
        assert_eq!(target.texture().width(), 32);
    }

    #[test]
    fn attachment_view_is_not_released() {
        let target = RenderTexture::new(8, 8).unwrap();
        drop(target.texture());
        assert!(target.texture().is_ready());
        drop(target);

        let stats = sys::resource_stats();
        assert_eq!(stats.live(ResourceKind::RenderTexture), 0);
        assert_eq!(stats.unloaded(ResourceKind::Texture), 0);
        assert_eq!(stats.stray_releases(), 0);
    }

    #[test]
    fn readback_matches_source() {
        let image = Image::gen_color(4, 4, Color::GOLD).unwrap();
        let texture = Texture::from_image(&image).unwrap();
        let back = texture.to_image().unwrap();
        assert_eq!(back.get_color(3, 3), Color::GOLD);
    }
}
