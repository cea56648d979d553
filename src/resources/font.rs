//! Fonts.

use std::path::Path;

use crate::errors::Result;
use crate::handle::{AsRaw, Owned, Unmanaged};
use crate::math::{Color, Rectangle, Vector2};
use crate::resources::texture::TextureUnmanaged;
use crate::sys::{self, GlyphInfo, RawFont};

/// Glyph atlas plus glyph table, released together.
pub type Font = Owned<RawFont>;

/// A font released by someone else, usually the default font.
pub type FontUnmanaged = Unmanaged<RawFont>;

/// Measurement and drawing shared by owned and borrowed fonts.
pub trait FontOps: AsRaw<RawFont> {
    fn base_size(&self) -> i32 {
        self.as_raw().base_size
    }

    fn glyph_count(&self) -> i32 {
        self.as_raw().glyph_count
    }

    fn glyph_padding(&self) -> i32 {
        self.as_raw().glyph_padding
    }

    /// The atlas. Owned by the font.
    fn texture(&self) -> TextureUnmanaged {
        Unmanaged::new(self.as_raw().texture)
    }

    fn glyph_index(&self, codepoint: char) -> usize {
        sys::get_glyph_index(*self.as_raw(), codepoint)
    }

    fn glyph_info(&self, codepoint: char) -> GlyphInfo {
        sys::get_glyph_info(*self.as_raw(), codepoint)
    }

    fn glyph_atlas_rec(&self, codepoint: char) -> Rectangle {
        sys::get_glyph_atlas_rec(*self.as_raw(), codepoint)
    }

    fn measure_text(&self, text: &str, font_size: f32, spacing: f32) -> Vector2 {
        sys::measure_text_ex(*self.as_raw(), text, font_size, spacing)
    }

    fn draw_text(&self, text: &str, position: Vector2, font_size: f32, spacing: f32, tint: Color) {
        sys::draw_text_ex(*self.as_raw(), text, position, font_size, spacing, tint);
    }
}

impl<T: AsRaw<RawFont>> FontOps for T {}

impl Font {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::from_load(sys::load_font(path), path.display().to_string())
    }

    /// Rasterizes at `font_size` pixels. `None` loads printable ASCII.
    pub fn load_ex(path: impl AsRef<Path>, font_size: i32, codepoints: Option<&[char]>) -> Result<Self> {
        let path = path.as_ref();
        Self::from_load(
            sys::load_font_ex(path, font_size, codepoints),
            path.display().to_string(),
        )
    }

    /// `file_type` is `".ttf"` or `".otf"`.
    pub fn load_from_memory(file_type: &str, data: &[u8], font_size: i32, codepoints: Option<&[char]>) -> Result<Self> {
        Self::from_load(
            sys::load_font_from_memory(file_type, data, font_size, codepoints),
            format!("memory ({file_type})"),
        )
    }

    /// The library's built-in font. Never released.
    #[must_use]
    pub fn default_font() -> FontUnmanaged {
        Unmanaged::new(sys::get_font_default())
    }
}
