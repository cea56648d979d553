//! Fonts and text measurement.
//!
//! TrueType/OpenType fonts are rasterized with `fontdue` into a gray-alpha
//! atlas. The default font is a built-in 10 px bitmap font whose glyph
//! widths match the classic one; it is created on first use and never
//! released.

use std::path::Path;

use fontdue::FontSettings;

use crate::math::{Color, Rectangle, Vector2};
use crate::sys::context::{with_core, GpuTexture, ResourceKind};
use crate::sys::files::{get_file_extension, load_file_data};
use crate::sys::image::{alloc_image, unload_image};
use crate::sys::texture::load_texture_from_image;
use crate::sys::trace::{trace_info, trace_warn};
use crate::sys::types::{GlyphInfo, PixelFormat, RawFont, RawTexture, TextureFilter, TextureWrap};
use crate::sys::window::{count_draw_call, get_fps};

/// Pixel size used when none is given.
pub const FONT_TTF_DEFAULT_SIZE: i32 = 32;
pub const FONT_TTF_DEFAULT_NUMCHARS: usize = 95;
pub const FONT_TTF_DEFAULT_FIRST_CHAR: u32 = 32;
const DEFAULT_GLYPH_PADDING: i32 = 4;

const DEFAULT_FONT_SIZE: i32 = 10;
/// Widths of the built-in font glyphs, codepoints 32..=126.
const DEFAULT_GLYPH_WIDTHS: [i32; 95] = [
    3, 1, 4, 6, 5, 7, 6, 2, 3, 3, 5, 5, 2, 4, 1, 7, 5, 2, 5, 5, 5, 5, 5, 5, 5, 5, 1, 1, 3, 4, 3,
    6, 7, 6, 6, 6, 6, 6, 6, 6, 6, 3, 5, 6, 5, 7, 6, 6, 6, 6, 6, 6, 7, 6, 7, 7, 6, 6, 6, 2, 7, 2,
    3, 5, 2, 5, 5, 5, 5, 5, 4, 5, 5, 1, 2, 5, 2, 5, 5, 5, 5, 5, 5, 5, 4, 5, 5, 5, 5, 5, 5, 3, 1,
    3, 4,
];

fn default_codepoints() -> Vec<char> {
    (FONT_TTF_DEFAULT_FIRST_CHAR..FONT_TTF_DEFAULT_FIRST_CHAR + FONT_TTF_DEFAULT_NUMCHARS as u32)
        .filter_map(char::from_u32)
        .collect()
}

// ============================================================================
// Default font
// ============================================================================

fn build_default_font() -> RawFont {
    let padding = 1;
    let mut glyphs = Vec::with_capacity(DEFAULT_GLYPH_WIDTHS.len());
    let mut x = padding;
    for (value, &width) in default_codepoints().into_iter().zip(DEFAULT_GLYPH_WIDTHS.iter()) {
        glyphs.push(GlyphInfo {
            value,
            offset_x: 0,
            offset_y: 0,
            advance_x: 0,
            rec: Rectangle::new(x as f32, padding as f32, width as f32, DEFAULT_FONT_SIZE as f32),
        });
        x += width + 2 * padding;
    }

    let (atlas_width, atlas_height) = (x, DEFAULT_FONT_SIZE + 2 * padding);
    let format = PixelFormat::UncompressedGrayAlpha;
    with_core(|core| {
        let texture_id = core.alloc_id();
        core.textures.insert(
            texture_id,
            GpuTexture {
                width: atlas_width,
                height: atlas_height,
                mipmaps: 1,
                format,
                pixels: vec![0; format.data_size(atlas_width, atlas_height)],
                filter: TextureFilter::Point,
                wrap: TextureWrap::Clamp,
            },
        );
        let glyph_table = core.alloc_id();
        let glyph_count = glyphs.len() as i32;
        core.glyph_tables.insert(glyph_table, glyphs);

        RawFont {
            base_size: DEFAULT_FONT_SIZE,
            glyph_count,
            glyph_padding: 0,
            texture: RawTexture {
                id: texture_id,
                width: atlas_width,
                height: atlas_height,
                mipmaps: 1,
                format,
            },
            glyphs: glyph_table,
        }
    })
}

/// The built-in font. Created on first call; never released.
#[must_use]
pub fn get_font_default() -> RawFont {
    if let Some(font) = with_core(|core| core.default_font) {
        return font;
    }
    let font = build_default_font();
    with_core(|core| core.default_font = Some(font));
    trace_info!("FONT: Default font loaded successfully ({} glyphs)", font.glyph_count);
    font
}

fn is_default_font(font: RawFont) -> bool {
    with_core(|core| core.default_font.is_some_and(|d| d.glyphs == font.glyphs))
}

// ============================================================================
// Loading
// ============================================================================

pub fn load_font(path: impl AsRef<Path>) -> RawFont {
    load_font_ex(path, FONT_TTF_DEFAULT_SIZE, None)
}

/// Loads a font rasterized at `font_size` pixels. `None` codepoints load
/// the printable ASCII range.
pub fn load_font_ex(path: impl AsRef<Path>, font_size: i32, codepoints: Option<&[char]>) -> RawFont {
    let path = path.as_ref();
    let Some(data) = load_file_data(path) else {
        return RawFont::default();
    };
    let ext = get_file_extension(path).unwrap_or_default();
    load_font_from_memory(&ext, &data, font_size, codepoints)
}

/// Places `sizes` on shelves of an atlas `width` pixels wide. Returns the
/// positions and the atlas height.
fn pack_shelves(sizes: &[(i32, i32)], width: i32, padding: i32) -> (Vec<(i32, i32)>, i32) {
    let mut positions = Vec::with_capacity(sizes.len());
    let (mut x, mut y, mut shelf) = (padding, padding, 0);
    for &(w, h) in sizes {
        if x + w + padding > width {
            x = padding;
            y += shelf + padding;
            shelf = 0;
        }
        positions.push((x, y));
        x += w + padding;
        shelf = shelf.max(h);
    }
    (positions, y + shelf + padding)
}

pub fn load_font_from_memory(
    file_type: &str,
    data: &[u8],
    font_size: i32,
    codepoints: Option<&[char]>,
) -> RawFont {
    if !matches!(file_type, ".ttf" | ".otf") {
        trace_warn!("FONT: Font file type {file_type} not supported");
        return RawFont::default();
    }
    let font_size = if font_size > 0 { font_size } else { FONT_TTF_DEFAULT_SIZE };
    let settings = FontSettings {
        scale: font_size as f32,
        ..FontSettings::default()
    };
    let face = match fontdue::Font::from_bytes(data, settings) {
        Ok(face) => face,
        Err(err) => {
            trace_warn!("FONT: Failed to process font data: {err}");
            return RawFont::default();
        }
    };

    let size = font_size as f32;
    let ascent = face
        .horizontal_line_metrics(size)
        .map_or(size, |m| m.ascent.ceil());

    let codepoints = codepoints.map_or_else(default_codepoints, <[char]>::to_vec);
    let mut glyphs = Vec::with_capacity(codepoints.len());
    let mut bitmaps = Vec::with_capacity(codepoints.len());
    for c in codepoints {
        let (metrics, bitmap) = face.rasterize(c, size);
        glyphs.push(GlyphInfo {
            value: c,
            offset_x: metrics.xmin,
            offset_y: (ascent - metrics.height as f32 - metrics.ymin as f32) as i32,
            advance_x: metrics.advance_width.round() as i32,
            rec: Rectangle::default(),
        });
        bitmaps.push((metrics.width as i32, metrics.height as i32, bitmap));
    }

    // Roughly square atlas, power-of-two width.
    let area: i32 = bitmaps
        .iter()
        .map(|(w, h, _)| (w + DEFAULT_GLYPH_PADDING) * (h + DEFAULT_GLYPH_PADDING))
        .sum();
    let width = ((area.max(1) as f32).sqrt().ceil() as u32).next_power_of_two().max(64) as i32;
    let sizes: Vec<(i32, i32)> = bitmaps.iter().map(|(w, h, _)| (*w, *h)).collect();
    let (positions, height) = pack_shelves(&sizes, width, DEFAULT_GLYPH_PADDING);

    // White glyphs, coverage in alpha.
    let mut atlas = vec![0u8; (width * height) as usize * 2];
    for (i, (glyph, (w, h, bitmap))) in glyphs.iter_mut().zip(&bitmaps).enumerate() {
        let (px, py) = positions[i];
        glyph.rec = Rectangle::new(px as f32, py as f32, *w as f32, *h as f32);
        for row in 0..*h {
            for col in 0..*w {
                let coverage = bitmap[(row * w + col) as usize];
                let at = (((py + row) * width + px + col) * 2) as usize;
                atlas[at] = 255;
                atlas[at + 1] = coverage;
            }
        }
    }

    let image = alloc_image(width, height, PixelFormat::UncompressedGrayAlpha, atlas);
    let texture = load_texture_from_image(image);
    unload_image(image);
    if texture.id == 0 {
        return RawFont::default();
    }

    let glyph_count = glyphs.len() as i32;
    let font = with_core(|core| {
        let table = core.alloc_id();
        core.glyph_tables.insert(table, glyphs);
        core.track_load(ResourceKind::Font);
        RawFont {
            base_size: font_size,
            glyph_count,
            glyph_padding: DEFAULT_GLYPH_PADDING,
            texture,
            glyphs: table,
        }
    });
    trace_info!("FONT: Data loaded successfully ({font_size} pixel size | {glyph_count} glyphs)");
    font
}

#[must_use]
pub fn is_font_ready(font: RawFont) -> bool {
    font.base_size > 0
        && font.glyph_count > 0
        && font.texture.id > 0
        && with_core(|core| {
            core.glyph_tables.contains_key(&font.glyphs) && core.textures.contains_key(&font.texture.id)
        })
}

/// Releases the atlas and the glyph table. The default font is kept.
pub fn unload_font(font: RawFont) {
    if font.glyphs == 0 || is_default_font(font) {
        return;
    }
    let known = with_core(|core| {
        let known = core.glyph_tables.remove(&font.glyphs).is_some();
        if known {
            if core.textures.remove(&font.texture.id).is_some() {
                core.track_unload(ResourceKind::Texture);
            }
            core.track_unload(ResourceKind::Font);
        } else {
            core.track_stray();
        }
        known
    });
    if known {
        trace_info!("FONT: Unloaded font data from RAM and VRAM");
    } else {
        trace_warn!("FONT: Unload of unknown font data");
    }
}

// ============================================================================
// Glyphs and measurement
// ============================================================================

fn glyph_table(font: RawFont) -> Vec<GlyphInfo> {
    with_core(|core| core.glyph_tables.get(&font.glyphs).cloned().unwrap_or_default())
}

fn index_in(glyphs: &[GlyphInfo], codepoint: char) -> usize {
    glyphs
        .iter()
        .position(|g| g.value == codepoint)
        .or_else(|| glyphs.iter().position(|g| g.value == '?'))
        .unwrap_or(0)
}

/// Index of `codepoint`, falling back to `'?'` and then to the first glyph.
#[must_use]
pub fn get_glyph_index(font: RawFont, codepoint: char) -> usize {
    index_in(&glyph_table(font), codepoint)
}

#[must_use]
pub fn get_glyph_info(font: RawFont, codepoint: char) -> GlyphInfo {
    let glyphs = glyph_table(font);
    glyphs.get(index_in(&glyphs, codepoint)).copied().unwrap_or_default()
}

#[must_use]
pub fn get_glyph_atlas_rec(font: RawFont, codepoint: char) -> Rectangle {
    get_glyph_info(font, codepoint).rec
}

/// Size of `text` drawn at `font_size` with `spacing` pixels between glyphs.
#[must_use]
pub fn measure_text_ex(font: RawFont, text: &str, font_size: f32, spacing: f32) -> Vector2 {
    let glyphs = glyph_table(font);
    if text.is_empty() || glyphs.is_empty() || font.base_size <= 0 {
        return Vector2::ZERO;
    }

    let scale = font_size / font.base_size as f32;
    let (mut line_width, mut max_width) = (0.0f32, 0.0f32);
    let (mut line_chars, mut max_chars) = (0usize, 0usize);
    let mut height = font.base_size as f32;

    for c in text.chars() {
        if c == '\n' {
            max_width = max_width.max(line_width);
            line_width = 0.0;
            line_chars = 0;
            height += font.base_size as f32 * 1.5;
            continue;
        }
        let glyph = glyphs[index_in(&glyphs, c)];
        line_width += if glyph.advance_x > 0 {
            glyph.advance_x as f32
        } else {
            glyph.rec.width + glyph.offset_x as f32
        };
        line_chars += 1;
        max_chars = max_chars.max(line_chars);
    }
    max_width = max_width.max(line_width);

    Vector2::new(
        max_width * scale + max_chars.saturating_sub(1) as f32 * spacing,
        height * scale,
    )
}

/// Width of `text` in the default font.
#[must_use]
pub fn measure_text(text: &str, font_size: i32) -> i32 {
    let font_size = font_size.max(DEFAULT_FONT_SIZE);
    let spacing = font_size / DEFAULT_FONT_SIZE;
    measure_text_ex(get_font_default(), text, font_size as f32, spacing as f32).x as i32
}

// ============================================================================
// Drawing
// ============================================================================

pub fn draw_text_ex(
    font: RawFont,
    text: &str,
    _position: Vector2,
    _font_size: f32,
    _spacing: f32,
    _tint: Color,
) {
    if font.texture.id == 0 || text.is_empty() {
        return;
    }
    count_draw_call();
}

pub fn draw_text(text: &str, x: i32, y: i32, font_size: i32, color: Color) {
    let font_size = font_size.max(DEFAULT_FONT_SIZE);
    let spacing = font_size / DEFAULT_FONT_SIZE;
    draw_text_ex(
        get_font_default(),
        text,
        Vector2::new(x as f32, y as f32),
        font_size as f32,
        spacing as f32,
        color,
    );
}

pub fn draw_fps(x: i32, y: i32) {
    draw_text(&format!("{} FPS", get_fps()), x, y, 20, Color::LIME);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::context::resource_stats;

    #[test]
    fn default_font_metrics() {
        let font = get_font_default();
        assert!(is_font_ready(font));
        assert_eq!(font.glyph_count, 95);
        assert_eq!(get_glyph_atlas_rec(font, 'A').width, 6.0);

        // "Hi": 6 + 1 px glyphs, one spacing gap at size 10.
        assert_eq!(measure_text("Hi", 10), 8);
        // Twice the size doubles glyphs and spacing.
        assert_eq!(measure_text("Hi", 20), 16);
    }

    #[test]
    fn multiline_height_grows_by_line_spacing() {
        let font = get_font_default();
        let one = measure_text_ex(font, "abc", 10.0, 1.0);
        let two = measure_text_ex(font, "abc\nab", 10.0, 1.0);
        assert_eq!(one.y, 10.0);
        assert_eq!(two.y, 25.0);
        assert_eq!(one.x, two.x);
    }

    #[test]
    fn unknown_codepoint_falls_back_to_question_mark() {
        let font = get_font_default();
        assert_eq!(get_glyph_info(font, '\u{2603}').value, '?');
    }

    #[test]
    fn default_font_is_never_released() {
        let font = get_font_default();
        unload_font(font);
        assert!(is_font_ready(font));
        assert_eq!(resource_stats().stray_releases(), 0);
    }

    #[test]
    fn unsupported_type_fails() {
        let font = load_font_from_memory(".fnt", b"info face=x", 16, None);
        assert!(!is_font_ready(font));
    }

    #[test]
    fn shelves_wrap_at_atlas_width() {
        let (positions, height) = pack_shelves(&[(10, 5), (10, 8), (10, 4)], 26, 2);
        assert_eq!(positions, vec![(2, 2), (14, 2), (2, 12)]);
        assert_eq!(height, 18);
    }
}
