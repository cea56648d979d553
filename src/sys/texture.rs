//! GPU textures and render targets.
//!
//! Texture objects keep a copy of their level-0 pixels so images can be read
//! back. Render textures own a color texture and a depth attachment that are
//! released together with the framebuffer.

use std::path::Path;

use crate::math::{Color, Rectangle, Vector2};
use crate::sys::context::{with_core, Framebuffer, GpuTexture, ResourceKind};
use crate::sys::image::{alloc_image, get_image_data, load_image, unload_image};
use crate::sys::trace::{trace_info, trace_warn};
use crate::sys::types::{
    PixelFormat, RawImage, RawRenderTexture, RawTexture, TextureFilter, TextureWrap,
    DEFAULT_TEXTURE_ID,
};
use crate::sys::window::count_draw_call;

/// Inserts a texture object without touching the load counters.
fn create_texture(width: i32, height: i32, format: PixelFormat, pixels: Vec<u8>) -> RawTexture {
    with_core(|core| {
        let id = core.alloc_id();
        core.textures.insert(
            id,
            GpuTexture {
                width,
                height,
                mipmaps: 1,
                format,
                pixels,
                filter: TextureFilter::Point,
                wrap: TextureWrap::Repeat,
            },
        );
        RawTexture {
            id,
            width,
            height,
            mipmaps: 1,
            format,
        }
    })
}

#[must_use]
pub fn get_default_texture() -> RawTexture {
    RawTexture {
        id: DEFAULT_TEXTURE_ID,
        width: 1,
        height: 1,
        mipmaps: 1,
        format: PixelFormat::UncompressedR8G8B8A8,
    }
}

pub fn load_texture(path: impl AsRef<Path>) -> RawTexture {
    let image = load_image(path);
    if image.data == 0 {
        return RawTexture::default();
    }
    let texture = load_texture_from_image(image);
    unload_image(image);
    texture
}

pub fn load_texture_from_image(image: RawImage) -> RawTexture {
    if image.width <= 0 || image.height <= 0 {
        trace_warn!("IMAGE: Data is not valid to load texture");
        return RawTexture::default();
    }
    let pixels = get_image_data(image);
    if pixels.is_empty() {
        trace_warn!("IMAGE: Data is not valid to load texture");
        return RawTexture::default();
    }

    let mut texture = create_texture(image.width, image.height, image.format, pixels);
    texture.mipmaps = image.mipmaps.max(1);
    with_core(|core| core.track_load(ResourceKind::Texture));
    trace_info!(
        "TEXTURE: [ID {}] Texture loaded successfully ({}x{} | {} | {} mipmaps)",
        texture.id,
        texture.width,
        texture.height,
        texture.format.name(),
        texture.mipmaps
    );
    texture
}

#[must_use]
pub fn is_texture_ready(texture: RawTexture) -> bool {
    texture.id > 0
        && texture.width > 0
        && texture.height > 0
        && with_core(|core| core.textures.contains_key(&texture.id))
}

pub fn unload_texture(texture: RawTexture) {
    if texture.id == 0 || texture.id == DEFAULT_TEXTURE_ID {
        return;
    }
    let known = with_core(|core| {
        let known = core.textures.remove(&texture.id).is_some();
        if known {
            core.track_unload(ResourceKind::Texture);
        } else {
            core.track_stray();
        }
        known
    });
    if known {
        trace_info!("TEXTURE: [ID {}] Unloaded texture data from VRAM (GPU)", texture.id);
    } else {
        trace_warn!("TEXTURE: [ID {}] Unload of unknown texture", texture.id);
    }
}

/// Copies the texture contents back into a new image.
pub fn load_image_from_texture(texture: RawTexture) -> RawImage {
    let readback = with_core(|core| {
        core.textures
            .get(&texture.id)
            .filter(|t| t.format != PixelFormat::Depth24)
            .map(|t| (t.width, t.height, t.format, t.pixels.clone()))
    });
    match readback {
        Some((width, height, format, pixels)) => alloc_image(width, height, format, pixels),
        None => {
            trace_warn!("TEXTURE: [ID {}] Failed to read texture pixel data", texture.id);
            RawImage::default()
        }
    }
}

/// Replaces the whole texture contents. `pixels` must match the format.
pub fn update_texture(texture: RawTexture, pixels: &[u8]) {
    let expected = texture.format.data_size(texture.width, texture.height);
    if pixels.len() != expected {
        trace_warn!(
            "TEXTURE: [ID {}] Update size mismatch ({} bytes, expected {expected})",
            texture.id,
            pixels.len()
        );
        return;
    }
    with_core(|core| {
        if let Some(t) = core.textures.get_mut(&texture.id) {
            t.pixels.clear();
            t.pixels.extend_from_slice(pixels);
        }
    });
}

/// Replaces the pixels inside `rec`.
pub fn update_texture_rec(texture: RawTexture, rec: Rectangle, pixels: &[u8]) {
    let (x, y, w, h) = (rec.x as i32, rec.y as i32, rec.width as i32, rec.height as i32);
    if x < 0 || y < 0 || w <= 0 || h <= 0 || x + w > texture.width || y + h > texture.height {
        trace_warn!("TEXTURE: [ID {}] Update rectangle out of bounds", texture.id);
        return;
    }
    let bpp = texture.format.bytes_per_pixel();
    if pixels.len() != w as usize * h as usize * bpp {
        trace_warn!("TEXTURE: [ID {}] Update size mismatch", texture.id);
        return;
    }
    with_core(|core| {
        let Some(t) = core.textures.get_mut(&texture.id) else {
            return;
        };
        let stride = t.width as usize * bpp;
        for (row, src) in pixels.chunks_exact(w as usize * bpp).enumerate() {
            let start = (y as usize + row) * stride + x as usize * bpp;
            if let Some(dst) = t.pixels.get_mut(start..start + src.len()) {
                dst.copy_from_slice(src);
            }
        }
    });
}

/// Generates the mip chain and updates `texture.mipmaps`.
pub fn gen_texture_mipmaps(texture: &mut RawTexture) {
    let levels = (texture.width.max(texture.height).max(1) as f32).log2().floor() as i32 + 1;
    let updated = with_core(|core| match core.textures.get_mut(&texture.id) {
        Some(t) => {
            t.mipmaps = levels;
            true
        }
        None => false,
    });
    if updated {
        texture.mipmaps = levels;
        trace_info!("TEXTURE: [ID {}] Mipmaps generated automatically, total: {levels}", texture.id);
    }
}

pub fn set_texture_filter(texture: RawTexture, filter: TextureFilter) {
    with_core(|core| {
        if let Some(t) = core.textures.get_mut(&texture.id) {
            t.filter = filter;
        }
    });
}

pub fn set_texture_wrap(texture: RawTexture, wrap: TextureWrap) {
    with_core(|core| {
        if let Some(t) = core.textures.get_mut(&texture.id) {
            t.wrap = wrap;
        }
    });
}

#[must_use]
pub fn get_texture_filter(texture: RawTexture) -> Option<TextureFilter> {
    with_core(|core| core.textures.get(&texture.id).map(|t| t.filter))
}

#[must_use]
pub fn get_texture_wrap(texture: RawTexture) -> Option<TextureWrap> {
    with_core(|core| core.textures.get(&texture.id).map(|t| t.wrap))
}

// ============================================================================
// Render textures
// ============================================================================

pub fn load_render_texture(width: i32, height: i32) -> RawRenderTexture {
    if width <= 0 || height <= 0 {
        trace_warn!("FBO: Render texture size must be positive ({width}x{height})");
        return RawRenderTexture::default();
    }

    let format = PixelFormat::UncompressedR8G8B8A8;
    let texture = create_texture(width, height, format, vec![0; format.data_size(width, height)]);
    let depth = create_texture(width, height, PixelFormat::Depth24, Vec::new());
    let id = with_core(|core| {
        let id = core.alloc_id();
        core.framebuffers.insert(
            id,
            Framebuffer {
                color: texture.id,
                depth: depth.id,
            },
        );
        core.track_load(ResourceKind::RenderTexture);
        id
    });

    trace_info!("FBO: [ID {id}] Framebuffer object created successfully");
    RawRenderTexture { id, texture, depth }
}

#[must_use]
pub fn is_render_texture_ready(target: RawRenderTexture) -> bool {
    target.id > 0
        && with_core(|core| {
            core.framebuffers.contains_key(&target.id)
                && core.textures.contains_key(&target.texture.id)
        })
}

/// Releases the framebuffer and both attachments.
pub fn unload_render_texture(target: RawRenderTexture) {
    if target.id == 0 {
        return;
    }
    let known = with_core(|core| match core.framebuffers.remove(&target.id) {
        Some(fb) => {
            core.textures.remove(&fb.color);
            core.textures.remove(&fb.depth);
            core.track_unload(ResourceKind::RenderTexture);
            true
        }
        None => {
            core.track_stray();
            false
        }
    });
    if known {
        trace_info!("FBO: [ID {}] Unloaded framebuffer from VRAM (GPU)", target.id);
    } else {
        trace_warn!("FBO: [ID {}] Unload of unknown framebuffer", target.id);
    }
}

// ============================================================================
// Drawing
// ============================================================================

pub fn draw_texture(texture: RawTexture, x: i32, y: i32, tint: Color) {
    draw_texture_v(texture, Vector2::new(x as f32, y as f32), tint);
}

pub fn draw_texture_v(texture: RawTexture, position: Vector2, tint: Color) {
    draw_texture_ex(texture, position, 0.0, 1.0, tint);
}

pub fn draw_texture_ex(texture: RawTexture, position: Vector2, rotation: f32, scale: f32, tint: Color) {
    let source = Rectangle::new(0.0, 0.0, texture.width as f32, texture.height as f32);
    let dest = Rectangle::new(
        position.x,
        position.y,
        texture.width as f32 * scale,
        texture.height as f32 * scale,
    );
    draw_texture_pro(texture, source, dest, Vector2::ZERO, rotation, tint);
}

pub fn draw_texture_rec(texture: RawTexture, source: Rectangle, position: Vector2, tint: Color) {
    let dest = Rectangle::new(position.x, position.y, source.width.abs(), source.height.abs());
    draw_texture_pro(texture, source, dest, Vector2::ZERO, 0.0, tint);
}

/// Draws `source` of the texture into `dest`, rotated about `origin`.
pub fn draw_texture_pro(
    texture: RawTexture,
    _source: Rectangle,
    dest: Rectangle,
    _origin: Vector2,
    _rotation: f32,
    _tint: Color,
) {
    if texture.id == 0 || dest.width <= 0.0 || dest.height <= 0.0 {
        return;
    }
    count_draw_call();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::context::resource_stats;
    use crate::sys::image::{gen_image_color, get_image_color};

    #[test]
    fn upload_and_read_back() {
        let image = gen_image_color(4, 4, Color::ORANGE);
        let texture = load_texture_from_image(image);
        unload_image(image);
        assert!(is_texture_ready(texture));

        let back = load_image_from_texture(texture);
        assert_eq!(get_image_color(back, 3, 3), Color::ORANGE);
        unload_image(back);

        unload_texture(texture);
        assert!(!is_texture_ready(texture));
    }

    #[test]
    fn partial_update_writes_rectangle() {
        let image = gen_image_color(4, 4, Color::BLACK);
        let texture = load_texture_from_image(image);
        unload_image(image);

        update_texture_rec(texture, Rectangle::new(1.0, 1.0, 2.0, 1.0), &[255; 8]);
        let back = load_image_from_texture(texture);
        assert_eq!(get_image_color(back, 1, 1), Color::WHITE);
        assert_eq!(get_image_color(back, 0, 1), Color::BLACK);
        unload_image(back);
        unload_texture(texture);
    }

    #[test]
    fn render_texture_releases_attachments() {
        let target = load_render_texture(32, 16);
        assert!(is_render_texture_ready(target));
        assert!(is_texture_ready(target.texture));

        unload_render_texture(target);
        assert!(!is_texture_ready(target.texture));
        let stats = resource_stats();
        assert_eq!(stats.live(ResourceKind::RenderTexture), 0);
        assert_eq!(stats.loaded(ResourceKind::Texture), 0);
    }

    #[test]
    fn mipmap_count_follows_size() {
        let image = gen_image_color(64, 16, Color::WHITE);
        let mut texture = load_texture_from_image(image);
        unload_image(image);
        gen_texture_mipmaps(&mut texture);
        assert_eq!(texture.mipmaps, 7);
        unload_texture(texture);
    }

    #[test]
    fn default_texture_survives_unload() {
        let default = get_default_texture();
        unload_texture(default);
        assert!(is_texture_ready(default));
        assert_eq!(resource_stats().stray_releases(), 0);
    }
}
