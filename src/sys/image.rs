//! CPU images.
//!
//! Pixel buffers live in the context keyed by `RawImage::data`. Decoding and
//! encoding go through the `image` crate; editing primitives work on
//! [`Color`] rows and write the result back in the image's own format.

use std::io::Cursor;
use std::path::Path;

use image::{imageops, DynamicImage, ImageFormat, RgbaImage};

use crate::math::{Color, Rectangle, Vector4};
use crate::sys::context::{with_core, ResourceKind};
use crate::sys::files::{get_file_extension, load_file_data};
use crate::sys::trace::{trace_info, trace_warn};
use crate::sys::types::{PixelFormat, RawImage};

// ============================================================================
// Pixel conversion
// ============================================================================

pub(crate) fn pixels_to_colors(data: &[u8], format: PixelFormat) -> Vec<Color> {
    match format {
        PixelFormat::UncompressedGrayscale => {
            data.iter().map(|&v| Color::new(v, v, v, 255)).collect()
        }
        PixelFormat::UncompressedGrayAlpha => data
            .chunks_exact(2)
            .map(|p| Color::new(p[0], p[0], p[0], p[1]))
            .collect(),
        PixelFormat::UncompressedR8G8B8 => data
            .chunks_exact(3)
            .map(|p| Color::new(p[0], p[1], p[2], 255))
            .collect(),
        PixelFormat::UncompressedR8G8B8A8 => data
            .chunks_exact(4)
            .map(|p| Color::new(p[0], p[1], p[2], p[3]))
            .collect(),
        PixelFormat::Unknown | PixelFormat::Depth24 => Vec::new(),
    }
}

fn luminance(c: Color) -> u8 {
    (f32::from(c.r) * 0.299 + f32::from(c.g) * 0.587 + f32::from(c.b) * 0.114).round() as u8
}

pub(crate) fn colors_to_pixels(colors: &[Color], format: PixelFormat) -> Vec<u8> {
    match format {
        PixelFormat::UncompressedGrayscale => colors.iter().map(|&c| luminance(c)).collect(),
        PixelFormat::UncompressedGrayAlpha => {
            colors.iter().flat_map(|&c| [luminance(c), c.a]).collect()
        }
        PixelFormat::UncompressedR8G8B8 => colors.iter().flat_map(|c| [c.r, c.g, c.b]).collect(),
        PixelFormat::UncompressedR8G8B8A8 => bytemuck::cast_slice::<Color, u8>(colors).to_vec(),
        PixelFormat::Unknown | PixelFormat::Depth24 => Vec::new(),
    }
}

fn from_dynamic(decoded: DynamicImage) -> (u32, u32, PixelFormat, Vec<u8>) {
    let (width, height) = (decoded.width(), decoded.height());
    match decoded {
        DynamicImage::ImageLuma8(buf) => {
            (width, height, PixelFormat::UncompressedGrayscale, buf.into_raw())
        }
        DynamicImage::ImageLumaA8(buf) => {
            (width, height, PixelFormat::UncompressedGrayAlpha, buf.into_raw())
        }
        DynamicImage::ImageRgb8(buf) => {
            (width, height, PixelFormat::UncompressedR8G8B8, buf.into_raw())
        }
        other => (
            width,
            height,
            PixelFormat::UncompressedR8G8B8A8,
            other.into_rgba8().into_raw(),
        ),
    }
}

fn to_dynamic(image: RawImage, data: Vec<u8>) -> Option<DynamicImage> {
    let (w, h) = (image.width as u32, image.height as u32);
    match image.format {
        PixelFormat::UncompressedGrayscale => {
            image::GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8)
        }
        PixelFormat::UncompressedGrayAlpha => {
            image::GrayAlphaImage::from_raw(w, h, data).map(DynamicImage::ImageLumaA8)
        }
        PixelFormat::UncompressedR8G8B8 => {
            image::RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8)
        }
        PixelFormat::UncompressedR8G8B8A8 => {
            RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8)
        }
        PixelFormat::Unknown | PixelFormat::Depth24 => None,
    }
}

// ============================================================================
// Allocation
// ============================================================================

/// Registers `data` as a new image buffer.
pub(crate) fn alloc_image(width: i32, height: i32, format: PixelFormat, data: Vec<u8>) -> RawImage {
    with_core(|core| {
        let id = core.alloc_id();
        core.image_data.insert(id, data);
        core.track_load(ResourceKind::Image);
        RawImage {
            data: id,
            width,
            height,
            mipmaps: 1,
            format,
        }
    })
}

fn image_data(image: RawImage) -> Option<Vec<u8>> {
    with_core(|core| core.image_data.get(&image.data).cloned())
}

fn image_colors(image: RawImage) -> Option<Vec<Color>> {
    image_data(image).map(|data| pixels_to_colors(&data, image.format))
}

/// Replaces the buffer behind `image` in place, keeping its id.
fn store_image(image: &mut RawImage, width: i32, height: i32, format: PixelFormat, data: Vec<u8>) {
    let stored = with_core(|core| match core.image_data.get_mut(&image.data) {
        Some(slot) => {
            *slot = data;
            true
        }
        None => false,
    });
    if stored {
        image.width = width;
        image.height = height;
        image.format = format;
        image.mipmaps = 1;
    }
}

fn store_colors(image: &mut RawImage, width: i32, height: i32, colors: &[Color]) {
    let format = image.format;
    store_image(image, width, height, format, colors_to_pixels(colors, format));
}

/// Runs `edit` on the image pixels, or warns when the image is not loaded.
fn edit_colors(image: &mut RawImage, name: &str, edit: impl FnOnce(&mut Vec<Color>, i32, i32)) {
    let Some(mut colors) = image_colors(*image) else {
        trace_warn!("IMAGE: {name} called on an image that is not loaded");
        return;
    };
    let (width, height) = (image.width, image.height);
    edit(&mut colors, width, height);
    store_colors(image, width, height, &colors);
}

// ============================================================================
// Loading
// ============================================================================

pub fn load_image(path: impl AsRef<Path>) -> RawImage {
    let path = path.as_ref();
    let Some(data) = load_file_data(path) else {
        return RawImage::default();
    };
    let ext = get_file_extension(path).unwrap_or_default();
    let image = load_image_from_memory(&ext, &data);
    if image.data != 0 {
        trace_info!(
            "IMAGE: Data loaded successfully ({}x{} | {} | {} mipmaps)",
            image.width,
            image.height,
            image.format.name(),
            image.mipmaps
        );
    }
    image
}

/// Decodes an encoded image; `file_type` is an extension such as `".png"`.
pub fn load_image_from_memory(file_type: &str, data: &[u8]) -> RawImage {
    let format = ImageFormat::from_extension(file_type.trim_start_matches('.'));
    let decoded = match format {
        Some(format) => image::load_from_memory_with_format(data, format),
        None => image::load_from_memory(data),
    };

    match decoded {
        Ok(decoded) => {
            let (width, height, format, pixels) = from_dynamic(decoded);
            alloc_image(width as i32, height as i32, format, pixels)
        }
        Err(err) => {
            trace_warn!("IMAGE: Failed to load image data: {err}");
            RawImage::default()
        }
    }
}

#[must_use]
pub fn is_image_ready(image: RawImage) -> bool {
    image.data != 0
        && image.width > 0
        && image.height > 0
        && image.format != PixelFormat::Unknown
        && with_core(|core| core.image_data.contains_key(&image.data))
}

pub fn unload_image(image: RawImage) {
    if image.data == 0 {
        return;
    }
    let known = with_core(|core| {
        let known = core.image_data.remove(&image.data).is_some();
        if known {
            core.track_unload(ResourceKind::Image);
        } else {
            core.track_stray();
        }
        known
    });
    if !known {
        trace_warn!("IMAGE: Unload of unknown image data");
    }
}

/// Encodes the image in the format named by the path's extension.
pub fn export_image(image: RawImage, path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    let ext = get_file_extension(path).unwrap_or_default();
    let Some(encoded) = export_image_to_memory(image, &ext) else {
        trace_warn!("IMAGE: Failed to export image to {}", path.display());
        return false;
    };
    crate::sys::files::save_file_data(path, &encoded)
}

pub fn export_image_to_memory(image: RawImage, file_type: &str) -> Option<Vec<u8>> {
    let format = ImageFormat::from_extension(file_type.trim_start_matches('.'))?;
    let mut encoded = to_dynamic(image, image_data(image)?)?;
    if format == ImageFormat::Jpeg {
        encoded = DynamicImage::ImageRgb8(encoded.into_rgb8());
    }

    let mut out = Cursor::new(Vec::new());
    match encoded.write_to(&mut out, format) {
        Ok(()) => Some(out.into_inner()),
        Err(err) => {
            trace_warn!("IMAGE: Failed to encode image: {err}");
            None
        }
    }
}

// ============================================================================
// Generation
// ============================================================================

fn gen_image(width: i32, height: i32, pixel: impl Fn(i32, i32) -> Color) -> RawImage {
    let (width, height) = (width.max(0), height.max(0));
    let colors: Vec<Color> = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| pixel(x, y))
        .collect();
    let format = PixelFormat::UncompressedR8G8B8A8;
    alloc_image(width, height, format, colors_to_pixels(&colors, format))
}

pub fn gen_image_color(width: i32, height: i32, color: Color) -> RawImage {
    gen_image(width, height, |_, _| color)
}

/// Linear gradient; `direction` in degrees, 0 runs top to bottom.
pub fn gen_image_gradient_linear(width: i32, height: i32, direction: i32, start: Color, end: Color) -> RawImage {
    let angle = ((90 - direction) as f32).to_radians();
    let (sin, cos) = angle.sin_cos();
    let span = width as f32 * cos + height as f32 * sin;
    let (a, b) = (start.normalize(), end.normalize());
    gen_image(width, height, |x, y| {
        let t = if span.abs() < f32::EPSILON {
            0.0
        } else {
            ((x as f32 * cos + y as f32 * sin) / span).clamp(0.0, 1.0)
        };
        Color::from_normalized(a.lerp(b, t))
    })
}

/// Radial gradient from `inner` at the center to `outer` at the edge.
pub fn gen_image_gradient_radial(width: i32, height: i32, density: f32, inner: Color, outer: Color) -> RawImage {
    let radius = width.min(height) as f32 / 2.0;
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let (a, b) = (inner.normalize(), outer.normalize());
    gen_image(width, height, |x, y| {
        let dist = (x as f32 - cx).hypot(y as f32 - cy);
        let factor = ((dist - radius * density) / (radius * (1.0 - density)).max(f32::EPSILON)).clamp(0.0, 1.0);
        Color::from_normalized(a.lerp(b, factor))
    })
}

pub fn gen_image_checked(width: i32, height: i32, checks_x: i32, checks_y: i32, col1: Color, col2: Color) -> RawImage {
    let (cx, cy) = (checks_x.max(1), checks_y.max(1));
    gen_image(width, height, |x, y| {
        if (x / cx + y / cy) % 2 == 0 { col1 } else { col2 }
    })
}

// ============================================================================
// Editing
// ============================================================================

#[must_use]
pub fn image_copy(image: RawImage) -> RawImage {
    match image_data(image) {
        Some(data) => {
            let mut copy = alloc_image(image.width, image.height, image.format, data);
            copy.mipmaps = image.mipmaps;
            copy
        }
        None => RawImage::default(),
    }
}

/// Copy of the part of `image` inside `rec`.
#[must_use]
pub fn image_from_image(image: RawImage, rec: Rectangle) -> RawImage {
    let mut copy = image_copy(image);
    if copy.data != 0 {
        image_crop(&mut copy, rec);
    }
    copy
}

/// Clamps `rec` to the image bounds, as integer pixel coordinates.
fn clamp_rec(image: &RawImage, rec: Rectangle) -> (i32, i32, i32, i32) {
    let x = (rec.x as i32).clamp(0, image.width);
    let y = (rec.y as i32).clamp(0, image.height);
    let w = (rec.width as i32).min(image.width - x).max(0);
    let h = (rec.height as i32).min(image.height - y).max(0);
    (x, y, w, h)
}

pub fn image_crop(image: &mut RawImage, rec: Rectangle) {
    let (x, y, w, h) = clamp_rec(image, rec);
    if w == 0 || h == 0 {
        trace_warn!("IMAGE: Image can not be cropped, crop rectangle out of bounds");
        return;
    }
    let Some(data) = image_data(*image) else {
        return;
    };

    let bpp = image.format.bytes_per_pixel();
    let stride = image.width as usize * bpp;
    let mut cropped = Vec::with_capacity(w as usize * h as usize * bpp);
    for row in y..y + h {
        let start = row as usize * stride + x as usize * bpp;
        cropped.extend_from_slice(&data[start..start + w as usize * bpp]);
    }
    let format = image.format;
    store_image(image, w, h, format, cropped);
}

/// Bilinear resize.
pub fn image_resize(image: &mut RawImage, new_width: i32, new_height: i32) {
    if new_width <= 0 || new_height <= 0 {
        return;
    }
    let Some(colors) = image_colors(*image) else {
        return;
    };
    let Some(src) = RgbaImage::from_raw(
        image.width as u32,
        image.height as u32,
        bytemuck::cast_slice::<Color, u8>(&colors).to_vec(),
    ) else {
        return;
    };
    let resized = imageops::resize(&src, new_width as u32, new_height as u32, imageops::FilterType::Triangle);
    let colors = bytemuck::cast_slice::<u8, Color>(resized.as_raw()).to_vec();
    store_colors(image, new_width, new_height, &colors);
}

/// Nearest-neighbor resize.
pub fn image_resize_nn(image: &mut RawImage, new_width: i32, new_height: i32) {
    if new_width <= 0 || new_height <= 0 {
        return;
    }
    let Some(colors) = image_colors(*image) else {
        return;
    };
    let (w, h) = (image.width, image.height);
    let mut out = Vec::with_capacity(new_width as usize * new_height as usize);
    for y in 0..new_height {
        let sy = (y * h / new_height) as usize;
        for x in 0..new_width {
            let sx = (x * w / new_width) as usize;
            out.push(colors[sy * w as usize + sx]);
        }
    }
    store_colors(image, new_width, new_height, &out);
}

/// Resizes the canvas, placing the old contents at (`offset_x`, `offset_y`).
pub fn image_resize_canvas(image: &mut RawImage, new_width: i32, new_height: i32, offset_x: i32, offset_y: i32, fill: Color) {
    if new_width <= 0 || new_height <= 0 {
        return;
    }
    let Some(colors) = image_colors(*image) else {
        return;
    };
    let (w, h) = (image.width, image.height);
    let mut out = vec![fill; new_width as usize * new_height as usize];
    for y in 0..h {
        for x in 0..w {
            let (dx, dy) = (x + offset_x, y + offset_y);
            if (0..new_width).contains(&dx) && (0..new_height).contains(&dy) {
                out[(dy * new_width + dx) as usize] = colors[(y * w + x) as usize];
            }
        }
    }
    store_colors(image, new_width, new_height, &out);
}

fn transform_dynamic(image: &mut RawImage, name: &str, op: impl FnOnce(DynamicImage) -> DynamicImage) {
    let Some(decoded) = image_data(*image).and_then(|data| to_dynamic(*image, data)) else {
        trace_warn!("IMAGE: {name} called on an image that is not loaded");
        return;
    };
    let (width, height, format, pixels) = from_dynamic(op(decoded));
    store_image(image, width as i32, height as i32, format, pixels);
}

pub fn image_flip_vertical(image: &mut RawImage) {
    transform_dynamic(image, "image_flip_vertical", |img| img.flipv());
}

pub fn image_flip_horizontal(image: &mut RawImage) {
    transform_dynamic(image, "image_flip_horizontal", |img| img.fliph());
}

pub fn image_rotate_cw(image: &mut RawImage) {
    transform_dynamic(image, "image_rotate_cw", |img| img.rotate90());
}

pub fn image_rotate_ccw(image: &mut RawImage) {
    transform_dynamic(image, "image_rotate_ccw", |img| img.rotate270());
}

pub fn image_color_invert(image: &mut RawImage) {
    edit_colors(image, "image_color_invert", |colors, _, _| {
        for c in colors.iter_mut() {
            *c = Color::new(255 - c.r, 255 - c.g, 255 - c.b, c.a);
        }
    });
}

pub fn image_color_tint(image: &mut RawImage, tint: Color) {
    edit_colors(image, "image_color_tint", |colors, _, _| {
        for c in colors.iter_mut() {
            *c = c.tint(tint);
        }
    });
}

/// Converts to the 8-bit grayscale format.
pub fn image_color_grayscale(image: &mut RawImage) {
    image_format(image, PixelFormat::UncompressedGrayscale);
}

pub fn image_format(image: &mut RawImage, new_format: PixelFormat) {
    if new_format == image.format {
        return;
    }
    if matches!(new_format, PixelFormat::Unknown | PixelFormat::Depth24) {
        trace_warn!("IMAGE: Format {} not supported for CPU images", new_format.name());
        return;
    }
    let Some(colors) = image_colors(*image) else {
        return;
    };
    let (width, height) = (image.width, image.height);
    store_image(image, width, height, new_format, colors_to_pixels(&colors, new_format));
}

// ============================================================================
// Drawing on images
// ============================================================================

pub fn image_clear_background(image: &mut RawImage, color: Color) {
    edit_colors(image, "image_clear_background", |colors, _, _| colors.fill(color));
}

pub fn image_draw_pixel(image: &mut RawImage, x: i32, y: i32, color: Color) {
    edit_colors(image, "image_draw_pixel", |colors, w, h| {
        if (0..w).contains(&x) && (0..h).contains(&y) {
            colors[(y * w + x) as usize] = color;
        }
    });
}

pub fn image_draw_rectangle_rec(image: &mut RawImage, rec: Rectangle, color: Color) {
    let (x0, y0, rw, rh) = clamp_rec(image, rec);
    edit_colors(image, "image_draw_rectangle", |colors, w, _| {
        for y in y0..y0 + rh {
            for x in x0..x0 + rw {
                colors[(y * w + x) as usize] = color;
            }
        }
    });
}

/// Blends `src_rec` of `src` into `dst_rec` of `dst`, scaling nearest-neighbor.
pub fn image_draw(dst: &mut RawImage, src: RawImage, src_rec: Rectangle, dst_rec: Rectangle, tint: Color) {
    let Some(src_colors) = image_colors(src) else {
        trace_warn!("IMAGE: image_draw source image is not loaded");
        return;
    };
    let (sx, sy, sw, sh) = clamp_rec(&src, src_rec);
    if sw == 0 || sh == 0 || dst_rec.width <= 0.0 || dst_rec.height <= 0.0 {
        return;
    }
    let (dx0, dy0) = (dst_rec.x as i32, dst_rec.y as i32);
    let (dw, dh) = (dst_rec.width as i32, dst_rec.height as i32);

    edit_colors(dst, "image_draw", |colors, w, h| {
        for y in 0..dh {
            for x in 0..dw {
                let (tx, ty) = (dx0 + x, dy0 + y);
                if !(0..w).contains(&tx) || !(0..h).contains(&ty) {
                    continue;
                }
                let px = sx + x * sw / dw;
                let py = sy + y * sh / dh;
                let s = src_colors[(py * src.width + px) as usize];
                let d = &mut colors[(ty * w + tx) as usize];
                *d = d.alpha_blend(s, tint);
            }
        }
    });
}

// ============================================================================
// Reading
// ============================================================================

#[must_use]
pub fn get_image_color(image: RawImage, x: i32, y: i32) -> Color {
    if !(0..image.width).contains(&x) || !(0..image.height).contains(&y) {
        trace_warn!("IMAGE: Requested pixel ({x}, {y}) out of bounds");
        return Color::BLANK;
    }
    let bpp = image.format.bytes_per_pixel();
    let offset = (y * image.width + x) as usize * bpp;
    with_core(|core| {
        core.image_data
            .get(&image.data)
            .and_then(|data| data.get(offset..offset + bpp))
            .and_then(|px| pixels_to_colors(px, image.format).first().copied())
            .unwrap_or(Color::BLANK)
    })
}

#[must_use]
pub fn load_image_colors(image: RawImage) -> Vec<Color> {
    image_colors(image).unwrap_or_default()
}

/// Raw bytes of the image buffer in its pixel format.
#[must_use]
pub fn get_image_data(image: RawImage) -> Vec<u8> {
    image_data(image).unwrap_or_default()
}

/// Average color, used by tests and thumbnails.
#[must_use]
pub fn get_image_average_color(image: RawImage) -> Color {
    let colors = load_image_colors(image);
    if colors.is_empty() {
        return Color::BLANK;
    }
    let sum = colors
        .iter()
        .fold(Vector4::ZERO, |acc, c| acc + c.normalize());
    Color::from_normalized(sum / colors.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::context::resource_stats;

    #[test]
    fn crop_and_resize_change_dimensions() {
        let mut image = gen_image_checked(64, 64, 8, 8, Color::RED, Color::BLUE);
        image_crop(&mut image, Rectangle::new(8.0, 8.0, 32.0, 16.0));
        assert_eq!((image.width, image.height), (32, 16));
        assert_eq!(get_image_data(image).len(), 32 * 16 * 4);

        image_resize(&mut image, 10, 5);
        assert_eq!((image.width, image.height), (10, 5));
        image_resize_nn(&mut image, 20, 20);
        assert_eq!((image.width, image.height), (20, 20));
        unload_image(image);
    }

    #[test]
    fn checked_pattern_alternates() {
        let image = gen_image_checked(4, 4, 2, 2, Color::WHITE, Color::BLACK);
        assert_eq!(get_image_color(image, 0, 0), Color::WHITE);
        assert_eq!(get_image_color(image, 2, 0), Color::BLACK);
        assert_eq!(get_image_color(image, 2, 2), Color::WHITE);
        unload_image(image);
    }

    #[test]
    fn format_conversion_keeps_pixels() {
        let mut image = gen_image_color(3, 2, Color::new(10, 20, 30, 255));
        image_format(&mut image, PixelFormat::UncompressedR8G8B8);
        assert_eq!(get_image_data(image).len(), 3 * 2 * 3);
        assert_eq!(get_image_color(image, 1, 1), Color::new(10, 20, 30, 255));

        image_color_grayscale(&mut image);
        assert_eq!(image.format, PixelFormat::UncompressedGrayscale);
        assert_eq!(get_image_data(image).len(), 3 * 2);
        unload_image(image);
    }

    #[test]
    fn rotate_swaps_dimensions() {
        let mut image = gen_image_color(8, 2, Color::GREEN);
        image_draw_pixel(&mut image, 0, 0, Color::RED);
        image_rotate_cw(&mut image);
        assert_eq!((image.width, image.height), (2, 8));
        // Top-left moves to top-right.
        assert_eq!(get_image_color(image, 1, 0), Color::RED);
        unload_image(image);
    }

    #[test]
    fn png_round_trip_through_memory() {
        let image = gen_image_gradient_linear(16, 8, 0, Color::BLACK, Color::WHITE);
        let png = export_image_to_memory(image, ".png").expect("encode");
        let decoded = load_image_from_memory(".png", &png);
        assert!(is_image_ready(decoded));
        assert_eq!((decoded.width, decoded.height), (16, 8));
        assert_eq!(load_image_colors(decoded), load_image_colors(image));
        unload_image(image);
        unload_image(decoded);
    }

    #[test]
    fn garbage_data_is_not_ready() {
        let image = load_image_from_memory(".png", b"not a png");
        assert!(!is_image_ready(image));
        assert_eq!(resource_stats().loaded(ResourceKind::Image), 0);
    }
}
