//! Image and Texture Tests
//!
//! Tests for:
//! - Load → crop → resize → texture pipeline on a PNG written at test time
//! - Load failure surfaces as `LoadFailed` and leaks nothing
//! - Export and reload through the file system
//! - Texture readback, render textures and scoped modes

use std::path::Path;

use raywrap::prelude::*;
use raywrap::sys::{self, RenderMode};
use raywrap::{RaywrapError, ResourceKind};

fn write_png(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
    image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
        .save(path)
        .unwrap();
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn crop_resize_then_upload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sprite.png");
    write_png(&path, 64, 32, [255, 0, 0, 255]);

    let mut image = Image::load(&path).unwrap();
    assert_eq!((image.width(), image.height()), (64, 32));
    assert_eq!(image.format(), PixelFormat::UncompressedR8G8B8A8);

    image.crop(Rectangle::new(8.0, 8.0, 32.0, 16.0)).resize(16, 8);
    assert_eq!((image.width(), image.height()), (16, 8));
    assert_eq!(image.get_color(4, 4), Color::new(255, 0, 0, 255));

    let texture = Texture::from_image(&image).unwrap();
    drop(image);
    assert_eq!((texture.width(), texture.height()), (16, 8));
    assert_eq!(sys::resource_stats().live(ResourceKind::Image), 0);
    assert_eq!(sys::resource_stats().live(ResourceKind::Texture), 1);

    drop(texture);
    let stats = sys::resource_stats();
    assert_eq!(stats.live(ResourceKind::Texture), 0);
    assert_eq!(stats.stray_releases(), 0);
}

#[test]
fn editing_chain_keeps_one_allocation() {
    let mut image = Image::gen_checked(32, 32, 4, 4, Color::BLACK, Color::WHITE).unwrap();
    image
        .flip_horizontal()
        .flip_vertical()
        .rotate_ccw()
        .color_invert()
        .resize_nn(8, 8)
        .set_format(PixelFormat::UncompressedR8G8B8);

    assert_eq!(image.format(), PixelFormat::UncompressedR8G8B8);
    assert_eq!(image.data().len(), 8 * 8 * 3);
    assert_eq!(sys::resource_stats().live(ResourceKind::Image), 1);
}

#[test]
fn sub_image_is_a_separate_resource() {
    let mut atlas = Image::gen_color(16, 16, Color::GREEN).unwrap();
    atlas.draw_rectangle(Rectangle::new(0.0, 0.0, 8.0, 8.0), Color::RED);

    let corner = atlas.from_image(Rectangle::new(0.0, 0.0, 8.0, 8.0)).unwrap();
    assert_eq!(corner.get_color(0, 0), Color::RED);
    drop(atlas);
    assert!(corner.is_ready());
    assert_eq!(sys::resource_stats().live(ResourceKind::Image), 1);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn missing_file_is_a_load_error() {
    let result = Image::load("notfound.png");
    match result {
        Err(RaywrapError::LoadFailed { kind, origin }) => {
            assert_eq!(kind, ResourceKind::Image);
            assert_eq!(origin, "notfound.png");
        }
        other => panic!("expected LoadFailed, got {other:?}"),
    }

    let err = Texture::load("notfound.png").unwrap_err();
    assert_eq!(err.to_string(), "Failed to load Texture from notfound.png");

    let stats = sys::resource_stats();
    assert_eq!(stats.live(ResourceKind::Image), 0);
    assert_eq!(stats.live(ResourceKind::Texture), 0);
    assert_eq!(stats.stray_releases(), 0);
}

#[test]
fn garbage_bytes_are_a_load_error() {
    assert!(Image::load_from_memory(".png", b"not a png").is_err());
    assert_eq!(sys::resource_stats().loaded(ResourceKind::Image), 0);
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn export_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");

    let image = Image::gen_color(5, 3, Color::ORANGE).unwrap();
    image.export(&path).unwrap();

    let back = Image::load(&path).unwrap();
    assert_eq!((back.width(), back.height()), (5, 3));
    assert_eq!(back.get_color(2, 1), Color::ORANGE);
}

#[test]
fn export_to_unknown_extension_fails() {
    let image = Image::gen_color(2, 2, Color::WHITE).unwrap();
    assert!(matches!(
        image.export("out.unknown"),
        Err(RaywrapError::ExportFailed(_))
    ));
}

// ============================================================================
// Textures
// ============================================================================

#[test]
fn texture_reads_back_to_image() {
    let image = Image::gen_color(3, 3, Color::PURPLE).unwrap();
    let texture = Texture::from_image(&image).unwrap();
    let back = texture.to_image().unwrap();
    assert_eq!(back.get_color(1, 1), Color::PURPLE);
}

#[test]
fn render_texture_mode_is_scoped() {
    let mut target = RenderTexture::new(64, 32).unwrap();
    let id = target.raw().id;
    {
        let _mode = target.begin();
        assert_eq!(sys::active_render_target(), id);
        assert!(matches!(sys::active_modes().last(), Some(RenderMode::Texture(_))));
    }
    assert!(sys::active_modes().is_empty());
    assert_eq!(target.texture().width(), 64);

    drop(target);
    assert_eq!(sys::resource_stats().live(ResourceKind::RenderTexture), 0);
    assert_eq!(sys::resource_stats().stray_releases(), 0);
}
