//! Asset Table Tests
//!
//! Tests for:
//! - Mounting directories and zip archives under normalized names
//! - Later mounts shadow earlier ones
//! - Extracting archive entries to real paths, never outside the scratch dir
//! - Installing the table as the library's file reader, stacked installs

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use raywrap::assets::AssetSource;
use raywrap::prelude::*;
use raywrap::sys;
use raywrap::{AssetTable, RaywrapError};

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
        .write_to(&mut cursor, image::ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    zip.add_directory("textures/", options).unwrap();
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

// ============================================================================
// Mounting
// ============================================================================

#[test]
fn directory_mount_uses_relative_names() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("textures/ui")).unwrap();
    fs::write(dir.path().join("readme.txt"), "hello").unwrap();
    fs::write(dir.path().join("textures/ui/button.png"), png_bytes(2, 2, [0, 0, 255, 255])).unwrap();

    let mut table = AssetTable::new();
    assert_eq!(table.mount_dir(dir.path()).unwrap(), 2);
    assert_eq!(table.len(), 2);
    assert!(table.contains("readme.txt"));
    assert!(table.contains("textures/ui/button.png"));
    assert!(table.contains("./textures\\ui/button.png"));
    assert_eq!(table.read("readme.txt").unwrap(), b"hello");
}

#[test]
fn archive_mount_skips_directories() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("pack.zip");
    write_zip(
        &archive,
        &[("textures/red.png", &png_bytes(1, 1, [255, 0, 0, 255])), ("config.txt", b"fps=60")],
    );

    let mut table = AssetTable::new();
    assert_eq!(table.mount_archive(&archive).unwrap(), 2);
    assert!(!table.contains("textures/"));
    assert!(matches!(table.resolve("config.txt"), Some(AssetSource::Archive { .. })));
    assert_eq!(table.read("config.txt").unwrap(), b"fps=60");
}

#[test]
fn later_mounts_shadow_earlier_ones() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.txt"), "from disk").unwrap();
    let archive = dir.path().join("patch.zip");
    write_zip(&archive, &[("config.txt", b"from archive")]);

    let mut table = AssetTable::new();
    table.mount_dir(dir.path()).unwrap();
    table.mount_archive(&archive).unwrap();
    assert_eq!(table.read("config.txt").unwrap(), b"from archive");

    table.insert("config.txt", b"from memory".as_slice());
    assert_eq!(table.read("config.txt").unwrap(), b"from memory");
}

#[test]
fn unknown_names_are_reported() {
    let table = AssetTable::new();
    assert!(table.is_empty());
    assert!(matches!(
        table.read("nope.png"),
        Err(RaywrapError::AssetNotFound(name)) if name == "nope.png"
    ));
    assert!(table.extract("nope.png").is_err());
}

#[test]
fn broken_archive_fails_to_mount() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("broken.zip");
    fs::write(&archive, b"PK not really").unwrap();
    assert!(AssetTable::new().mount_archive(&archive).is_err());
}

#[test]
fn archive_entries_leaving_the_root_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("hostile.zip");
    write_zip(&archive, &[("../../escaped.txt", b"outside"), ("inside.txt", b"inside")]);

    let mut table = AssetTable::new();
    assert_eq!(table.mount_archive(&archive).unwrap(), 1);
    assert!(table.contains("inside.txt"));
    assert!(!table.contains("../../escaped.txt"));
    assert!(matches!(
        table.extract("../../escaped.txt"),
        Err(RaywrapError::AssetNotFound(_))
    ));
}

#[test]
fn escaping_names_are_never_extracted() {
    let mut table = AssetTable::new();
    table.insert("../outside.txt", b"data".as_slice());

    assert_eq!(table.read("../outside.txt").unwrap(), b"data");
    assert!(matches!(
        table.extract("../outside.txt"),
        Err(RaywrapError::AssetNotFound(_))
    ));
}

// ============================================================================
// Extraction
// ============================================================================

#[test]
fn extract_writes_archive_entries_once() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("pack.zip");
    write_zip(&archive, &[("textures/red.png", &png_bytes(3, 3, [255, 0, 0, 255]))]);

    let mut table = AssetTable::new();
    table.mount_archive(&archive).unwrap();

    let first = table.extract("textures/red.png").unwrap();
    let second = table.extract("textures/red.png").unwrap();
    assert_eq!(first, second);
    assert!(first.ends_with("textures/red.png"));

    let image = Image::load(&first).unwrap();
    assert_eq!(image.width(), 3);
}

#[test]
fn extract_returns_real_files_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, "a").unwrap();

    let mut table = AssetTable::new();
    table.insert("a.txt", path.as_path());
    assert_eq!(table.extract("a.txt").unwrap(), path);
}

// ============================================================================
// Installing
// ============================================================================

#[test]
fn installed_table_serves_plain_loads() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("pack.zip");
    write_zip(&archive, &[("textures/red.png", &png_bytes(4, 2, [255, 0, 0, 255]))]);

    let mut table = AssetTable::new();
    table.mount_archive(&archive).unwrap();
    let installed = table.install();
    assert_eq!(installed.table().len(), 1);

    let image = Image::load("textures/red.png").unwrap();
    assert_eq!((image.width(), image.height()), (4, 2));
    assert_eq!(image.get_color(0, 0), Color::new(255, 0, 0, 255));

    drop(installed);
    assert!(Image::load("textures/red.png").is_err());
}

#[test]
fn installed_table_falls_back_to_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let on_disk = dir.path().join("blue.png");
    fs::write(&on_disk, png_bytes(1, 1, [0, 0, 255, 255])).unwrap();

    let mut table = AssetTable::new();
    table.insert("memory.png", png_bytes(2, 2, [0, 255, 0, 255]));
    let _installed = table.install();

    assert_eq!(Image::load("memory.png").unwrap().width(), 2);
    assert_eq!(Image::load(&on_disk).unwrap().width(), 1);
    assert_eq!(sys::load_file_data("missing.bin"), None);
}

#[test]
fn stacked_tables_fall_through_to_the_earlier_one() {
    let mut base = AssetTable::new();
    base.insert("base.png", png_bytes(3, 1, [0, 0, 255, 255]));
    base.insert("shared.png", png_bytes(1, 1, [0, 0, 255, 255]));
    let base_guard = base.install();

    let mut patch = AssetTable::new();
    patch.insert("shared.png", png_bytes(2, 2, [255, 0, 0, 255]));
    let patch_guard = patch.install();

    assert_eq!(Image::load("shared.png").unwrap().width(), 2);
    assert_eq!(Image::load("base.png").unwrap().width(), 3);

    drop(patch_guard);
    assert_eq!(Image::load("shared.png").unwrap().width(), 1);
    drop(base_guard);
    assert!(Image::load("base.png").is_err());
}
