//! Image Pipeline Demo
//!
//! Generates an image, edits it on the CPU, uploads it and draws it for a
//! few frames. Every handle is released by its owner on the way out.
//!
//! Run with: `cargo run --example image_pipeline`

use raywrap::prelude::*;
use raywrap::{sys, ResourceKind};

const FRAMES: u32 = 120;

fn main() -> anyhow::Result<()> {
    raywrap::init_logging();

    let mut window = Window::new(WindowConfig::new(800, 450, "image pipeline").with_target_fps(60))?;

    let mut image = Image::gen_checked(256, 256, 32, 32, Color::SKYBLUE, Color::DARKBLUE)?;
    image
        .crop(Rectangle::new(0.0, 0.0, 192.0, 128.0))
        .resize(384, 256)
        .flip_vertical()
        .draw_rectangle(Rectangle::new(16.0, 16.0, 64.0, 64.0), Color::GOLD);

    let mut thumbnail = image.clone();
    thumbnail.resize_nn(96, 64).color_grayscale();

    let texture = Texture::from_image(&image)?;
    let thumbnail_texture = Texture::from_image(&thumbnail)?;
    // CPU copies are no longer needed once uploaded.
    drop(image);
    drop(thumbnail);

    for _ in 0..FRAMES {
        if window.should_close() {
            break;
        }
        let mut frame = window.begin_drawing();
        frame.clear_background(Color::RAYWHITE);
        texture.draw(208, 97, Color::WHITE);
        thumbnail_texture.draw(16, 16, Color::WHITE);
        frame
            .draw_text("checked, cropped, resized", 208, 370, 20, Color::DARKGRAY)
            .draw_fps(700, 10);
    }

    let stats = sys::resource_stats();
    log::info!(
        "textures live: {}, images live: {}",
        stats.live(ResourceKind::Texture),
        stats.live(ResourceKind::Image)
    );
    Ok(())
}
