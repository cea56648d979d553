//! Loading Thread Demo
//!
//! A worker thread prepares file bytes while the main thread keeps drawing a
//! progress bar. Library handles stay on the main thread: the worker only
//! produces plain bytes, and the main thread turns them into a texture once
//! the done flag is set.
//!
//! Run with: `cargo run --example loading_thread`

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use raywrap::prelude::*;

const SIZE: u32 = 256;

fn encode_noise(progress: &AtomicI32) -> anyhow::Result<Vec<u8>> {
    let mut pixels = image::RgbaImage::new(SIZE, SIZE);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let v = ((x * 7 + y * 13) ^ (x * y)) as u8;
            pixels.put_pixel(x, y, image::Rgba([v, v / 2, 255 - v, 255]));
        }
        progress.store((y * 100 / SIZE) as i32, Ordering::Relaxed);
        thread::sleep(Duration::from_millis(2));
    }
    let mut cursor = Cursor::new(Vec::new());
    pixels.write_to(&mut cursor, image::ImageFormat::Png)?;
    progress.store(100, Ordering::Relaxed);
    Ok(cursor.into_inner())
}

fn main() -> anyhow::Result<()> {
    raywrap::init_logging();

    let mut window = Window::new(WindowConfig::new(800, 450, "loading thread").with_target_fps(60))?;

    let done = Arc::new(AtomicBool::new(false));
    let progress = Arc::new(AtomicI32::new(0));
    let worker = {
        let done = Arc::clone(&done);
        let progress = Arc::clone(&progress);
        thread::spawn(move || {
            let result = encode_noise(&progress);
            done.store(true, Ordering::Release);
            result
        })
    };

    while !done.load(Ordering::Acquire) {
        let percent = progress.load(Ordering::Relaxed);
        let mut frame = window.begin_drawing();
        frame
            .clear_background(Color::RAYWHITE)
            .draw_rectangle(Rectangle::new(150.0, 200.0, percent as f32 * 5.0, 60.0), Color::SKYBLUE)
            .draw_rectangle_lines(Rectangle::new(150.0, 200.0, 500.0, 60.0), 5.0, Color::DARKGRAY)
            .draw_text("LOADING DATA...", 240, 210, 40, Color::DARKBLUE);
    }

    let bytes = match worker.join() {
        Ok(result) => result?,
        Err(_) => anyhow::bail!("loading thread panicked"),
    };
    let texture = Texture::from_image(&Image::load_from_memory(".png", &bytes)?)?;
    log::info!("loaded {}x{} texture from the worker", texture.width(), texture.height());

    for _ in 0..60 {
        let mut frame = window.begin_drawing();
        frame.clear_background(Color::RAYWHITE);
        texture.draw(272, 97, Color::WHITE);
        frame.draw_text("DATA LOADED!", 300, 370, 30, Color::GREEN);
    }
    Ok(())
}
