//! The window guard and per-frame drawing scope.

use std::marker::PhantomData;

use crate::config::WindowConfig;
use crate::errors::{RaywrapError, Result};
use crate::math::{BoundingBox, Color, Rectangle, Vector2, Vector3};
use crate::sys;

/// Owns the library's single window and its graphics context.
///
/// Construction fails while a window is already open. Dropping closes the
/// window unless it was already closed behind the guard's back.
#[derive(Debug)]
pub struct Window {
    _not_send: PhantomData<*const ()>,
}

impl Window {
    pub fn new(config: WindowConfig) -> Result<Self> {
        if sys::is_window_ready() {
            return Err(RaywrapError::AlreadyInitialized("window"));
        }
        if !config.flags.is_empty() {
            sys::set_config_flags(config.flags);
        }
        sys::init_window(config.width, config.height, &config.title);
        if config.target_fps > 0 {
            sys::set_target_fps(config.target_fps);
        }
        log::debug!("window opened ({}x{})", config.width, config.height);
        Ok(Self {
            _not_send: PhantomData,
        })
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        sys::is_window_ready()
    }

    #[must_use]
    pub fn should_close(&self) -> bool {
        sys::window_should_close()
    }

    pub fn request_close(&mut self) {
        sys::request_window_close();
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        sys::get_screen_width()
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        sys::get_screen_height()
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        sys::set_window_size(width, height);
    }

    #[must_use]
    pub fn title(&self) -> String {
        sys::get_window_title()
    }

    pub fn set_title(&mut self, title: &str) {
        sys::set_window_title(title);
    }

    pub fn set_target_fps(&mut self, fps: i32) {
        sys::set_target_fps(fps);
    }

    #[must_use]
    pub fn fps(&self) -> i32 {
        sys::get_fps()
    }

    /// Seconds spent on the last frame.
    #[must_use]
    pub fn frame_time(&self) -> f32 {
        sys::get_frame_time()
    }

    /// Seconds since the window opened.
    #[must_use]
    pub fn time(&self) -> f64 {
        sys::get_time()
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        sys::get_frame_count()
    }

    /// Starts a frame. The frame is presented when the guard is dropped.
    #[must_use = "the frame ends when the guard is dropped"]
    pub fn begin_drawing(&mut self) -> DrawFrame<'_> {
        sys::begin_drawing();
        DrawFrame {
            _window: PhantomData,
        }
    }

    /// Closes the window now. Later calls and the drop do nothing.
    pub fn close(&mut self) {
        if sys::is_window_ready() {
            sys::close_window();
        }
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.close();
    }
}

/// One frame between `begin_drawing` and `end_drawing`.
#[derive(Debug)]
pub struct DrawFrame<'w> {
    _window: PhantomData<&'w mut Window>,
}

impl DrawFrame<'_> {
    pub fn clear_background(&mut self, color: Color) -> &mut Self {
        sys::clear_background(color);
        self
    }

    /// Draws with the default font.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, font_size: i32, color: Color) -> &mut Self {
        sys::draw_text(text, x, y, font_size, color);
        self
    }

    pub fn draw_fps(&mut self, x: i32, y: i32) -> &mut Self {
        sys::draw_fps(x, y);
        self
    }

    pub fn draw_pixel(&mut self, position: Vector2, color: Color) -> &mut Self {
        sys::draw_pixel_v(position, color);
        self
    }

    pub fn draw_line(&mut self, start: Vector2, end: Vector2, thickness: f32, color: Color) -> &mut Self {
        sys::draw_line_ex(start, end, thickness, color);
        self
    }

    pub fn draw_circle(&mut self, center: Vector2, radius: f32, color: Color) -> &mut Self {
        sys::draw_circle_v(center, radius, color);
        self
    }

    pub fn draw_rectangle(&mut self, rec: Rectangle, color: Color) -> &mut Self {
        sys::draw_rectangle_rec(rec, color);
        self
    }

    pub fn draw_rectangle_lines(&mut self, rec: Rectangle, thickness: f32, color: Color) -> &mut Self {
        sys::draw_rectangle_lines_ex(rec, thickness, color);
        self
    }

    pub fn draw_sphere(&mut self, center: Vector3, radius: f32, color: Color) -> &mut Self {
        sys::draw_sphere(center, radius, color);
        self
    }

    pub fn draw_cube(&mut self, position: Vector3, size: Vector3, color: Color) -> &mut Self {
        sys::draw_cube_v(position, size, color);
        self
    }

    pub fn draw_bounding_box(&mut self, bbox: BoundingBox, color: Color) -> &mut Self {
        sys::draw_bounding_box(bbox, color);
        self
    }

    pub fn draw_grid(&mut self, slices: i32, spacing: f32) -> &mut Self {
        sys::draw_grid(slices, spacing);
        self
    }

    /// Draw calls issued so far this frame.
    #[must_use]
    pub fn draw_calls(&self) -> u64 {
        sys::frame_draw_calls()
    }
}

impl Drop for DrawFrame<'_> {
    fn drop(&mut self) {
        sys::end_drawing();
    }
}
