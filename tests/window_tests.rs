//! Window and Frame Tests
//!
//! Tests for:
//! - Window singleton guard and configuration
//! - DrawFrame ends the frame on drop
//! - Camera and shader modes end with their guards
//! - Text drawing and measuring with the default font

use raywrap::prelude::*;
use raywrap::sys::{self, RenderMode};
use raywrap::{DrawFrame, RaywrapError};

fn small_window() -> Window {
    Window::new(WindowConfig::new(320, 240, "tests")).unwrap()
}

// ============================================================================
// Window
// ============================================================================

#[test]
fn window_is_a_singleton() {
    let window = small_window();
    assert!(window.is_ready());
    assert!(matches!(
        Window::new(WindowConfig::default()),
        Err(RaywrapError::AlreadyInitialized(_))
    ));

    drop(window);
    assert!(!sys::is_window_ready());
    assert!(Window::new(WindowConfig::default()).is_ok());
}

#[test]
fn window_applies_config() {
    let config = WindowConfig::default()
        .with_size(640, 360)
        .with_title("configured")
        .with_flags(ConfigFlags::WINDOW_RESIZABLE)
        .with_flags(ConfigFlags::VSYNC_HINT);
    let mut window = Window::new(config).unwrap();

    assert_eq!((window.width(), window.height()), (640, 360));
    assert_eq!(window.title(), "configured");
    assert!(sys::is_window_state(ConfigFlags::WINDOW_RESIZABLE));
    assert!(sys::is_window_state(ConfigFlags::VSYNC_HINT));

    window.set_size(100, 50);
    window.set_title("renamed");
    assert_eq!((window.width(), window.height()), (100, 50));
    assert_eq!(window.title(), "renamed");
}

#[test]
fn close_request_is_reported() {
    let mut window = small_window();
    assert!(!window.should_close());
    window.request_close();
    assert!(window.should_close());
}

#[test]
fn window_closed_early_is_not_closed_twice() {
    let mut window = small_window();
    window.close();
    assert!(!window.is_ready());
    drop(window);
    assert!(!sys::is_window_ready());
}

// ============================================================================
// Frames
// ============================================================================

#[test]
fn frame_ends_when_the_guard_drops() {
    let mut window = small_window();
    {
        let mut frame = window.begin_drawing();
        assert!(sys::is_drawing());
        frame
            .clear_background(Color::RAYWHITE)
            .draw_rectangle(Rectangle::new(0.0, 0.0, 10.0, 10.0), Color::RED)
            .draw_circle(Vector2::new(5.0, 5.0), 3.0, Color::BLUE);
        assert_eq!(frame.draw_calls(), 3);
    }
    assert!(!sys::is_drawing());
    assert_eq!(sys::last_frame_draw_calls(), 3);
    assert_eq!(window.frame_count(), 1);
}

#[test]
fn frames_count_up() {
    let mut window = small_window();
    for _ in 0..3 {
        let _frame: DrawFrame<'_> = window.begin_drawing();
    }
    assert_eq!(window.frame_count(), 3);
    assert!(window.time() >= 0.0);
}

// ============================================================================
// Modes
// ============================================================================

#[test]
fn camera_modes_nest_and_unwind() {
    let mut window = small_window();
    let camera_2d = Camera2D::default();
    let camera_3d = Camera3D::default();

    let mut frame = window.begin_drawing();
    {
        let _world = camera_3d.begin();
        frame.draw_grid(10, 1.0).draw_cube(Vector3::ZERO, Vector3::ONE, Color::RED);
        {
            let _overlay = camera_2d.begin();
            let modes = sys::active_modes();
            assert_eq!(modes.len(), 2);
            assert!(matches!(modes[0], RenderMode::Mode3D(_)));
            assert!(matches!(modes[1], RenderMode::Mode2D(_)));
        }
        assert_eq!(sys::active_modes().len(), 1);
    }
    assert!(sys::active_modes().is_empty());
}

#[test]
fn shader_mode_selects_the_shader() {
    let shader = Shader::load_from_memory(None, Some("#version 330\nvoid main() {}\n")).unwrap();
    let default_id = Shader::default_shader().raw().id;
    {
        let _mode = shader.begin();
        assert_eq!(sys::active_shader(), shader.id());
    }
    assert_eq!(sys::active_shader(), default_id);
}

// ============================================================================
// Text
// ============================================================================

#[test]
fn default_font_measures_and_draws() {
    let mut window = small_window();
    let font = Font::default_font();
    assert_eq!(font.glyph_count(), 95);

    let short = font.measure_text("Hi", 10.0, 1.0);
    let long = font.measure_text("Hi there", 10.0, 1.0);
    assert!(long.x > short.x);
    assert_eq!(short.y, 10.0);

    let mut frame = window.begin_drawing();
    frame.draw_text("hello", 10, 10, 20, Color::BLACK).draw_text("", 10, 40, 20, Color::BLACK);
    font.draw_text("again", Vector2::new(10.0, 70.0), 20.0, 2.0, Color::DARKGRAY);
    assert_eq!(frame.draw_calls(), 2);
}
