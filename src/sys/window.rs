//! Window, frame loop, render modes and shape drawing.
//!
//! There is no real surface: the window is a record in the context, frames
//! are timed with [`std::time::Instant`] and draw calls are counted.

use std::time::{Duration, Instant};

use crate::camera::{Camera2D, Camera3D};
use crate::math::{BoundingBox, Color, Rectangle, Vector2, Vector3};
use crate::sys::context::with_core;
use crate::sys::trace::{trace_info, trace_warn};
use crate::sys::types::{ConfigFlags, RawRenderTexture, RawShader, DEFAULT_SHADER_ID};

// ============================================================================
// Timing
// ============================================================================

/// Frame timer, ticked by `end_drawing`.
#[derive(Debug, Clone)]
pub(crate) struct FrameTimer {
    start: Instant,
    last_tick: Instant,
    delta: Duration,
    frame_count: u64,
}

impl FrameTimer {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_tick;
        self.last_tick = now;
        self.frame_count += 1;
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Averages the frame rate over one-second windows.
#[derive(Debug, Clone)]
pub(crate) struct FpsCounter {
    frames: u32,
    accumulated: Duration,
    current: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            accumulated: Duration::ZERO,
            current: 0.0,
        }
    }

    fn update(&mut self, delta: Duration) {
        self.frames += 1;
        self.accumulated += delta;

        if self.accumulated.as_secs_f32() >= 1.0 {
            self.current = self.frames as f32 / self.accumulated.as_secs_f32();
            self.accumulated = Duration::ZERO;
            self.frames = 0;
        } else if self.current == 0.0 && !delta.is_zero() {
            // First second: report the instantaneous rate.
            self.current = 1.0 / delta.as_secs_f32();
        }
    }
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone)]
pub(crate) struct WindowState {
    pub width: i32,
    pub height: i32,
    pub title: String,
    pub flags: ConfigFlags,
    pub close_requested: bool,
    pub target_fps: i32,
    timer: FrameTimer,
    fps: FpsCounter,
}

/// A begin/end pair that is currently open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderMode {
    Mode2D(Camera2D),
    Mode3D(Camera3D),
    Texture(u32),
    Shader(u32),
    Scissor(Rectangle),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FrameState {
    pub drawing: bool,
    pub modes: Vec<RenderMode>,
    pub draw_calls: u64,
    pub last_frame_draw_calls: u64,
    pub pending_flags: ConfigFlags,
    pub clear_color: Color,
}

// ============================================================================
// Window
// ============================================================================

/// Hints applied by the next `init_window`.
pub fn set_config_flags(flags: ConfigFlags) {
    with_core(|core| core.frame.pending_flags |= flags);
}

pub fn init_window(width: i32, height: i32, title: &str) {
    let opened = with_core(|core| {
        if core.window.is_some() {
            return false;
        }
        core.window = Some(WindowState {
            width: width.max(1),
            height: height.max(1),
            title: title.to_owned(),
            flags: std::mem::take(&mut core.frame.pending_flags),
            close_requested: false,
            target_fps: 0,
            timer: FrameTimer::new(),
            fps: FpsCounter::new(),
        });
        core.frame = FrameState::default();
        true
    });

    if opened {
        trace_info!("DISPLAY: Headless device initialized successfully");
        trace_info!("    > Screen size:  {width} x {height}");
        trace_info!("    > Title:        {title}");
    } else {
        trace_warn!("WINDOW: Window is already initialized");
    }
}

pub fn close_window() {
    let closed = with_core(|core| {
        core.frame = FrameState::default();
        core.window.take().is_some()
    });
    if closed {
        trace_info!("WINDOW: Window closed successfully");
    }
}

#[must_use]
pub fn is_window_ready() -> bool {
    with_core(|core| core.window.is_some())
}

/// `true` once a close was requested. Without a window there is nothing to
/// keep open, so this also reports `true`.
#[must_use]
pub fn window_should_close() -> bool {
    with_core(|core| core.window.as_ref().is_none_or(|w| w.close_requested))
}

pub fn request_window_close() {
    with_core(|core| {
        if let Some(window) = core.window.as_mut() {
            window.close_requested = true;
        }
    });
}

pub fn set_window_title(title: &str) {
    with_core(|core| {
        if let Some(window) = core.window.as_mut() {
            window.title = title.to_owned();
        }
    });
}

#[must_use]
pub fn get_window_title() -> String {
    with_core(|core| core.window.as_ref().map(|w| w.title.clone()).unwrap_or_default())
}

pub fn set_window_size(width: i32, height: i32) {
    with_core(|core| {
        if let Some(window) = core.window.as_mut() {
            window.width = width.max(1);
            window.height = height.max(1);
        }
    });
}

#[must_use]
pub fn get_screen_width() -> i32 {
    with_core(|core| core.window.as_ref().map_or(0, |w| w.width))
}

#[must_use]
pub fn get_screen_height() -> i32 {
    with_core(|core| core.window.as_ref().map_or(0, |w| w.height))
}

#[must_use]
pub fn is_window_state(flag: ConfigFlags) -> bool {
    with_core(|core| core.window.as_ref().is_some_and(|w| w.flags.contains(flag)))
}

pub fn set_window_state(flags: ConfigFlags) {
    with_core(|core| {
        if let Some(window) = core.window.as_mut() {
            window.flags |= flags;
        }
    });
}

pub fn clear_window_state(flags: ConfigFlags) {
    with_core(|core| {
        if let Some(window) = core.window.as_mut() {
            window.flags.remove(flags);
        }
    });
}

// ============================================================================
// Timing
// ============================================================================

/// Frame rate cap applied by `end_drawing`. 0 or less disables it.
pub fn set_target_fps(fps: i32) {
    with_core(|core| {
        if let Some(window) = core.window.as_mut() {
            window.target_fps = fps.max(0);
        }
    });
    if fps > 0 {
        trace_info!("TIMER: Target time per frame: {:.3} milliseconds", 1000.0 / fps as f32);
    }
}

#[must_use]
pub fn get_fps() -> i32 {
    with_core(|core| core.window.as_ref().map_or(0, |w| w.fps.current.round() as i32))
}

/// Seconds spent on the last frame.
#[must_use]
pub fn get_frame_time() -> f32 {
    with_core(|core| core.window.as_ref().map_or(0.0, |w| w.timer.delta.as_secs_f32()))
}

/// Seconds since `init_window`.
#[must_use]
pub fn get_time() -> f64 {
    with_core(|core| core.window.as_ref().map_or(0.0, |w| w.timer.elapsed().as_secs_f64()))
}

#[must_use]
pub fn get_frame_count() -> u64 {
    with_core(|core| core.window.as_ref().map_or(0, |w| w.timer.frame_count))
}

// ============================================================================
// Frame
// ============================================================================

pub fn begin_drawing() {
    with_core(|core| {
        if core.frame.drawing {
            trace_warn!("RLGL: begin_drawing called twice without end_drawing");
        }
        core.frame.drawing = true;
        core.frame.draw_calls = 0;
    });
}

pub fn end_drawing() {
    let wait = with_core(|core| {
        if !core.frame.modes.is_empty() {
            trace_warn!(
                "RLGL: {} render modes still active at end of frame",
                core.frame.modes.len()
            );
            core.frame.modes.clear();
        }
        core.frame.drawing = false;
        core.frame.last_frame_draw_calls = core.frame.draw_calls;

        let window = core.window.as_mut()?;
        let target = (window.target_fps > 0)
            .then(|| Duration::from_secs_f64(1.0 / f64::from(window.target_fps)));
        let spent = window.timer.last_tick.elapsed();
        target.and_then(|t| t.checked_sub(spent))
    });

    if let Some(wait) = wait {
        std::thread::sleep(wait);
    }

    with_core(|core| {
        if let Some(window) = core.window.as_mut() {
            window.timer.tick();
            let delta = window.timer.delta;
            window.fps.update(delta);
        }
    });
    crate::sys::audio::mix_frame();
}

#[must_use]
pub fn is_drawing() -> bool {
    with_core(|core| core.frame.drawing)
}

pub fn clear_background(color: Color) {
    with_core(|core| {
        core.frame.clear_color = color;
        core.frame.draw_calls += 1;
    });
}

/// Draw calls issued since `begin_drawing`.
#[must_use]
pub fn frame_draw_calls() -> u64 {
    with_core(|core| core.frame.draw_calls)
}

/// Draw calls of the last completed frame.
#[must_use]
pub fn last_frame_draw_calls() -> u64 {
    with_core(|core| core.frame.last_frame_draw_calls)
}

pub(crate) fn count_draw_call() {
    with_core(|core| core.frame.draw_calls += 1);
}

// ============================================================================
// Modes
// ============================================================================

fn push_mode(mode: RenderMode) {
    with_core(|core| core.frame.modes.push(mode));
}

/// Pops the innermost mode if `matches` accepts it.
fn pop_mode(name: &str, matches: impl Fn(&RenderMode) -> bool) {
    let popped = with_core(|core| match core.frame.modes.last() {
        Some(mode) if matches(mode) => {
            core.frame.modes.pop();
            true
        }
        _ => false,
    });
    if !popped {
        trace_warn!("RLGL: end_{name} called without a matching begin_{name}");
    }
}

pub fn begin_mode_2d(camera: Camera2D) {
    push_mode(RenderMode::Mode2D(camera));
}

pub fn end_mode_2d() {
    pop_mode("mode_2d", |m| matches!(m, RenderMode::Mode2D(_)));
}

pub fn begin_mode_3d(camera: Camera3D) {
    push_mode(RenderMode::Mode3D(camera));
}

pub fn end_mode_3d() {
    pop_mode("mode_3d", |m| matches!(m, RenderMode::Mode3D(_)));
}

pub fn begin_texture_mode(target: RawRenderTexture) {
    push_mode(RenderMode::Texture(target.id));
}

pub fn end_texture_mode() {
    pop_mode("texture_mode", |m| matches!(m, RenderMode::Texture(_)));
}

pub fn begin_shader_mode(shader: RawShader) {
    push_mode(RenderMode::Shader(shader.id));
}

pub fn end_shader_mode() {
    pop_mode("shader_mode", |m| matches!(m, RenderMode::Shader(_)));
}

pub fn begin_scissor_mode(x: i32, y: i32, width: i32, height: i32) {
    push_mode(RenderMode::Scissor(Rectangle::new(
        x as f32,
        y as f32,
        width as f32,
        height as f32,
    )));
}

pub fn end_scissor_mode() {
    pop_mode("scissor_mode", |m| matches!(m, RenderMode::Scissor(_)));
}

/// Modes currently open, outermost first.
#[must_use]
pub fn active_modes() -> Vec<RenderMode> {
    with_core(|core| core.frame.modes.clone())
}

/// Framebuffer draws go to; 0 is the screen.
#[must_use]
pub fn active_render_target() -> u32 {
    with_core(|core| {
        core.frame
            .modes
            .iter()
            .rev()
            .find_map(|m| match m {
                RenderMode::Texture(id) => Some(*id),
                _ => None,
            })
            .unwrap_or(0)
    })
}

#[must_use]
pub fn active_shader() -> u32 {
    with_core(|core| {
        core.frame
            .modes
            .iter()
            .rev()
            .find_map(|m| match m {
                RenderMode::Shader(id) => Some(*id),
                _ => None,
            })
            .unwrap_or(DEFAULT_SHADER_ID)
    })
}

// ============================================================================
// Shapes
// ============================================================================

pub fn draw_pixel_v(_position: Vector2, _color: Color) {
    count_draw_call();
}

pub fn draw_line_ex(_start: Vector2, _end: Vector2, _thickness: f32, _color: Color) {
    count_draw_call();
}

pub fn draw_circle_v(_center: Vector2, _radius: f32, _color: Color) {
    count_draw_call();
}

pub fn draw_rectangle_rec(_rec: Rectangle, _color: Color) {
    count_draw_call();
}

pub fn draw_rectangle_lines_ex(_rec: Rectangle, _thickness: f32, _color: Color) {
    count_draw_call();
}

pub fn draw_sphere(_center: Vector3, _radius: f32, _color: Color) {
    count_draw_call();
}

pub fn draw_cube_v(_position: Vector3, _size: Vector3, _color: Color) {
    count_draw_call();
}

pub fn draw_bounding_box(_bbox: BoundingBox, _color: Color) {
    count_draw_call();
}

pub fn draw_grid(_slices: i32, _spacing: f32) {
    count_draw_call();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_lifecycle() {
        assert!(!is_window_ready());
        assert!(window_should_close());

        set_config_flags(ConfigFlags::WINDOW_RESIZABLE);
        init_window(320, 240, "test");
        assert!(is_window_ready());
        assert!(!window_should_close());
        assert!(is_window_state(ConfigFlags::WINDOW_RESIZABLE));
        assert_eq!((get_screen_width(), get_screen_height()), (320, 240));

        request_window_close();
        assert!(window_should_close());

        close_window();
        assert!(!is_window_ready());
    }

    #[test]
    fn draw_calls_are_counted_per_frame() {
        init_window(64, 64, "frames");

        begin_drawing();
        clear_background(Color::RAYWHITE);
        draw_circle_v(Vector2::ZERO, 4.0, Color::RED);
        assert_eq!(frame_draw_calls(), 2);
        end_drawing();
        assert_eq!(last_frame_draw_calls(), 2);
        assert_eq!(get_frame_count(), 1);

        begin_drawing();
        assert_eq!(frame_draw_calls(), 0);
        end_drawing();

        close_window();
    }

    #[test]
    fn modes_nest_and_unwind() {
        begin_shader_mode(RawShader { id: 42, locs: 0 });
        begin_texture_mode(RawRenderTexture {
            id: 7,
            ..Default::default()
        });
        assert_eq!(active_render_target(), 7);
        assert_eq!(active_shader(), 42);

        // Wrong order: the texture mode is innermost.
        end_shader_mode();
        assert_eq!(active_modes().len(), 2);

        end_texture_mode();
        end_shader_mode();
        assert_eq!(active_render_target(), 0);
        assert_eq!(active_shader(), DEFAULT_SHADER_ID);
    }
}
