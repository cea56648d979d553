//! Window and audio device configuration.
//!
//! Both structs are consumed once, when the matching guard is constructed.
//!
//! ```rust,ignore
//! use raywrap::{ConfigFlags, Window, WindowConfig};
//!
//! let window = Window::new(
//!     WindowConfig::default()
//!         .with_size(1280, 720)
//!         .with_title("shapes")
//!         .with_flags(ConfigFlags::VSYNC_HINT | ConfigFlags::MSAA_4X_HINT)
//!         .with_target_fps(60),
//! )?;
//! ```

use crate::sys::ConfigFlags;

// ---------------------------------------------------------------------------
// WindowConfig
// ---------------------------------------------------------------------------

/// Settings applied by [`Window::new`](crate::Window::new).
///
/// | Field        | Default     |
/// |--------------|-------------|
/// | `width`      | `800`       |
/// | `height`     | `450`       |
/// | `title`      | `"raywrap"` |
/// | `flags`      | empty       |
/// | `target_fps` | `0` (none)  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub width: i32,
    pub height: i32,
    pub title: String,
    /// Hints passed to `set_config_flags` before the window opens.
    pub flags: ConfigFlags,
    /// Frame rate cap. `0` leaves the rate uncapped.
    pub target_fps: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            title: "raywrap".into(),
            flags: ConfigFlags::empty(),
            target_fps: 0,
        }
    }
}

impl WindowConfig {
    #[must_use]
    pub fn new(width: i32, height: i32, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Adds to the flags already set.
    #[must_use]
    pub fn with_flags(mut self, flags: ConfigFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[must_use]
    pub fn with_target_fps(mut self, fps: i32) -> Self {
        self.target_fps = fps;
        self
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings applied by [`AudioDevice::with_config`](crate::AudioDevice::with_config).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioConfig {
    /// Frames per period for streams created after the device opens.
    /// `0` keeps the library default.
    pub stream_buffer_frames: u32,
    /// In `[0, 1]`.
    pub master_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            stream_buffer_frames: 0,
            master_volume: 1.0,
        }
    }
}

impl AudioConfig {
    #[must_use]
    pub fn with_stream_buffer_frames(mut self, frames: u32) -> Self {
        self.stream_buffer_frames = frames;
        self
    }

    #[must_use]
    pub fn with_master_volume(mut self, volume: f32) -> Self {
        self.master_volume = volume;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_defaults() {
        let config = WindowConfig::default();
        assert_eq!((config.width, config.height), (800, 450));
        assert_eq!(config.title, "raywrap");
        assert!(config.flags.is_empty());
    }

    #[test]
    fn flags_accumulate() {
        let config = WindowConfig::default()
            .with_flags(ConfigFlags::VSYNC_HINT)
            .with_flags(ConfigFlags::WINDOW_RESIZABLE);
        assert!(config.flags.contains(ConfigFlags::VSYNC_HINT | ConfigFlags::WINDOW_RESIZABLE));
    }
}
