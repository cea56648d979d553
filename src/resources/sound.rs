//! Sounds: a wave fully loaded into an audio buffer.

use std::path::Path;

use crate::errors::Result;
use crate::handle::Owned;
use crate::resources::wave::Wave;
use crate::sys::{self, RawSound};

/// Needs an open audio device to load.
pub type Sound = Owned<RawSound>;

impl Sound {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::from_load(sys::load_sound(path), path.display().to_string())
    }

    /// Copies the samples of `wave`; the wave stays usable.
    pub fn from_wave(wave: &Wave) -> Result<Self> {
        Self::from_load(sys::load_sound_from_wave(*wave.raw()), "wave")
    }

    #[must_use]
    pub fn frame_count(&self) -> u32 {
        self.raw().frame_count
    }

    pub fn play(&mut self) -> &mut Self {
        sys::play_sound(*self.raw());
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        sys::stop_sound(*self.raw());
        self
    }

    pub fn pause(&mut self) -> &mut Self {
        sys::pause_sound(*self.raw());
        self
    }

    pub fn resume(&mut self) -> &mut Self {
        sys::resume_sound(*self.raw());
        self
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        sys::is_sound_playing(*self.raw())
    }

    pub fn set_volume(&mut self, volume: f32) -> &mut Self {
        sys::set_sound_volume(*self.raw(), volume);
        self
    }

    pub fn set_pitch(&mut self, pitch: f32) -> &mut Self {
        sys::set_sound_pitch(*self.raw(), pitch);
        self
    }

    /// 0 is left, 0.5 center, 1 right.
    pub fn set_pan(&mut self, pan: f32) -> &mut Self {
        sys::set_sound_pan(*self.raw(), pan);
        self
    }
}
