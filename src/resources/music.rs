//! Streamed music.

use std::path::Path;

use crate::errors::Result;
use crate::handle::Owned;
use crate::sys::{self, RawMusic};

/// A track decoded while it plays. Call [`Music::update`] once per frame.
pub type Music = Owned<RawMusic>;

impl Music {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::from_load(sys::load_music_stream(path), path.display().to_string())
    }

    pub fn load_from_memory(file_type: &str, data: &[u8]) -> Result<Self> {
        Self::from_load(
            sys::load_music_stream_from_memory(file_type, data),
            format!("memory ({file_type})"),
        )
    }

    #[must_use]
    pub fn frame_count(&self) -> u32 {
        self.raw().frame_count
    }

    #[must_use]
    pub fn looping(&self) -> bool {
        self.raw().looping
    }

    pub fn set_looping(&mut self, looping: bool) -> &mut Self {
        self.raw_mut().looping = looping;
        self
    }

    pub fn play(&mut self) -> &mut Self {
        sys::play_music_stream(*self.raw());
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        sys::stop_music_stream(*self.raw());
        self
    }

    pub fn pause(&mut self) -> &mut Self {
        sys::pause_music_stream(*self.raw());
        self
    }

    pub fn resume(&mut self) -> &mut Self {
        sys::resume_music_stream(*self.raw());
        self
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        sys::is_music_stream_playing(*self.raw())
    }

    /// Feeds the next period of samples.
    pub fn update(&mut self) -> &mut Self {
        sys::update_music_stream(*self.raw());
        self
    }

    /// Moves the play head to `position` seconds.
    pub fn seek(&mut self, position: f32) -> &mut Self {
        sys::seek_music_stream(*self.raw(), position);
        self
    }

    #[must_use]
    pub fn time_length(&self) -> f32 {
        sys::get_music_time_length(*self.raw())
    }

    #[must_use]
    pub fn time_played(&self) -> f32 {
        sys::get_music_time_played(*self.raw())
    }

    pub fn set_volume(&mut self, volume: f32) -> &mut Self {
        sys::set_music_volume(*self.raw(), volume);
        self
    }

    pub fn set_pitch(&mut self, pitch: f32) -> &mut Self {
        sys::set_music_pitch(*self.raw(), pitch);
        self
    }

    pub fn set_pan(&mut self, pan: f32) -> &mut Self {
        sys::set_music_pan(*self.raw(), pan);
        self
    }
}
