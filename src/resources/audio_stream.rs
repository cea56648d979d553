//! Raw audio streams fed by the caller.

use crate::errors::Result;
use crate::handle::Owned;
use crate::sys::{self, RawAudioStream};

pub type AudioStream = Owned<RawAudioStream>;

impl AudioStream {
    /// Needs an open audio device. `sample_size` is 8, 16 or 32 bits.
    pub fn new(sample_rate: u32, sample_size: u32, channels: u32) -> Result<Self> {
        Self::from_load(
            sys::load_audio_stream(sample_rate, sample_size, channels),
            format!("stream {sample_rate} Hz, {sample_size} bit, {channels} ch"),
        )
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.raw().sample_rate
    }

    #[must_use]
    pub fn sample_size(&self) -> u32 {
        self.raw().sample_size
    }

    #[must_use]
    pub fn channels(&self) -> u32 {
        self.raw().channels
    }

    /// Queues interleaved samples in the stream's sample size.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        sys::update_audio_stream(*self.raw(), data);
        self
    }

    /// True once the queued samples have been consumed.
    #[must_use]
    pub fn is_processed(&self) -> bool {
        sys::is_audio_stream_processed(*self.raw())
    }

    pub fn play(&mut self) -> &mut Self {
        sys::play_audio_stream(*self.raw());
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        sys::stop_audio_stream(*self.raw());
        self
    }

    pub fn pause(&mut self) -> &mut Self {
        sys::pause_audio_stream(*self.raw());
        self
    }

    pub fn resume(&mut self) -> &mut Self {
        sys::resume_audio_stream(*self.raw());
        self
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        sys::is_audio_stream_playing(*self.raw())
    }

    pub fn set_volume(&mut self, volume: f32) -> &mut Self {
        sys::set_audio_stream_volume(*self.raw(), volume);
        self
    }

    pub fn set_pitch(&mut self, pitch: f32) -> &mut Self {
        sys::set_audio_stream_pitch(*self.raw(), pitch);
        self
    }

    pub fn set_pan(&mut self, pan: f32) -> &mut Self {
        sys::set_audio_stream_pan(*self.raw(), pan);
        self
    }
}
