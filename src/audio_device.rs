//! The audio device guard.

use std::marker::PhantomData;

use crate::config::AudioConfig;
use crate::errors::{RaywrapError, Result};
use crate::sys;

/// Owns the library's audio device. Sounds, music and streams need one open
/// to load.
#[derive(Debug)]
pub struct AudioDevice {
    _not_send: PhantomData<*const ()>,
}

impl AudioDevice {
    pub fn new() -> Result<Self> {
        Self::with_config(AudioConfig::default())
    }

    pub fn with_config(config: AudioConfig) -> Result<Self> {
        if sys::is_audio_device_ready() {
            return Err(RaywrapError::AlreadyInitialized("audio device"));
        }
        sys::init_audio_device();
        if config.stream_buffer_frames > 0 {
            sys::set_audio_stream_buffer_size_default(config.stream_buffer_frames);
        }
        sys::set_master_volume(config.master_volume);
        Ok(Self {
            _not_send: PhantomData,
        })
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        sys::is_audio_device_ready()
    }

    #[must_use]
    pub fn master_volume(&self) -> f32 {
        sys::get_master_volume()
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        sys::set_master_volume(volume);
    }

    pub fn close(&mut self) {
        if sys::is_audio_device_ready() {
            sys::close_audio_device();
        }
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.close();
    }
}
