//! Decoded audio samples.

use std::path::Path;

use crate::errors::{RaywrapError, Result};
use crate::handle::Owned;
use crate::sys::{self, RawWave};

/// Samples in CPU memory. Cloning deep-copies them.
pub type Wave = Owned<RawWave>;

impl Wave {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::from_load(sys::load_wave(path), path.display().to_string())
    }

    /// `file_type` is an extension such as `".wav"`.
    pub fn load_from_memory(file_type: &str, data: &[u8]) -> Result<Self> {
        Self::from_load(
            sys::load_wave_from_memory(file_type, data),
            format!("memory ({file_type})"),
        )
    }

    #[must_use]
    pub fn frame_count(&self) -> u32 {
        self.raw().frame_count
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.raw().sample_rate
    }

    /// Bits per sample: 8, 16 or 32 (float).
    #[must_use]
    pub fn sample_size(&self) -> u32 {
        self.raw().sample_size
    }

    #[must_use]
    pub fn channels(&self) -> u32 {
        self.raw().channels
    }

    /// Length in seconds.
    #[must_use]
    pub fn duration(&self) -> f32 {
        if self.sample_rate() == 0 {
            return 0.0;
        }
        self.frame_count() as f32 / self.sample_rate() as f32
    }

    /// Interleaved samples normalized to [-1, 1].
    #[must_use]
    pub fn samples(&self) -> Vec<f32> {
        sys::load_wave_samples(*self.raw())
    }

    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if sys::export_wave(*self.raw(), path) {
            Ok(())
        } else {
            Err(RaywrapError::ExportFailed(path.display().to_string()))
        }
    }

    /// Keeps frames `[init_frame, final_frame)`.
    pub fn crop(&mut self, init_frame: u32, final_frame: u32) -> &mut Self {
        sys::wave_crop(self.raw_mut(), init_frame, final_frame);
        self
    }

    /// Resamples and converts sample size and channel count.
    pub fn format(&mut self, sample_rate: u32, sample_size: u32, channels: u32) -> &mut Self {
        sys::wave_format(self.raw_mut(), sample_rate, sample_size, channels);
        self
    }
}

impl Clone for Wave {
    fn clone(&self) -> Self {
        Self::from_raw(sys::wave_copy(*self.raw()))
    }
}
