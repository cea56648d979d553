//! Audio device, waves, sounds, music streams and raw streams.
//!
//! Samples are decoded and encoded for real with `hound`; playback is a
//! virtual mixer. Every frame (`end_drawing`) the mixer advances playing
//! sounds and drains raw streams by one period of
//! `audio_buffer_frames`. Music advances in [`update_music_stream`], which
//! callers run once per frame.

use std::io::Cursor;
use std::path::Path;

use crate::sys::context::{with_core, AudioBuffer, AudioDeviceState, Core, ResourceKind};
use crate::sys::files::{get_file_extension, load_file_data, save_file_data};
use crate::sys::trace::{trace_info, trace_warn};
use crate::sys::types::{RawAudioStream, RawMusic, RawSound, RawWave};

// ============================================================================
// Device
// ============================================================================

pub fn init_audio_device() {
    let initialized = with_core(|core| {
        if core.audio.is_some() {
            return false;
        }
        core.audio = Some(AudioDeviceState { master_volume: 1.0 });
        true
    });
    if initialized {
        trace_info!("AUDIO: Device initialized successfully");
    } else {
        trace_warn!("AUDIO: Device has already been initialized");
    }
}

pub fn close_audio_device() {
    if with_core(|core| core.audio.take()).is_some() {
        trace_info!("AUDIO: Device closed successfully");
    } else {
        trace_warn!("AUDIO: Device could not be closed, not currently initialized");
    }
}

#[must_use]
pub fn is_audio_device_ready() -> bool {
    with_core(|core| core.audio.is_some())
}

pub fn set_master_volume(volume: f32) {
    with_core(|core| {
        if let Some(audio) = core.audio.as_mut() {
            audio.master_volume = volume.clamp(0.0, 1.0);
        }
    });
}

/// 0 while no device is open.
#[must_use]
pub fn get_master_volume() -> f32 {
    with_core(|core| core.audio.as_ref().map_or(0.0, |a| a.master_volume))
}

/// Period size, in frames, of streams created from now on.
pub fn set_audio_stream_buffer_size_default(frames: u32) {
    with_core(|core| core.audio_buffer_frames = frames.max(1));
}

/// One mixer period: playing sounds advance, raw streams are drained.
pub(crate) fn mix_frame() {
    with_core(|core| {
        if core.audio.is_none() {
            return;
        }
        let period = core.audio_buffer_frames;
        let music_buffers = &core.music_buffers;
        for (id, buffer) in &mut core.audio_buffers {
            if !buffer.playing || buffer.paused || music_buffers.contains(id) {
                continue;
            }
            buffer.processed = true;
            let frames = buffer.frame_count();
            if frames == 0 {
                continue;
            }
            let advance = (period as f32 * buffer.pitch).max(1.0) as u32;
            buffer.frame_cursor += advance;
            if buffer.frame_cursor >= frames {
                if buffer.looping {
                    buffer.frame_cursor %= frames;
                } else {
                    buffer.frame_cursor = 0;
                    buffer.playing = false;
                }
            }
        }
    });
}

// ============================================================================
// Sample conversion
// ============================================================================

/// Interleaved samples normalized to [-1, 1]. 8 bit samples are unsigned,
/// 16 bit signed, 32 bit float.
pub(crate) fn samples_to_f32(bytes: &[u8], sample_size: u32) -> Vec<f32> {
    match sample_size {
        8 => bytes.iter().map(|&b| (f32::from(b) - 128.0) / 128.0).collect(),
        16 => bytes
            .chunks_exact(2)
            .map(|s| f32::from(i16::from_le_bytes([s[0], s[1]])) / 32768.0)
            .collect(),
        32 => bytes
            .chunks_exact(4)
            .map(|s| f32::from_le_bytes([s[0], s[1], s[2], s[3]]))
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn f32_to_samples(samples: &[f32], sample_size: u32) -> Vec<u8> {
    match sample_size {
        8 => samples
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * 127.0 + 128.0).round() as u8)
            .collect(),
        16 => samples
            .iter()
            .flat_map(|&s| ((s.clamp(-1.0, 1.0) * 32767.0).round() as i16).to_le_bytes())
            .collect(),
        32 => samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Waves
// ============================================================================

fn alloc_wave(sample_rate: u32, sample_size: u32, channels: u32, data: Vec<u8>) -> RawWave {
    let frame_count = (data.len() / (sample_size as usize / 8 * channels as usize).max(1)) as u32;
    with_core(|core| {
        let id = core.alloc_id();
        core.wave_data.insert(id, data);
        core.track_load(ResourceKind::Wave);
        RawWave {
            frame_count,
            sample_rate,
            sample_size,
            channels,
            data: id,
        }
    })
}

fn decode_wav(data: &[u8]) -> Option<(u32, u32, u32, Vec<u8>)> {
    let mut reader = match hound::WavReader::new(Cursor::new(data)) {
        Ok(reader) => reader,
        Err(err) => {
            trace_warn!("WAVE: Failed to decode WAV data: {err}");
            return None;
        }
    };
    let spec = reader.spec();
    let channels = u32::from(spec.channels);

    let (sample_size, bytes) = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 8) => {
            let samples: Result<Vec<i8>, _> = reader.samples::<i8>().collect();
            (8, samples.ok()?.into_iter().map(|s| (i16::from(s) + 128) as u8).collect())
        }
        (hound::SampleFormat::Int, 16) => {
            let samples: Result<Vec<i16>, _> = reader.samples::<i16>().collect();
            (16, samples.ok()?.into_iter().flat_map(i16::to_le_bytes).collect())
        }
        (hound::SampleFormat::Int, bits) => {
            let scale = (1i64 << (bits - 1)) as f32;
            let samples: Result<Vec<i32>, _> = reader.samples::<i32>().collect();
            let floats: Vec<f32> = samples.ok()?.into_iter().map(|s| s as f32 / scale).collect();
            (32, f32_to_samples(&floats, 32))
        }
        (hound::SampleFormat::Float, _) => {
            let samples: Result<Vec<f32>, _> = reader.samples::<f32>().collect();
            (32, f32_to_samples(&samples.ok()?, 32))
        }
    };
    Some((spec.sample_rate, sample_size, channels, bytes))
}

/// Decodes a wave from memory. Only `.wav` is understood.
pub fn load_wave_from_memory(file_type: &str, data: &[u8]) -> RawWave {
    if !file_type.eq_ignore_ascii_case(".wav") {
        trace_warn!("WAVE: Data format not supported ({file_type})");
        return RawWave::default();
    }
    let Some((sample_rate, sample_size, channels, bytes)) = decode_wav(data) else {
        return RawWave::default();
    };
    if bytes.is_empty() || channels == 0 {
        trace_warn!("WAVE: Data contains no samples");
        return RawWave::default();
    }
    let wave = alloc_wave(sample_rate, sample_size, channels, bytes);
    trace_info!(
        "WAVE: Data loaded successfully ({} Hz, {} bit, {})",
        wave.sample_rate,
        wave.sample_size,
        if wave.channels == 1 { "Mono" } else { "Stereo" }
    );
    wave
}

pub fn load_wave(path: impl AsRef<Path>) -> RawWave {
    let path = path.as_ref();
    let Some(data) = load_file_data(path) else {
        return RawWave::default();
    };
    load_wave_from_memory(&get_file_extension(path).unwrap_or_default(), &data)
}

#[must_use]
pub fn is_wave_ready(wave: RawWave) -> bool {
    wave.data != 0
        && wave.frame_count > 0
        && wave.sample_rate > 0
        && wave.channels > 0
        && matches!(wave.sample_size, 8 | 16 | 32)
        && with_core(|core| core.wave_data.contains_key(&wave.data))
}

pub fn unload_wave(wave: RawWave) {
    if wave.data == 0 {
        return;
    }
    let known = with_core(|core| {
        let known = core.wave_data.remove(&wave.data).is_some();
        if known {
            core.track_unload(ResourceKind::Wave);
        } else {
            core.track_stray();
        }
        known
    });
    if known {
        trace_info!("WAVE: Unloaded wave data from RAM");
    } else {
        trace_warn!("WAVE: Unload of unknown wave data");
    }
}

/// Interleaved samples as floats.
#[must_use]
pub fn load_wave_samples(wave: RawWave) -> Vec<f32> {
    with_core(|core| {
        core.wave_data
            .get(&wave.data)
            .map(|bytes| samples_to_f32(bytes, wave.sample_size))
            .unwrap_or_default()
    })
}

fn wave_bytes(wave: RawWave) -> Option<Vec<u8>> {
    with_core(|core| core.wave_data.get(&wave.data).cloned())
}

/// Encodes the wave as a `.wav` file.
pub fn export_wave(wave: RawWave, path: impl AsRef<Path>) -> bool {
    let Some(bytes) = wave_bytes(wave) else {
        return false;
    };
    let spec = hound::WavSpec {
        channels: wave.channels as u16,
        sample_rate: wave.sample_rate,
        bits_per_sample: wave.sample_size as u16,
        sample_format: if wave.sample_size == 32 {
            hound::SampleFormat::Float
        } else {
            hound::SampleFormat::Int
        },
    };

    let mut out = Cursor::new(Vec::new());
    let written = (|| -> Result<(), hound::Error> {
        let mut writer = hound::WavWriter::new(&mut out, spec)?;
        match wave.sample_size {
            8 => {
                for &b in &bytes {
                    writer.write_sample((i16::from(b) - 128) as i8)?;
                }
            }
            16 => {
                for s in bytes.chunks_exact(2) {
                    writer.write_sample(i16::from_le_bytes([s[0], s[1]]))?;
                }
            }
            _ => {
                for s in samples_to_f32(&bytes, 32) {
                    writer.write_sample(s)?;
                }
            }
        }
        writer.finalize()
    })();

    if let Err(err) = written {
        trace_warn!("WAVE: Failed to encode wave: {err}");
        return false;
    }
    let ok = save_file_data(path.as_ref(), out.get_ref());
    if ok {
        trace_info!("FILEIO: [{}] Wave data exported successfully", path.as_ref().display());
    }
    ok
}

#[must_use]
pub fn wave_copy(wave: RawWave) -> RawWave {
    match wave_bytes(wave) {
        Some(bytes) => alloc_wave(wave.sample_rate, wave.sample_size, wave.channels, bytes),
        None => RawWave::default(),
    }
}

/// Keeps frames `[init_frame, final_frame)`.
pub fn wave_crop(wave: &mut RawWave, init_frame: u32, final_frame: u32) {
    if init_frame >= final_frame || final_frame > wave.frame_count {
        trace_warn!("WAVE: Crop range out of bounds");
        return;
    }
    let frame_bytes = (wave.sample_size / 8 * wave.channels) as usize;
    let start = init_frame as usize * frame_bytes;
    let end = final_frame as usize * frame_bytes;
    let cropped = with_core(|core| {
        core.wave_data.get_mut(&wave.data).map(|bytes| {
            *bytes = bytes[start..end].to_vec();
        })
    });
    if cropped.is_some() {
        wave.frame_count = final_frame - init_frame;
    }
}

/// Resamples (linear) and converts sample size and channel count.
pub fn wave_format(wave: &mut RawWave, sample_rate: u32, sample_size: u32, channels: u32) {
    if !matches!(sample_size, 8 | 16 | 32) || channels == 0 || sample_rate == 0 {
        trace_warn!("WAVE: Unsupported target format");
        return;
    }
    let samples = load_wave_samples(*wave);
    if samples.is_empty() {
        return;
    }

    let src_channels = wave.channels as usize;
    let frames = samples.len() / src_channels;
    let frame = |i: usize| &samples[i * src_channels..(i + 1) * src_channels];
    // Channel mapping: mono is duplicated, extra channels are averaged away.
    let remap = |f: &[f32]| -> Vec<f32> {
        match (f.len(), channels as usize) {
            (a, b) if a == b => f.to_vec(),
            (1, b) => vec![f[0]; b],
            (a, 1) => vec![f.iter().sum::<f32>() / a as f32],
            (_, b) => (0..b).map(|c| f.get(c).copied().unwrap_or(0.0)).collect(),
        }
    };

    let out_frames = ((frames as u64 * u64::from(sample_rate)) / u64::from(wave.sample_rate)).max(1) as usize;
    let ratio = wave.sample_rate as f32 / sample_rate as f32;
    let mut out = Vec::with_capacity(out_frames * channels as usize);
    for i in 0..out_frames {
        let pos = i as f32 * ratio;
        let a = (pos as usize).min(frames - 1);
        let b = (a + 1).min(frames - 1);
        let t = pos - a as f32;
        let (fa, fb) = (remap(frame(a)), remap(frame(b)));
        out.extend(fa.iter().zip(&fb).map(|(x, y)| x + (y - x) * t));
    }

    let bytes = f32_to_samples(&out, sample_size);
    let stored = with_core(|core| {
        core.wave_data
            .get_mut(&wave.data)
            .map(|slot| *slot = bytes)
            .is_some()
    });
    if stored {
        wave.sample_rate = sample_rate;
        wave.sample_size = sample_size;
        wave.channels = channels;
        wave.frame_count = out_frames as u32;
    }
}

// ============================================================================
// Buffers
// ============================================================================

fn create_buffer(core: &mut Core, channels: u32, samples: Vec<f32>) -> u32 {
    let id = core.alloc_id();
    core.audio_buffers.insert(id, AudioBuffer::new(channels, samples));
    id
}

fn with_buffer(buffer: u32, f: impl FnOnce(&mut AudioBuffer)) {
    with_core(|core| {
        if let Some(b) = core.audio_buffers.get_mut(&buffer) {
            f(b);
        }
    });
}

fn buffer_state<R: Default>(buffer: u32, f: impl FnOnce(&AudioBuffer) -> R) -> R {
    with_core(|core| core.audio_buffers.get(&buffer).map(f).unwrap_or_default())
}

fn release_buffer(buffer: u32, kind: ResourceKind) -> bool {
    with_core(|core| {
        let known = core.audio_buffers.remove(&buffer).is_some();
        if known {
            core.track_unload(kind);
        } else {
            core.track_stray();
        }
        known
    })
}

// ============================================================================
// Sounds
// ============================================================================

pub fn load_sound(path: impl AsRef<Path>) -> RawSound {
    let wave = load_wave(path);
    if wave.data == 0 {
        return RawSound::default();
    }
    let sound = load_sound_from_wave(wave);
    unload_wave(wave);
    sound
}

/// Copies the wave's samples into a playable buffer. Needs the device.
pub fn load_sound_from_wave(wave: RawWave) -> RawSound {
    let samples = load_wave_samples(wave);
    if samples.is_empty() {
        return RawSound::default();
    }
    let buffer = with_core(|core| {
        core.audio.as_ref()?;
        let id = create_buffer(core, wave.channels, samples);
        core.track_load(ResourceKind::Sound);
        Some(id)
    });
    let Some(buffer) = buffer else {
        trace_warn!("SOUND: Failed to create buffer, audio device not initialized");
        return RawSound::default();
    };
    trace_info!("SOUND: Sound loaded successfully ({} frames)", wave.frame_count);
    RawSound {
        stream: RawAudioStream {
            buffer,
            sample_rate: wave.sample_rate,
            sample_size: 32,
            channels: wave.channels,
        },
        frame_count: wave.frame_count,
    }
}

#[must_use]
pub fn is_sound_ready(sound: RawSound) -> bool {
    sound.frame_count > 0 && is_audio_stream_ready(sound.stream)
}

pub fn unload_sound(sound: RawSound) {
    if sound.stream.buffer == 0 {
        return;
    }
    if release_buffer(sound.stream.buffer, ResourceKind::Sound) {
        trace_info!("SOUND: Unloaded sound data from RAM");
    } else {
        trace_warn!("SOUND: Unload of unknown sound");
    }
}

pub fn play_sound(sound: RawSound) {
    with_buffer(sound.stream.buffer, |b| {
        b.frame_cursor = 0;
        b.playing = true;
        b.paused = false;
    });
}

pub fn stop_sound(sound: RawSound) {
    with_buffer(sound.stream.buffer, |b| {
        b.frame_cursor = 0;
        b.playing = false;
        b.paused = false;
    });
}

pub fn pause_sound(sound: RawSound) {
    with_buffer(sound.stream.buffer, |b| b.paused = b.playing);
}

pub fn resume_sound(sound: RawSound) {
    with_buffer(sound.stream.buffer, |b| b.paused = false);
}

#[must_use]
pub fn is_sound_playing(sound: RawSound) -> bool {
    is_audio_stream_playing(sound.stream)
}

pub fn set_sound_volume(sound: RawSound, volume: f32) {
    set_audio_stream_volume(sound.stream, volume);
}

pub fn set_sound_pitch(sound: RawSound, pitch: f32) {
    set_audio_stream_pitch(sound.stream, pitch);
}

pub fn set_sound_pan(sound: RawSound, pan: f32) {
    set_audio_stream_pan(sound.stream, pan);
}

// ============================================================================
// Music
// ============================================================================

/// Opens a streamed track from memory. Loops by default.
pub fn load_music_stream_from_memory(file_type: &str, data: &[u8]) -> RawMusic {
    if !file_type.eq_ignore_ascii_case(".wav") {
        trace_warn!("STREAM: Data format not supported ({file_type})");
        return RawMusic::default();
    }
    let Some((sample_rate, sample_size, channels, bytes)) = decode_wav(data) else {
        return RawMusic::default();
    };
    let samples = samples_to_f32(&bytes, sample_size);
    if samples.is_empty() || channels == 0 {
        return RawMusic::default();
    }

    let handles = with_core(|core| {
        core.audio.as_ref()?;
        let buffer = create_buffer(core, channels, samples);
        let ctx = core.alloc_id();
        core.music_contexts.insert(ctx);
        core.music_buffers.insert(buffer);
        core.track_load(ResourceKind::Music);
        let frames = core.audio_buffers.get(&buffer).map_or(0, AudioBuffer::frame_count);
        Some((buffer, ctx, frames))
    });
    let Some((buffer, ctx_data, frame_count)) = handles else {
        trace_warn!("STREAM: Failed to create buffer, audio device not initialized");
        return RawMusic::default();
    };
    trace_info!("STREAM: Music stream loaded successfully ({frame_count} frames)");
    RawMusic {
        stream: RawAudioStream {
            buffer,
            sample_rate,
            sample_size: 32,
            channels,
        },
        frame_count,
        looping: true,
        ctx_data,
    }
}

pub fn load_music_stream(path: impl AsRef<Path>) -> RawMusic {
    let path = path.as_ref();
    let Some(data) = load_file_data(path) else {
        return RawMusic::default();
    };
    load_music_stream_from_memory(&get_file_extension(path).unwrap_or_default(), &data)
}

#[must_use]
pub fn is_music_ready(music: RawMusic) -> bool {
    music.ctx_data != 0
        && music.frame_count > 0
        && with_core(|core| core.music_contexts.contains(&music.ctx_data))
        && is_audio_stream_ready(music.stream)
}

pub fn unload_music_stream(music: RawMusic) {
    if music.ctx_data == 0 {
        return;
    }
    let known = with_core(|core| {
        let known = core.music_contexts.remove(&music.ctx_data);
        core.music_buffers.remove(&music.stream.buffer);
        core.audio_buffers.remove(&music.stream.buffer);
        if known {
            core.track_unload(ResourceKind::Music);
        } else {
            core.track_stray();
        }
        known
    });
    if !known {
        trace_warn!("STREAM: Unload of unknown music stream");
    }
}

pub fn play_music_stream(music: RawMusic) {
    with_buffer(music.stream.buffer, |b| {
        b.playing = true;
        b.paused = false;
    });
}

pub fn stop_music_stream(music: RawMusic) {
    with_buffer(music.stream.buffer, |b| {
        b.playing = false;
        b.paused = false;
        b.frame_cursor = 0;
    });
}

pub fn pause_music_stream(music: RawMusic) {
    with_buffer(music.stream.buffer, |b| b.paused = b.playing);
}

pub fn resume_music_stream(music: RawMusic) {
    with_buffer(music.stream.buffer, |b| b.paused = false);
}

#[must_use]
pub fn is_music_stream_playing(music: RawMusic) -> bool {
    is_audio_stream_playing(music.stream)
}

/// Feeds one period of the track. At the end the track restarts when
/// `music.looping`, otherwise it stops.
pub fn update_music_stream(music: RawMusic) {
    let period = with_core(|core| core.audio_buffer_frames);
    with_buffer(music.stream.buffer, |b| {
        if !b.playing || b.paused || music.frame_count == 0 {
            return;
        }
        let advance = (period as f32 * b.pitch).max(1.0) as u32;
        b.frame_cursor += advance;
        if b.frame_cursor >= music.frame_count {
            if music.looping {
                b.frame_cursor %= music.frame_count;
            } else {
                b.frame_cursor = 0;
                b.playing = false;
            }
        }
    });
}

/// Moves the play head to `position` seconds.
pub fn seek_music_stream(music: RawMusic, position: f32) {
    if music.stream.sample_rate == 0 {
        return;
    }
    let frame = (position.max(0.0) * music.stream.sample_rate as f32) as u32;
    with_buffer(music.stream.buffer, |b| {
        b.frame_cursor = frame.min(music.frame_count.saturating_sub(1));
    });
}

#[must_use]
pub fn get_music_time_length(music: RawMusic) -> f32 {
    if music.stream.sample_rate == 0 {
        return 0.0;
    }
    music.frame_count as f32 / music.stream.sample_rate as f32
}

#[must_use]
pub fn get_music_time_played(music: RawMusic) -> f32 {
    if music.stream.sample_rate == 0 {
        return 0.0;
    }
    let cursor = buffer_state(music.stream.buffer, |b| b.frame_cursor);
    cursor as f32 / music.stream.sample_rate as f32
}

pub fn set_music_volume(music: RawMusic, volume: f32) {
    set_audio_stream_volume(music.stream, volume);
}

pub fn set_music_pitch(music: RawMusic, pitch: f32) {
    set_audio_stream_pitch(music.stream, pitch);
}

pub fn set_music_pan(music: RawMusic, pan: f32) {
    set_audio_stream_pan(music.stream, pan);
}

// ============================================================================
// Raw streams
// ============================================================================

/// Empty stream fed with [`update_audio_stream`]. Needs the device.
pub fn load_audio_stream(sample_rate: u32, sample_size: u32, channels: u32) -> RawAudioStream {
    if !matches!(sample_size, 8 | 16 | 32) || channels == 0 || sample_rate == 0 {
        trace_warn!("STREAM: Unsupported stream format");
        return RawAudioStream::default();
    }
    let buffer = with_core(|core| {
        core.audio.as_ref()?;
        let id = create_buffer(core, channels, Vec::new());
        core.track_load(ResourceKind::AudioStream);
        Some(id)
    });
    let Some(buffer) = buffer else {
        trace_warn!("STREAM: Failed to create buffer, audio device not initialized");
        return RawAudioStream::default();
    };
    trace_info!("STREAM: Audio stream initialized ({sample_rate} Hz, {sample_size} bit, {channels} ch)");
    RawAudioStream {
        buffer,
        sample_rate,
        sample_size,
        channels,
    }
}

#[must_use]
pub fn is_audio_stream_ready(stream: RawAudioStream) -> bool {
    stream.buffer != 0
        && stream.sample_rate > 0
        && stream.channels > 0
        && with_core(|core| core.audio_buffers.contains_key(&stream.buffer))
}

pub fn unload_audio_stream(stream: RawAudioStream) {
    if stream.buffer == 0 {
        return;
    }
    if release_buffer(stream.buffer, ResourceKind::AudioStream) {
        trace_info!("STREAM: Unloaded audio stream data from RAM");
    } else {
        trace_warn!("STREAM: Unload of unknown audio stream");
    }
}

/// Queues interleaved samples encoded at the stream's sample size. The
/// stream reports unprocessed until the mixer consumes them.
pub fn update_audio_stream(stream: RawAudioStream, data: &[u8]) {
    let samples = samples_to_f32(data, stream.sample_size);
    with_buffer(stream.buffer, |b| {
        b.samples = samples;
        b.frame_cursor = 0;
        b.processed = false;
    });
}

#[must_use]
pub fn is_audio_stream_processed(stream: RawAudioStream) -> bool {
    buffer_state(stream.buffer, |b| b.processed)
}

pub fn play_audio_stream(stream: RawAudioStream) {
    with_buffer(stream.buffer, |b| {
        b.playing = true;
        b.paused = false;
    });
}

pub fn stop_audio_stream(stream: RawAudioStream) {
    with_buffer(stream.buffer, |b| {
        b.playing = false;
        b.paused = false;
        b.frame_cursor = 0;
    });
}

pub fn pause_audio_stream(stream: RawAudioStream) {
    with_buffer(stream.buffer, |b| b.paused = b.playing);
}

pub fn resume_audio_stream(stream: RawAudioStream) {
    with_buffer(stream.buffer, |b| b.paused = false);
}

#[must_use]
pub fn is_audio_stream_playing(stream: RawAudioStream) -> bool {
    buffer_state(stream.buffer, |b| b.playing && !b.paused)
}

pub fn set_audio_stream_volume(stream: RawAudioStream, volume: f32) {
    with_buffer(stream.buffer, |b| b.volume = volume.max(0.0));
}

pub fn set_audio_stream_pitch(stream: RawAudioStream, pitch: f32) {
    with_buffer(stream.buffer, |b| b.pitch = pitch.max(0.0));
}

/// 0 is left, 0.5 center, 1 right.
pub fn set_audio_stream_pan(stream: RawAudioStream, pan: f32) {
    with_buffer(stream.buffer, |b| b.pan = pan.clamp(0.0, 1.0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::context::resource_stats;

    fn tone(frames: usize) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut out = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut out, spec).expect("writer");
        for i in 0..frames {
            writer.write_sample(((i % 64) as i16 - 32) * 512).expect("sample");
        }
        writer.finalize().expect("finalize");
        out.into_inner()
    }

    #[test]
    fn wave_decodes_and_crops() {
        let mut wave = load_wave_from_memory(".wav", &tone(800));
        assert!(is_wave_ready(wave));
        assert_eq!((wave.frame_count, wave.sample_rate, wave.sample_size), (800, 8000, 16));

        wave_crop(&mut wave, 100, 300);
        assert_eq!(wave.frame_count, 200);
        assert_eq!(load_wave_samples(wave).len(), 200);
        unload_wave(wave);
    }

    #[test]
    fn format_conversion_resamples_and_upmixes() {
        let mut wave = load_wave_from_memory(".wav", &tone(800));
        wave_format(&mut wave, 16000, 32, 2);
        assert_eq!(wave.channels, 2);
        assert_eq!(wave.sample_size, 32);
        assert_eq!(wave.frame_count, 1600);
        assert_eq!(load_wave_samples(wave).len(), 3200);
        unload_wave(wave);
    }

    #[test]
    fn copy_is_independent() {
        let wave = load_wave_from_memory(".wav", &tone(100));
        let copy = wave_copy(wave);
        assert_ne!(copy.data, wave.data);
        unload_wave(wave);
        assert!(is_wave_ready(copy));
        unload_wave(copy);
        assert_eq!(resource_stats().live(ResourceKind::Wave), 0);
    }

    #[test]
    fn sound_needs_device() {
        let wave = load_wave_from_memory(".wav", &tone(100));
        assert!(!is_sound_ready(load_sound_from_wave(wave)));

        init_audio_device();
        let sound = load_sound_from_wave(wave);
        assert!(is_sound_ready(sound));
        play_sound(sound);
        assert!(is_sound_playing(sound));
        pause_sound(sound);
        assert!(!is_sound_playing(sound));
        unload_sound(sound);
        unload_sound(sound);
        unload_wave(wave);
        close_audio_device();

        assert_eq!(resource_stats().stray_releases(), 1);
    }

    #[test]
    fn music_advances_and_stops_without_loop() {
        init_audio_device();
        set_audio_stream_buffer_size_default(400);
        let mut music = load_music_stream_from_memory(".wav", &tone(1000));
        assert!(is_music_ready(music));
        assert!((get_music_time_length(music) - 0.125).abs() < 1e-6);

        music.looping = false;
        play_music_stream(music);
        update_music_stream(music);
        assert!((get_music_time_played(music) - 0.05).abs() < 1e-6);
        update_music_stream(music);
        update_music_stream(music);
        assert!(!is_music_stream_playing(music));

        seek_music_stream(music, 0.1);
        assert!((get_music_time_played(music) - 0.1).abs() < 1e-6);
        unload_music_stream(music);
        close_audio_device();
    }

    #[test]
    fn raw_stream_is_drained_by_the_mixer() {
        init_audio_device();
        let stream = load_audio_stream(8000, 16, 1);
        assert!(is_audio_stream_ready(stream));
        assert!(is_audio_stream_processed(stream));

        update_audio_stream(stream, &[0u8; 64]);
        assert!(!is_audio_stream_processed(stream));
        play_audio_stream(stream);
        mix_frame();
        assert!(is_audio_stream_processed(stream));
        unload_audio_stream(stream);
        close_audio_device();
    }
}
