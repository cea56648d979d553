//! Audio Tests
//!
//! Tests for:
//! - AudioDevice singleton guard and configuration
//! - Wave decoding, deep clone and editing
//! - Sounds need an open device and stop at their end
//! - Music streaming: update, looping, seek and time queries
//! - Raw streams drained by the per-frame mixer

use std::io::Cursor;

use raywrap::prelude::*;
use raywrap::sys;
use raywrap::{RaywrapError, ResourceKind};

const RATE: u32 = 8000;
const FRAMES: u32 = 100;

/// Mono 16 bit ramp, `FRAMES` long.
fn wav_bytes() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
    for i in 0..FRAMES {
        writer.write_sample((i as i16) * 100).unwrap();
    }
    writer.finalize().unwrap();
    cursor.into_inner()
}

/// Advances the mixer by one period.
fn next_frame() {
    sys::begin_drawing();
    sys::end_drawing();
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

// ============================================================================
// Device
// ============================================================================

#[test]
fn device_is_a_singleton() {
    let first = AudioDevice::new().unwrap();
    assert!(first.is_ready());
    assert!(matches!(
        AudioDevice::new(),
        Err(RaywrapError::AlreadyInitialized(_))
    ));

    drop(first);
    assert!(!sys::is_audio_device_ready());
    let again = AudioDevice::new().unwrap();
    assert!(again.is_ready());
}

#[test]
fn device_applies_config() {
    let mut device = AudioDevice::with_config(AudioConfig::default().with_master_volume(0.25)).unwrap();
    assert!(approx(device.master_volume(), 0.25));
    device.set_master_volume(2.0);
    assert!(approx(device.master_volume(), 1.0));
}

#[test]
fn device_closed_behind_the_guard_is_not_closed_twice() {
    let device = AudioDevice::new().unwrap();
    sys::close_audio_device();
    drop(device);
    assert!(!sys::is_audio_device_ready());
}

// ============================================================================
// Waves
// ============================================================================

#[test]
fn wave_decodes_and_clones_deeply() {
    let wave = Wave::load_from_memory(".wav", &wav_bytes()).unwrap();
    assert_eq!(wave.frame_count(), FRAMES);
    assert_eq!(wave.sample_rate(), RATE);
    assert_eq!(wave.sample_size(), 16);
    assert_eq!(wave.channels(), 1);
    assert!(approx(wave.duration(), FRAMES as f32 / RATE as f32));

    let mut copy = wave.clone();
    copy.crop(0, 50);
    assert_eq!(copy.frame_count(), 50);
    assert_eq!(wave.frame_count(), FRAMES);

    drop(wave);
    drop(copy);
    let stats = sys::resource_stats();
    assert_eq!(stats.live(ResourceKind::Wave), 0);
    assert_eq!(stats.stray_releases(), 0);
}

#[test]
fn wave_format_conversion() {
    let mut wave = Wave::load_from_memory(".wav", &wav_bytes()).unwrap();
    wave.format(RATE * 2, 32, 2);
    assert_eq!(wave.sample_rate(), RATE * 2);
    assert_eq!(wave.sample_size(), 32);
    assert_eq!(wave.channels(), 2);
    assert_eq!(wave.samples().len(), wave.frame_count() as usize * 2);
}

#[test]
fn wave_export_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ramp.wav");
    let wave = Wave::load_from_memory(".wav", &wav_bytes()).unwrap();
    wave.export(&path).unwrap();

    let back = Wave::load(&path).unwrap();
    assert_eq!(back.frame_count(), FRAMES);
    assert_eq!(back.samples(), wave.samples());
}

#[test]
fn unsupported_wave_type_fails() {
    assert!(Wave::load_from_memory(".ogg", &wav_bytes()).is_err());
    assert!(Wave::load("missing.wav").is_err());
}

// ============================================================================
// Sounds
// ============================================================================

#[test]
fn sound_needs_the_device() {
    let wave = Wave::load_from_memory(".wav", &wav_bytes()).unwrap();
    let err = Sound::from_wave(&wave).unwrap_err();
    assert!(matches!(
        err,
        RaywrapError::LoadFailed {
            kind: ResourceKind::Sound,
            ..
        }
    ));

    let _device = AudioDevice::new().unwrap();
    let sound = Sound::from_wave(&wave).unwrap();
    assert_eq!(sound.frame_count(), FRAMES);
    assert!(wave.is_ready());
}

#[test]
fn sound_stops_at_its_end() {
    let _device = AudioDevice::with_config(AudioConfig::default().with_stream_buffer_frames(64)).unwrap();
    let wave = Wave::load_from_memory(".wav", &wav_bytes()).unwrap();
    let mut sound = Sound::from_wave(&wave).unwrap();

    sound.play();
    assert!(sound.is_playing());
    next_frame();
    assert!(sound.is_playing());
    next_frame();
    assert!(!sound.is_playing());
}

#[test]
fn paused_sound_does_not_advance() {
    let _device = AudioDevice::with_config(AudioConfig::default().with_stream_buffer_frames(64)).unwrap();
    let wave = Wave::load_from_memory(".wav", &wav_bytes()).unwrap();
    let mut sound = Sound::from_wave(&wave).unwrap();

    sound.play().pause();
    assert!(!sound.is_playing());
    next_frame();
    next_frame();
    sound.resume();
    assert!(sound.is_playing());
}

#[test]
fn sound_released_once() {
    let device = AudioDevice::new().unwrap();
    let wave = Wave::load_from_memory(".wav", &wav_bytes()).unwrap();
    let mut sound = Sound::from_wave(&wave).unwrap();
    sound.unload();
    drop(sound);
    drop(device);

    let stats = sys::resource_stats();
    assert_eq!(stats.loaded(ResourceKind::Sound), 1);
    assert_eq!(stats.unloaded(ResourceKind::Sound), 1);
    assert_eq!(stats.stray_releases(), 0);
}

// ============================================================================
// Music
// ============================================================================

#[test]
fn music_loops_by_default() {
    let _device = AudioDevice::with_config(AudioConfig::default().with_stream_buffer_frames(64)).unwrap();
    let mut music = Music::load_from_memory(".wav", &wav_bytes()).unwrap();
    assert!(music.looping());
    assert!(approx(music.time_length(), FRAMES as f32 / RATE as f32));

    music.play();
    music.update().update();
    assert!(music.is_playing());
    assert!(approx(music.time_played(), 28.0 / RATE as f32));
}

#[test]
fn non_looping_music_stops() {
    let _device = AudioDevice::with_config(AudioConfig::default().with_stream_buffer_frames(64)).unwrap();
    let mut music = Music::load_from_memory(".wav", &wav_bytes()).unwrap();
    music.set_looping(false).play();
    music.update().update();
    assert!(!music.is_playing());
}

#[test]
fn music_seek_moves_play_head() {
    let _device = AudioDevice::new().unwrap();
    let mut music = Music::load_from_memory(".wav", &wav_bytes()).unwrap();
    music.seek(40.0 / RATE as f32);
    assert!(approx(music.time_played(), 40.0 / RATE as f32));
}

#[test]
fn music_is_not_touched_by_the_mixer() {
    let _device = AudioDevice::with_config(AudioConfig::default().with_stream_buffer_frames(64)).unwrap();
    let mut music = Music::load_from_memory(".wav", &wav_bytes()).unwrap();
    music.play();
    next_frame();
    assert!(approx(music.time_played(), 0.0));
}

// ============================================================================
// Raw streams
// ============================================================================

#[test]
fn raw_stream_is_drained_by_the_mixer() {
    let _device = AudioDevice::new().unwrap();
    let mut stream = AudioStream::new(22050, 16, 2).unwrap();
    assert_eq!(stream.channels(), 2);

    stream.update(&[0u8; 256]);
    assert!(!stream.is_processed());
    stream.play();
    next_frame();
    assert!(stream.is_processed());
}

#[test]
fn raw_stream_rejects_bad_formats() {
    let _device = AudioDevice::new().unwrap();
    assert!(AudioStream::new(44100, 12, 2).is_err());
    assert_eq!(sys::resource_stats().loaded(ResourceKind::AudioStream), 0);
}
