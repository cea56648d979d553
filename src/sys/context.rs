//! Library state.
//!
//! Every table the handles point into lives in one [`Core`] per thread. The
//! library is single-threaded by contract: a handle created on one thread
//! means nothing on another, and each thread sees its own window and audio
//! device.

use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::fmt;

use crate::sys::types::{
    GlyphInfo, MeshData, PixelFormat, RawFont, ShaderValue, TextureFilter, TextureWrap,
    DEFAULT_SHADER_ID, DEFAULT_TEXTURE_ID, MAX_SHADER_LOCATIONS,
};
use crate::sys::window::{FrameState, WindowState};

/// Resource families tracked by the load/unload instrumentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Image,
    Texture,
    RenderTexture,
    Shader,
    Mesh,
    Material,
    Model,
    ModelAnimation,
    Font,
    Wave,
    Sound,
    Music,
    AudioStream,
}

impl ResourceKind {
    pub const COUNT: usize = 13;

    pub const ALL: [ResourceKind; Self::COUNT] = [
        Self::Image,
        Self::Texture,
        Self::RenderTexture,
        Self::Shader,
        Self::Mesh,
        Self::Material,
        Self::Model,
        Self::ModelAnimation,
        Self::Font,
        Self::Wave,
        Self::Sound,
        Self::Music,
        Self::AudioStream,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Texture => "Texture",
            Self::RenderTexture => "RenderTexture",
            Self::Shader => "Shader",
            Self::Mesh => "Mesh",
            Self::Material => "Material",
            Self::Model => "Model",
            Self::ModelAnimation => "ModelAnimation",
            Self::Font => "Font",
            Self::Wave => "Wave",
            Self::Sound => "Sound",
            Self::Music => "Music",
            Self::AudioStream => "AudioStream",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Load/unload counters of the calling thread's library context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceStats {
    loaded: [u64; ResourceKind::COUNT],
    unloaded: [u64; ResourceKind::COUNT],
    stray_releases: u64,
}

impl ResourceStats {
    #[must_use]
    pub fn loaded(&self, kind: ResourceKind) -> u64 {
        self.loaded[kind as usize]
    }

    #[must_use]
    pub fn unloaded(&self, kind: ResourceKind) -> u64 {
        self.unloaded[kind as usize]
    }

    /// Resources of `kind` loaded and not yet released.
    #[must_use]
    pub fn live(&self, kind: ResourceKind) -> u64 {
        self.loaded(kind).saturating_sub(self.unloaded(kind))
    }

    /// Unload calls on handles the library did not know: double frees.
    #[must_use]
    pub fn stray_releases(&self) -> u64 {
        self.stray_releases
    }
}

// ============================================================================
// Table entries
// ============================================================================

#[derive(Debug, Clone)]
pub(crate) struct GpuTexture {
    pub width: i32,
    pub height: i32,
    pub mipmaps: i32,
    pub format: PixelFormat,
    /// Level 0 contents, kept so textures can be read back.
    pub pixels: Vec<u8>,
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Framebuffer {
    pub color: u32,
    pub depth: u32,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ShaderProgram {
    pub uniforms: FxHashMap<String, i32>,
    pub attribs: FxHashMap<String, i32>,
    pub values: FxHashMap<i32, ShaderValue>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct VertexArray {
    pub buffers: Vec<u32>,
    pub dynamic: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct AudioBuffer {
    /// Interleaved samples normalized to [-1, 1].
    pub samples: Vec<f32>,
    pub channels: u32,
    pub frame_cursor: u32,
    pub playing: bool,
    pub paused: bool,
    pub looping: bool,
    pub volume: f32,
    pub pitch: f32,
    pub pan: f32,
    /// Set once queued data has been consumed; raw streams only.
    pub processed: bool,
}

impl AudioBuffer {
    pub(crate) fn new(channels: u32, samples: Vec<f32>) -> Self {
        Self {
            samples,
            channels: channels.max(1),
            frame_cursor: 0,
            playing: false,
            paused: false,
            looping: false,
            volume: 1.0,
            pitch: 1.0,
            pan: 0.5,
            processed: true,
        }
    }

    pub(crate) fn frame_count(&self) -> u32 {
        (self.samples.len() / self.channels as usize) as u32
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AudioDeviceState {
    pub master_volume: f32,
}

// ============================================================================
// Core
// ============================================================================

pub(crate) struct Core {
    next_id: u32,
    pub stats: ResourceStats,

    // CPU allocations
    pub image_data: FxHashMap<u32, Vec<u8>>,
    pub wave_data: FxHashMap<u32, Vec<u8>>,
    pub mesh_data: FxHashMap<u32, MeshData>,
    pub glyph_tables: FxHashMap<u32, Vec<GlyphInfo>>,
    pub shader_locs: FxHashMap<u32, Vec<i32>>,
    pub material_blocks: FxHashSet<u32>,
    pub models: FxHashSet<u32>,
    pub animations: FxHashSet<u32>,

    // GPU objects
    pub textures: FxHashMap<u32, GpuTexture>,
    pub framebuffers: FxHashMap<u32, Framebuffer>,
    pub programs: FxHashMap<u32, ShaderProgram>,
    pub vertex_arrays: FxHashMap<u32, VertexArray>,
    pub vertex_buffers: FxHashSet<u32>,

    // Devices
    pub window: Option<WindowState>,
    pub frame: FrameState,
    pub audio: Option<AudioDeviceState>,
    pub audio_buffers: FxHashMap<u32, AudioBuffer>,
    /// Decoder contexts of open music streams (`RawMusic::ctx_data`).
    pub music_contexts: FxHashSet<u32>,
    /// Buffers fed by music streams; the mixer leaves them alone.
    pub music_buffers: FxHashSet<u32>,
    pub audio_buffer_frames: u32,

    pub default_font: Option<RawFont>,
}

/// Location table id of the default shader.
pub(crate) const DEFAULT_SHADER_LOCS: u32 = 2;
/// Ids below this value are reserved for built-in objects.
const FIRST_DYNAMIC_ID: u32 = 16;

impl Core {
    fn new() -> Self {
        let mut core = Self {
            next_id: FIRST_DYNAMIC_ID,
            stats: ResourceStats::default(),
            image_data: FxHashMap::default(),
            wave_data: FxHashMap::default(),
            mesh_data: FxHashMap::default(),
            glyph_tables: FxHashMap::default(),
            shader_locs: FxHashMap::default(),
            material_blocks: FxHashSet::default(),
            models: FxHashSet::default(),
            animations: FxHashSet::default(),
            textures: FxHashMap::default(),
            framebuffers: FxHashMap::default(),
            programs: FxHashMap::default(),
            vertex_arrays: FxHashMap::default(),
            vertex_buffers: FxHashSet::default(),
            window: None,
            frame: FrameState::default(),
            audio: None,
            audio_buffers: FxHashMap::default(),
            music_contexts: FxHashSet::default(),
            music_buffers: FxHashSet::default(),
            audio_buffer_frames: 4096,
            default_font: None,
        };

        core.textures.insert(
            DEFAULT_TEXTURE_ID,
            GpuTexture {
                width: 1,
                height: 1,
                mipmaps: 1,
                format: PixelFormat::UncompressedR8G8B8A8,
                pixels: vec![255; 4],
                filter: TextureFilter::Point,
                wrap: TextureWrap::Repeat,
            },
        );
        core.programs
            .insert(DEFAULT_SHADER_ID, crate::sys::shader::default_program());
        core.shader_locs.insert(
            DEFAULT_SHADER_LOCS,
            crate::sys::shader::standard_locations(&core.programs[&DEFAULT_SHADER_ID]),
        );
        debug_assert_eq!(core.shader_locs[&DEFAULT_SHADER_LOCS].len(), MAX_SHADER_LOCATIONS);

        core
    }

    pub fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn track_load(&mut self, kind: ResourceKind) {
        self.stats.loaded[kind as usize] += 1;
    }

    pub fn track_unload(&mut self, kind: ResourceKind) {
        self.stats.unloaded[kind as usize] += 1;
    }

    pub fn track_stray(&mut self) {
        self.stats.stray_releases += 1;
    }
}

thread_local! {
    static CORE: RefCell<Core> = RefCell::new(Core::new());
}

/// Runs `f` against the calling thread's library state.
///
/// Must not be nested: primitives that call other primitives do so outside
/// of the closure.
pub(crate) fn with_core<R>(f: impl FnOnce(&mut Core) -> R) -> R {
    CORE.with(|core| f(&mut core.borrow_mut()))
}

/// Snapshot of the load/unload counters of the calling thread.
#[must_use]
pub fn resource_stats() -> ResourceStats {
    with_core(|core| core.stats.clone())
}
