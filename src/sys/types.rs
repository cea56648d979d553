//! Plain-data handles and enums of the native API.
//!
//! Handles are passed by value, exactly like the C structs they mirror. A
//! handle is only a description of a resource living in the library's tables;
//! copying it never duplicates the resource, which is why the wrapper layer
//! keeps exactly one owner per handle.

use bitflags::bitflags;

use crate::math::{Color, Matrix, Rectangle, Transform, Vector2, Vector3, Vector4};

pub const MAX_MATERIAL_MAPS: usize = 12;
pub const MAX_MESH_VERTEX_BUFFERS: usize = 7;
pub const MAX_SHADER_LOCATIONS: usize = 32;

/// Id of the 1x1 white texture created with the context. Never released.
pub const DEFAULT_TEXTURE_ID: u32 = 1;
/// Id of the built-in shader program. Never released.
pub const DEFAULT_SHADER_ID: u32 = 3;

// ============================================================================
// Enums
// ============================================================================

/// Pixel layouts understood by the image and texture primitives.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    #[default]
    Unknown = 0,
    UncompressedGrayscale = 1,
    UncompressedGrayAlpha = 2,
    UncompressedR8G8B8 = 4,
    UncompressedR8G8B8A8 = 7,
    /// Depth attachment of a render texture. Not readable from the CPU.
    Depth24 = 19,
}

impl PixelFormat {
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Unknown => 0,
            Self::UncompressedGrayscale => 1,
            Self::UncompressedGrayAlpha => 2,
            Self::UncompressedR8G8B8 => 3,
            Self::UncompressedR8G8B8A8 | Self::Depth24 => 4,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::UncompressedGrayscale => "GRAYSCALE",
            Self::UncompressedGrayAlpha => "GRAY_ALPHA",
            Self::UncompressedR8G8B8 => "R8G8B8",
            Self::UncompressedR8G8B8A8 => "R8G8B8A8",
            Self::Depth24 => "DEPTH_24",
        }
    }

    /// Size in bytes of a `width` x `height` buffer in this format.
    #[must_use]
    pub fn data_size(self, width: i32, height: i32) -> usize {
        width.max(0) as usize * height.max(0) as usize * self.bytes_per_pixel()
    }
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    #[default]
    Point = 0,
    Bilinear,
    Trilinear,
    Anisotropic4x,
    Anisotropic8x,
    Anisotropic16x,
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureWrap {
    #[default]
    Repeat = 0,
    Clamp,
    MirrorRepeat,
    MirrorClamp,
}

/// Texture slots of a material.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialMapIndex {
    Albedo = 0,
    Metalness,
    Normal,
    Roughness,
    Occlusion,
    Emission,
    Height,
    Cubemap,
    Irradiance,
    Prefilter,
    Brdf,
}

/// Standard entries of a shader's location table.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderLocationIndex {
    VertexPosition = 0,
    VertexTexcoord01,
    VertexTexcoord02,
    VertexNormal,
    VertexTangent,
    VertexColor,
    MatrixMvp,
    MatrixView,
    MatrixProjection,
    MatrixModel,
    MatrixNormal,
    VectorView,
    ColorDiffuse,
    ColorSpecular,
    ColorAmbient,
    MapAlbedo,
    MapMetalness,
    MapNormal,
    MapRoughness,
    MapOcclusion,
    MapEmission,
    MapHeight,
    MapCubemap,
    MapIrradiance,
    MapPrefilter,
    MapBrdf,
}

/// A uniform value together with its type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShaderValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Int(i32),
    IVec2([i32; 2]),
    IVec3([i32; 3]),
    IVec4([i32; 4]),
    Sampler2D(u32),
    Matrix(Matrix),
}

impl From<f32> for ShaderValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for ShaderValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<Vector2> for ShaderValue {
    fn from(v: Vector2) -> Self {
        Self::Vec2([v.x, v.y])
    }
}

impl From<Vector3> for ShaderValue {
    fn from(v: Vector3) -> Self {
        Self::Vec3([v.x, v.y, v.z])
    }
}

impl From<Vector4> for ShaderValue {
    fn from(v: Vector4) -> Self {
        Self::Vec4([v.x, v.y, v.z, v.w])
    }
}

impl From<Color> for ShaderValue {
    fn from(c: Color) -> Self {
        c.normalize().into()
    }
}

impl From<Matrix> for ShaderValue {
    fn from(m: Matrix) -> Self {
        Self::Matrix(m)
    }
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum TraceLogLevel {
    All = 0,
    Trace,
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
    None,
}

bitflags! {
    /// Window and context hints, applied by `init_window`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ConfigFlags: u32 {
        const VSYNC_HINT = 0x0000_0040;
        const FULLSCREEN_MODE = 0x0000_0002;
        const WINDOW_RESIZABLE = 0x0000_0004;
        const WINDOW_UNDECORATED = 0x0000_0008;
        const WINDOW_HIDDEN = 0x0000_0080;
        const WINDOW_MINIMIZED = 0x0000_0200;
        const WINDOW_MAXIMIZED = 0x0000_0400;
        const WINDOW_UNFOCUSED = 0x0000_0800;
        const WINDOW_TOPMOST = 0x0000_1000;
        const WINDOW_ALWAYS_RUN = 0x0000_0100;
        const WINDOW_TRANSPARENT = 0x0000_0010;
        const WINDOW_HIGHDPI = 0x0000_2000;
        const MSAA_4X_HINT = 0x0000_0020;
        const INTERLACED_HINT = 0x0001_0000;
    }
}

// ============================================================================
// Handles
// ============================================================================

/// CPU image. `data` names a pixel buffer owned by the library; 0 is null.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawImage {
    pub data: u32,
    pub width: i32,
    pub height: i32,
    pub mipmaps: i32,
    pub format: PixelFormat,
}

/// GPU texture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawTexture {
    pub id: u32,
    pub width: i32,
    pub height: i32,
    pub mipmaps: i32,
    pub format: PixelFormat,
}

/// Framebuffer with a color and a depth attachment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawRenderTexture {
    pub id: u32,
    pub texture: RawTexture,
    pub depth: RawTexture,
}

/// Shader program plus its location table (allocated separately).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawShader {
    pub id: u32,
    pub locs: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawMaterialMap {
    pub texture: RawTexture,
    pub color: Color,
    pub value: f32,
}

/// Shader plus texture slots. `id` names the map block the library
/// allocates for a material.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawMaterial {
    pub id: u32,
    pub shader: RawShader,
    pub maps: [RawMaterialMap; MAX_MATERIAL_MAPS],
    pub params: [f32; 4],
}

/// CPU vertex attributes of a mesh.
///
/// Attribute arrays are flat: three floats per position/normal, two per
/// texcoord, four per tangent, four bytes per color, four bone ids and
/// weights per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub texcoords: Vec<f32>,
    pub texcoords2: Vec<f32>,
    pub normals: Vec<f32>,
    pub tangents: Vec<f32>,
    pub colors: Vec<u8>,
    pub indices: Vec<u16>,
    pub bone_ids: Vec<u8>,
    pub bone_weights: Vec<f32>,
    pub anim_vertices: Vec<f32>,
    pub anim_normals: Vec<f32>,
}

impl MeshData {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        if self.indices.is_empty() {
            self.vertex_count() / 3
        } else {
            self.indices.len() / 3
        }
    }

    #[must_use]
    pub fn vertex(&self, index: usize) -> Vector3 {
        let v = &self.vertices[index * 3..index * 3 + 3];
        Vector3::new(v[0], v[1], v[2])
    }

    /// Installs a triangle list. Index buffers are 16 bit, so larger meshes
    /// are expanded into plain (non-indexed) triangles instead.
    pub(crate) fn set_indices(&mut self, indices: &[u32]) {
        if self.vertex_count() <= usize::from(u16::MAX) {
            self.indices = indices.iter().map(|&i| i as u16).collect();
            return;
        }

        fn expand<T: Copy>(src: &mut Vec<T>, stride: usize, indices: &[u32]) {
            if src.is_empty() {
                return;
            }
            let source: &[T] = src;
            let expanded: Vec<T> = indices
                .iter()
                .flat_map(|&i| {
                    let start = i as usize * stride;
                    source[start..start + stride].iter().copied()
                })
                .collect();
            *src = expanded;
        }
        expand(&mut self.vertices, 3, indices);
        expand(&mut self.texcoords, 2, indices);
        expand(&mut self.texcoords2, 2, indices);
        expand(&mut self.normals, 3, indices);
        expand(&mut self.tangents, 4, indices);
        expand(&mut self.colors, 4, indices);
        expand(&mut self.bone_ids, 4, indices);
        expand(&mut self.bone_weights, 4, indices);
        self.indices.clear();
    }
}

/// Mesh: CPU attribute block plus GPU vertex array and buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawMesh {
    pub vertex_count: i32,
    pub triangle_count: i32,
    pub data: u32,
    pub vao_id: u32,
    pub vbo_id: [u32; MAX_MESH_VERTEX_BUFFERS],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneInfo {
    pub name: String,
    pub parent: i32,
}

/// Meshes, materials and skeleton. `id` names the allocation holding the
/// arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawModel {
    pub id: u32,
    pub transform: Matrix,
    pub meshes: Vec<RawMesh>,
    pub materials: Vec<RawMaterial>,
    pub mesh_material: Vec<usize>,
    pub bones: Vec<BoneInfo>,
    pub bind_pose: Vec<Transform>,
}

/// Bone poses for every frame, in model space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawModelAnimation {
    pub id: u32,
    pub name: String,
    pub bones: Vec<BoneInfo>,
    pub frame_poses: Vec<Vec<Transform>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlyphInfo {
    pub value: char,
    pub offset_x: i32,
    pub offset_y: i32,
    pub advance_x: i32,
    /// Location of the glyph inside the atlas texture.
    pub rec: Rectangle,
}

/// Font: atlas texture plus a glyph table allocated by the library.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawFont {
    pub base_size: i32,
    pub glyph_count: i32,
    pub glyph_padding: i32,
    pub texture: RawTexture,
    pub glyphs: u32,
}

/// Decoded samples. `data` names a sample buffer owned by the library.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawWave {
    pub frame_count: u32,
    pub sample_rate: u32,
    pub sample_size: u32,
    pub channels: u32,
    pub data: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawAudioStream {
    pub buffer: u32,
    pub sample_rate: u32,
    pub sample_size: u32,
    pub channels: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawSound {
    pub stream: RawAudioStream,
    pub frame_count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawMusic {
    pub stream: RawAudioStream,
    pub frame_count: u32,
    pub looping: bool,
    pub ctx_data: u32,
}
