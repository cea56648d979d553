//! Owning wrappers for every native resource.
//!
//! Each wrapper releases its handle exactly once, when dropped or when
//! `unload` is called. The `*Unmanaged` views expose the same read and draw
//! surface over handles owned elsewhere and never release anything:
//! - Image, Texture, RenderTexture
//! - Shader, Material
//! - Mesh, Model, ModelAnimation
//! - Font
//! - Wave, Sound, Music, AudioStream

pub mod audio_stream;
pub mod font;
pub mod image;
pub mod material;
pub mod mesh;
pub mod model;
pub mod music;
pub mod shader;
pub mod sound;
pub mod texture;
pub mod wave;

pub use audio_stream::AudioStream;
pub use font::{Font, FontOps, FontUnmanaged};
pub use image::Image;
pub use material::{Material, MaterialOwnership};
pub use mesh::{Mesh, MeshOps, MeshUnmanaged};
pub use model::{Model, ModelAnimation};
pub use music::Music;
pub use shader::{Shader, ShaderMode, ShaderUnmanaged};
pub use sound::Sound;
pub use texture::{RenderTexture, Texture, TextureDraw, TextureMode, TextureUnmanaged};
pub use wave::Wave;
