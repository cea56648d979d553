//! Ownership wrappers over a flat, C-style game and graphics library.
//!
//! The library itself lives in [`sys`]: free functions over plain-data
//! handles that must be released exactly once. Everything else in this crate
//! ties those handles to Rust ownership:
//!
//! - [`resources`]: one owning wrapper per resource kind, plus non-owning
//!   views for handles someone else releases.
//! - [`Window`] and [`AudioDevice`]: guards for the library's global state.
//! - [`camera`], [`window::DrawFrame`] and the `begin()` methods: scoped
//!   render modes that end when dropped.
//! - [`assets`]: a virtual file table the loaders can read through.
//!
//! ```rust,ignore
//! use raywrap::prelude::*;
//!
//! raywrap::init_logging();
//! let mut window = Window::new(WindowConfig::default().with_title("demo"))?;
//! let texture = Texture::load("resources/cat.png")?;
//! while !window.should_close() {
//!     let mut frame = window.begin_drawing();
//!     frame.clear_background(Color::RAYWHITE);
//!     texture.draw(10, 10, Color::WHITE);
//! }
//! ```

pub mod assets;
pub mod audio_device;
pub mod camera;
pub mod config;
pub mod errors;
pub mod handle;
pub mod math;
pub mod resources;
pub mod sys;
pub mod window;

pub use assets::{AssetTable, InstalledAssets};
pub use audio_device::AudioDevice;
pub use camera::{Camera2D, Camera3D, CameraProjection, Mode2D, Mode3D};
pub use config::{AudioConfig, WindowConfig};
pub use errors::{RaywrapError, Result};
pub use handle::{AsRaw, NativeResource, Owned, Ownership, Unmanaged};
pub use math::{BoundingBox, Color, Matrix, Quaternion, Rectangle, Transform, Vector2, Vector3, Vector4};
pub use resources::{
    AudioStream, Font, FontOps, FontUnmanaged, Image, Material, MaterialOwnership, Mesh, MeshOps,
    MeshUnmanaged, Model, ModelAnimation, Music, RenderTexture, Shader, ShaderUnmanaged, Sound,
    Texture, TextureDraw, TextureUnmanaged, Wave,
};
pub use sys::{ConfigFlags, ResourceKind};
pub use window::{DrawFrame, Window};

/// Installs `env_logger` with an `info` default filter.
///
/// `RUST_LOG` still overrides the default. Calling this more than once is
/// harmless.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init();
}

pub mod prelude {
    pub use crate::camera::{Camera2D, Camera3D, CameraProjection};
    pub use crate::config::{AudioConfig, WindowConfig};
    pub use crate::errors::{RaywrapError, Result};
    pub use crate::math::{BoundingBox, Color, Matrix, Rectangle, Vector2, Vector3};
    pub use crate::resources::{
        AudioStream, Font, FontOps, Image, Material, Mesh, MeshOps, Model, ModelAnimation, Music,
        RenderTexture, Shader, Sound, Texture, TextureDraw, Wave,
    };
    pub use crate::sys::{ConfigFlags, MaterialMapIndex, PixelFormat};
    pub use crate::{AudioDevice, Window};
}
