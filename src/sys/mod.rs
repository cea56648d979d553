//! The wrapped library: a flat API of free functions over plain-data
//! handles.
//!
//! Everything above this module talks to the library only through these
//! functions, passing handles by value the way the C API does. Loaders
//! return an empty (not ready) handle on failure and log a warning; unload
//! functions ignore zero handles and count unknown ones as stray releases.
//!
//! This implementation is headless. CPU resources (pixels, samples, glyphs,
//! vertex data) are real; GPU and device objects are entries in the calling
//! thread's context and draw calls are counted rather than rasterized.

mod audio;
mod context;
mod files;
#[cfg(feature = "gltf")]
mod gltf;
mod image;
mod material;
mod mesh;
mod model;
mod obj;
mod primitives;
mod shader;
mod text;
mod texture;
pub(crate) mod trace;
mod types;
mod window;

pub use audio::*;
pub use context::{resource_stats, ResourceKind, ResourceStats};
pub use files::*;
pub use image::*;
pub use material::*;
pub use mesh::*;
pub use model::*;
pub use shader::*;
pub use text::*;
pub use texture::*;
pub use trace::{get_trace_log_level, set_trace_log_level, trace_log};
pub use types::*;
pub use window::*;
