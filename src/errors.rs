//! Error Types
//!
//! The library reports a failed load by handing back a handle that is not
//! ready. The wrappers turn that into [`RaywrapError::LoadFailed`]; every
//! other variant belongs to the wrapper layer itself (singleton guards, the
//! asset table, exports).
//!
//! Drawing and querying never fail.
//!
//! ```rust,ignore
//! use raywrap::errors::Result;
//! use raywrap::Texture;
//!
//! fn load() -> Result<Texture> {
//!     Texture::load("resources/boom.png")
//! }
//! ```

use thiserror::Error;

use crate::sys::ResourceKind;

#[derive(Error, Debug)]
pub enum RaywrapError {
    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// The library returned a handle that is not ready.
    #[error("Failed to load {kind} from {origin}")]
    LoadFailed {
        kind: ResourceKind,
        /// Path or description of the source.
        origin: String,
    },

    /// Writing a resource out failed.
    #[error("Failed to export to {0}")]
    ExportFailed(String),

    /// A mesh or material slot that the model does not have.
    #[error("Index out of bounds: {context} (index: {index})")]
    IndexOutOfBounds { context: String, index: usize },

    // ========================================================================
    // Device Errors
    // ========================================================================
    /// A window or audio device is already open on this thread.
    #[error("{0} is already initialized")]
    AlreadyInitialized(&'static str),

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Zip archive error.
    #[cfg(feature = "archive")]
    #[error("Archive error: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    /// Image encoding or decoding error.
    #[error("Image error: {0}")]
    ImageError(String),
}

impl RaywrapError {
    pub(crate) fn load_failed(kind: ResourceKind, origin: impl Into<String>) -> Self {
        Self::LoadFailed {
            kind,
            origin: origin.into(),
        }
    }
}

impl From<image::ImageError> for RaywrapError {
    fn from(err: image::ImageError) -> Self {
        RaywrapError::ImageError(err.to_string())
    }
}

/// Alias for `Result<T, RaywrapError>`.
pub type Result<T> = std::result::Result<T, RaywrapError>;
