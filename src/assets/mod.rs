//! Virtual asset names resolved to directories, zip archives or memory.
//!
//! ```rust,ignore
//! let mut table = AssetTable::new();
//! table.mount_dir("assets")?;
//! table.mount_archive("patch.zip")?; // shadows names from `assets/`
//! let _assets = table.install();
//! let sprite = Image::load("sprites/player.png")?;
//! ```

pub mod io;
pub mod table;

pub use io::{normalize_name, AssetSource};
pub use table::{AssetTable, InstalledAssets};
