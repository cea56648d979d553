use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::assets::io::{is_contained_name, normalize_name, relative_name, AssetSource};
use crate::errors::{RaywrapError, Result};
use crate::sys::{self, LoadFileDataCallback};

/// Maps virtual asset names to where their bytes live.
///
/// Mounting the same name twice keeps the later source.
#[derive(Debug, Default)]
pub struct AssetTable {
    entries: FxHashMap<String, AssetSource>,
    extracted: RefCell<FxHashMap<String, PathBuf>>,
    #[cfg(feature = "archive")]
    scratch: RefCell<Option<tempfile::TempDir>>,
}

impl AssetTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers every file under `root` by its path relative to `root`.
    /// Returns how many files were mounted.
    pub fn mount_dir(&mut self, root: impl AsRef<Path>) -> Result<usize> {
        let root = root.as_ref();
        let mut files = Vec::new();
        collect_files(root, &mut files)?;
        let mut mounted = 0;
        for path in files {
            if let Some(name) = relative_name(root, &path) {
                self.insert(&name, path);
                mounted += 1;
            }
        }
        log::debug!("mounted {mounted} files from {}", root.display());
        Ok(mounted)
    }

    /// Registers every file entry of a zip archive by its entry name.
    #[cfg(feature = "archive")]
    pub fn mount_archive(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let names = crate::assets::io::archive_entry_names(path)?;
        let archive: Rc<Path> = Rc::from(path);
        let mut mounted = 0;
        for entry in names {
            let name = normalize_name(&entry);
            if !is_contained_name(&name) {
                log::warn!("skipping archive entry {entry:?}: it leaves the archive root");
                continue;
            }
            self.insert(
                &name,
                AssetSource::Archive {
                    archive: Rc::clone(&archive),
                    entry,
                },
            );
            mounted += 1;
        }
        log::debug!("mounted {mounted} entries from {}", path.display());
        Ok(mounted)
    }

    pub fn insert(&mut self, name: &str, source: impl Into<AssetSource>) -> &mut Self {
        let name = normalize_name(name);
        self.extracted.get_mut().remove(&name);
        self.entries.insert(name, source.into());
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_name(name))
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&AssetSource> {
        self.entries.get(&normalize_name(name))
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.resolve(name)
            .ok_or_else(|| RaywrapError::AssetNotFound(name.to_owned()))?
            .read_bytes()
    }

    /// A real path holding the asset's bytes.
    ///
    /// Files on disk return their own path. Other sources are written once
    /// into a private temporary directory that lives as long as the table.
    pub fn extract(&self, name: &str) -> Result<PathBuf> {
        let key = normalize_name(name);
        let source = self
            .entries
            .get(&key)
            .ok_or_else(|| RaywrapError::AssetNotFound(name.to_owned()))?;
        if let Some(path) = source.file_path() {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = self.extracted.borrow().get(&key) {
            return Ok(path.clone());
        }
        let path = self.write_scratch(&key, &source.read_bytes()?)?;
        self.extracted.borrow_mut().insert(key, path.clone());
        Ok(path)
    }

    #[cfg(feature = "archive")]
    fn write_scratch(&self, key: &str, data: &[u8]) -> Result<PathBuf> {
        if !is_contained_name(key) {
            return Err(RaywrapError::AssetNotFound(key.to_owned()));
        }
        let mut scratch = self.scratch.borrow_mut();
        if scratch.is_none() {
            *scratch = Some(tempfile::Builder::new().prefix("raywrap-assets").tempdir()?);
        }
        let Some(dir) = scratch.as_ref() else {
            return Err(RaywrapError::AssetNotFound(key.to_owned()));
        };
        let path = key
            .split('/')
            .fold(dir.path().to_path_buf(), |path, part| path.join(part));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, data)?;
        log::debug!("extracted {key} to {}", path.display());
        Ok(path)
    }

    #[cfg(not(feature = "archive"))]
    fn write_scratch(&self, key: &str, _data: &[u8]) -> Result<PathBuf> {
        Err(RaywrapError::AssetNotFound(format!("{key} (not on disk)")))
    }

    /// Routes every library file read through this table.
    ///
    /// Names the table does not know go to the reader installed before it,
    /// or to the real filesystem when there is none. Dropping the returned
    /// guard restores the previous reader.
    #[must_use = "the table is uninstalled when the guard is dropped"]
    pub fn install(self) -> InstalledAssets {
        let table = Rc::new(self);
        let reader = Rc::clone(&table);
        let previous = sys::set_load_file_data_callback(None);
        let fallback = previous.clone();
        let callback: LoadFileDataCallback = Rc::new(move |path: &Path| {
            let name = path.to_string_lossy();
            if reader.contains(&name) {
                return match reader.read(&name) {
                    Ok(data) => Some(data),
                    Err(err) => {
                        log::warn!("failed to read asset {name}: {err}");
                        None
                    }
                };
            }
            match &fallback {
                Some(next) => next(path),
                None => std::fs::read(path).ok(),
            }
        });
        sys::set_load_file_data_callback(Some(callback));
        InstalledAssets { table, previous }
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// An [`AssetTable`] installed as the library's file reader.
pub struct InstalledAssets {
    table: Rc<AssetTable>,
    previous: Option<LoadFileDataCallback>,
}

impl InstalledAssets {
    #[must_use]
    pub fn table(&self) -> &AssetTable {
        &self.table
    }
}

impl std::fmt::Debug for InstalledAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstalledAssets")
            .field("table", &self.table)
            .field("previous", &self.previous.is_some())
            .finish()
    }
}

impl Drop for InstalledAssets {
    fn drop(&mut self) {
        sys::set_load_file_data_callback(self.previous.take());
    }
}
