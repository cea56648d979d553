use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::errors::Result;

/// Where the bytes of one virtual asset live.
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// A file on disk.
    File(PathBuf),
    /// An entry inside a zip archive on disk.
    #[cfg(feature = "archive")]
    Archive { archive: Rc<Path>, entry: String },
    /// Bytes held by the table itself.
    Memory(Rc<[u8]>),
}

impl AssetSource {
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::File(path) => Ok(std::fs::read(path)?),
            #[cfg(feature = "archive")]
            Self::Archive { archive, entry } => read_archive_entry(archive, entry),
            Self::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }

    /// The on-disk path when the asset is a plain file.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            _ => None,
        }
    }
}

impl From<PathBuf> for AssetSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&Path> for AssetSource {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

impl From<Vec<u8>> for AssetSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Memory(bytes.into())
    }
}

impl From<&[u8]> for AssetSource {
    fn from(bytes: &[u8]) -> Self {
        Self::Memory(bytes.into())
    }
}

#[cfg(feature = "archive")]
fn read_archive_entry(archive: &Path, entry: &str) -> Result<Vec<u8>> {
    use std::io::Read;

    let file = std::fs::File::open(archive)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut entry = archive.by_name(entry)?;
    let mut data = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or_default());
    entry.read_to_end(&mut data)?;
    Ok(data)
}

#[cfg(feature = "archive")]
pub(crate) fn archive_entry_names(archive: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(archive)?;
    let archive = zip::ZipArchive::new(file)?;
    Ok(archive
        .file_names()
        .filter(|name| !name.ends_with('/'))
        .map(str::to_owned)
        .collect())
}

/// Virtual names are relative and `/`-separated.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let name = name.replace('\\', "/");
    let mut name = name.as_str();
    while let Some(rest) = name.strip_prefix("./") {
        name = rest;
    }
    name.trim_start_matches('/').to_owned()
}

/// `true` when a normalized name stays inside whatever directory it is
/// joined onto: no `..`, no root and no drive prefix.
#[must_use]
pub fn is_contained_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('/').all(|part| {
            let mut components = Path::new(part).components();
            matches!(
                (components.next(), components.next()),
                (Some(std::path::Component::Normal(_)), None)
            )
        })
}

/// Virtual name of `path` relative to `root`, if it lies under it.
pub(crate) fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_normalized() {
        assert_eq!(normalize_name("./sprites\\a.png"), "sprites/a.png");
        assert_eq!(normalize_name("/music/theme.wav"), "music/theme.wav");
        assert_eq!(normalize_name("plain.txt"), "plain.txt");
    }

    #[test]
    fn escaping_names_are_not_contained() {
        assert!(is_contained_name("sprites/a.png"));
        assert!(!is_contained_name("../a.png"));
        assert!(!is_contained_name("sprites/../../a.png"));
        assert!(!is_contained_name("sprites//a.png"));
        assert!(!is_contained_name(""));
    }

    #[test]
    fn relative_names_use_slashes() {
        let root = Path::new("/data/assets");
        let path = root.join("sprites").join("a.png");
        assert_eq!(relative_name(root, &path).as_deref(), Some("sprites/a.png"));
        assert_eq!(relative_name(root, Path::new("/elsewhere/b.png")), None);
    }

    #[test]
    fn memory_source_reads_back() {
        let source = AssetSource::from(vec![7u8, 8, 9]);
        assert_eq!(source.read_bytes().unwrap(), vec![7, 8, 9]);
        assert!(source.file_path().is_none());
    }
}
