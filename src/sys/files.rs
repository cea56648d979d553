//! File access used by every loader.
//!
//! Loaders never touch the filesystem directly; they call
//! [`load_file_data`], which goes through an installable callback first. This
//! is the hook the asset table uses to redirect plain load calls.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::sys::trace::{trace_info, trace_warn};

/// Replacement for the file reader. Returning `None` reports a missing file.
pub type LoadFileDataCallback = Rc<dyn Fn(&Path) -> Option<Vec<u8>>>;

thread_local! {
    static DATA_LOADER: RefCell<Option<LoadFileDataCallback>> = const { RefCell::new(None) };
}

/// Installs `callback` as the file reader and returns the previous one.
pub fn set_load_file_data_callback(
    callback: Option<LoadFileDataCallback>,
) -> Option<LoadFileDataCallback> {
    DATA_LOADER.with(|slot| std::mem::replace(&mut *slot.borrow_mut(), callback))
}

/// Reads the whole file, or `None` when it cannot be read.
pub fn load_file_data(path: impl AsRef<Path>) -> Option<Vec<u8>> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        trace_warn!("FILEIO: File name provided is not valid");
        return None;
    }

    // Clone the callback out so it may itself call into the library.
    let callback = DATA_LOADER.with(|slot| slot.borrow().clone());
    let data = match callback {
        Some(callback) => callback(path),
        None => std::fs::read(path).ok(),
    };

    match &data {
        Some(bytes) => trace_info!(
            "FILEIO: [{}] File loaded successfully ({} bytes)",
            path.display(),
            bytes.len()
        ),
        None => trace_warn!("FILEIO: [{}] Failed to open file", path.display()),
    }
    data
}

/// Reads a UTF-8 text file, or `None` when it is missing or not text.
pub fn load_file_text(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    let bytes = load_file_data(path)?;
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(_) => {
            trace_warn!("FILEIO: [{}] File is not valid UTF-8 text", path.display());
            None
        }
    }
}

pub fn save_file_data(path: impl AsRef<Path>, data: &[u8]) -> bool {
    let path = path.as_ref();
    match std::fs::write(path, data) {
        Ok(()) => {
            trace_info!("FILEIO: [{}] File saved successfully", path.display());
            true
        }
        Err(err) => {
            trace_warn!("FILEIO: [{}] Failed to save file: {err}", path.display());
            false
        }
    }
}

#[must_use]
pub fn file_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}

/// Lowercase extension including the dot, e.g. `".png"`.
#[must_use]
pub fn get_file_extension(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_replaces_filesystem() {
        let previous = set_load_file_data_callback(Some(Rc::new(|path: &Path| {
            (path == Path::new("virtual.bin")).then(|| vec![1, 2, 3])
        })));
        assert!(previous.is_none());

        assert_eq!(load_file_data("virtual.bin"), Some(vec![1, 2, 3]));
        assert_eq!(load_file_data("other.bin"), None);

        set_load_file_data_callback(None);
        assert_eq!(load_file_data("virtual.bin"), None);
    }

    #[test]
    fn extension_is_lowercase_with_dot() {
        assert_eq!(get_file_extension("a/b/IMG.PNG").as_deref(), Some(".png"));
        assert_eq!(get_file_extension("noext"), None);
    }
}
