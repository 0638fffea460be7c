//! Read-only filesystem helpers

use std::fs;
use std::io::ErrorKind;

use crate::{Error, NormalizedPath, Result};

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read text content from a file, returning `None` when the file does not exist.
///
/// Any other I/O failure is an error.
pub fn read_text_if_exists(path: &NormalizedPath) -> Result<Option<String>> {
    let native_path = path.to_native();
    match fs::read_to_string(&native_path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(&native_path, e)),
    }
}

/// Resolve symlinks in `path`.
///
/// A path that does not exist resolves to itself.
pub fn real_path(path: &NormalizedPath) -> Result<NormalizedPath> {
    let native_path = path.to_native();
    match dunce::canonicalize(&native_path) {
        Ok(resolved) => Ok(NormalizedPath::new(resolved)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(path.clone()),
        Err(e) => Err(Error::io(&native_path, e)),
    }
}
