//! Error types for modgraph-fs

use std::path::PathBuf;

use crate::config::ConfigFormat;

/// Result type for modgraph-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in modgraph-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or canonicalizing a path failed for a reason other than absence.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: ConfigFormat,
        message: String,
    },

    #[error("Unsupported config format: '{extension}' (expected toml, json, yaml or yml)")]
    UnsupportedFormat { extension: String },
}

impl Error {
    /// Wrap an I/O failure at `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
