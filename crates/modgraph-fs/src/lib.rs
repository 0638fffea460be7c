//! Filesystem abstraction for modgraph
//!
//! Provides normalized path handling, upward manifest lookup and
//! format-agnostic configuration loading.

pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::{ConfigFormat, ConfigStore};
pub use error::{Error, Result};
pub use path::NormalizedPath;
