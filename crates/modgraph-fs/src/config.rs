//! Format-agnostic configuration loading

use std::fmt;

use serde::de::DeserializeOwned;

use crate::{Error, NormalizedPath, Result, io};

/// A configuration file format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format of `path` from its extension, case-insensitively.
    pub fn from_path(path: &NormalizedPath) -> Result<Self> {
        let extension = path.extension().unwrap_or_default();
        match extension.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    fn deserialize<T: DeserializeOwned>(self, content: &str) -> std::result::Result<T, String> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        })
    }
}

/// Read-only configuration store.
///
/// The format is detected from the file extension (see [`ConfigFormat`]).
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a file that must exist.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let format = ConfigFormat::from_path(path)?;
        tracing::debug!("Loading {} configuration from {}", format, path);
        parse(path, format, &io::read_text(path)?)
    }

    /// Load configuration, or `None` when the file does not exist.
    pub fn load_optional<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<Option<T>> {
        let format = ConfigFormat::from_path(path)?;
        let Some(content) = io::read_text_if_exists(path)? else {
            tracing::trace!("No configuration at {}", path);
            return Ok(None);
        };
        tracing::debug!("Loading {} configuration from {}", format, path);
        parse(path, format, &content).map(Some)
    }
}

fn parse<T: DeserializeOwned>(path: &NormalizedPath, format: ConfigFormat, content: &str) -> Result<T> {
    format
        .deserialize(content)
        .map_err(|message| Error::ConfigParse {
            path: path.to_native(),
            format,
            message,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        let detect = |p: &str| ConfigFormat::from_path(&NormalizedPath::new(p));
        assert_eq!(detect("/a/modgraph.toml").unwrap(), ConfigFormat::Toml);
        assert_eq!(detect("/a/modgraph.JSON").unwrap(), ConfigFormat::Json);
        assert_eq!(detect("/a/modgraph.yml").unwrap(), ConfigFormat::Yaml);
        assert!(matches!(
            detect("/a/modgraph.ini"),
            Err(Error::UnsupportedFormat { ref extension }) if extension == "ini"
        ));
    }
}
