//! Resolver configuration.
//!
//! Loaded from `modgraph.toml` (or any format [`ConfigStore`] understands):
//!
//! ```toml
//! manifest_file = "package.json"
//! modules_dir = "node_modules"
//! modules = ["./local/theme"]
//!
//! [core]
//! name = "modgraph"
//! path = "/usr/lib/modgraph"
//! ```

use modgraph_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The canonical configuration filename looked up in a project root.
pub const CONFIG_FILENAME: &str = "modgraph.toml";

/// Resolver configuration. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModgraphConfig {
    /// Manifest file name in every package directory.
    pub manifest_file: String,
    /// Directory name that holds installed packages.
    pub modules_dir: String,
    /// The ecosystem's core module.
    pub core: CoreConfig,
    /// Extra module directories attached to the project root.
    pub modules: Vec<NormalizedPath>,
}

impl Default for ModgraphConfig {
    fn default() -> Self {
        Self {
            manifest_file: "package.json".to_string(),
            modules_dir: "node_modules".to_string(),
            core: CoreConfig::default(),
            modules: Vec::new(),
        }
    }
}

/// Location and identity of the core module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Module name of the core module.
    pub name: String,
    /// Installation directory of the core module.
    pub path: Option<NormalizedPath>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            name: "modgraph".to_string(),
            path: None,
        }
    }
}

impl ModgraphConfig {
    /// Load configuration from `path`.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    /// Load `modgraph.toml` from `root`, falling back to defaults when absent.
    ///
    /// Relative `core.path` and `modules` entries are resolved against `root`.
    pub fn discover(root: &NormalizedPath) -> Result<Self> {
        let path = root.join(CONFIG_FILENAME);
        let config = match ConfigStore::new().load_optional::<Self>(&path)? {
            Some(config) => {
                tracing::debug!("Loaded configuration from {}", path);
                config
            }
            None => Self::default(),
        };
        Ok(config.relative_to(root))
    }

    /// Resolve relative paths in this configuration against `base`.
    pub fn relative_to(mut self, base: &NormalizedPath) -> Self {
        let absolutize = |p: NormalizedPath| {
            if p.is_absolute() {
                p
            } else {
                base.join(p.as_str())
            }
        };
        self.core.path = self.core.path.map(absolutize);
        self.modules = self.modules.into_iter().map(absolutize).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ModgraphConfig::default();
        assert_eq!(config.manifest_file, "package.json");
        assert_eq!(config.modules_dir, "node_modules");
        assert_eq!(config.core.name, "modgraph");
        assert!(config.core.path.is_none());
        assert!(config.modules.is_empty());
    }

    #[test]
    fn test_discover_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ModgraphConfig::discover(&NormalizedPath::new(temp.path())).unwrap();
        assert_eq!(config, ModgraphConfig::default());
    }

    #[test]
    fn test_discover_resolves_relative_paths() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILENAME),
            r#"
modules = ["./local/theme"]

[core]
name = "engine"
path = "vendor/engine"
"#,
        )
        .unwrap();

        let root = NormalizedPath::new(temp.path());
        let config = ModgraphConfig::discover(&root).unwrap();

        assert_eq!(config.core.name, "engine");
        assert_eq!(config.core.path, Some(root.join("vendor/engine")));
        assert_eq!(config.modules, vec![root.join("local/theme")]);
        assert_eq!(config.manifest_file, "package.json");
    }
}
