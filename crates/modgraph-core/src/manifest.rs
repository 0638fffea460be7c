//! Package manifest model.
//!
//! Modules are described by an npm-style `package.json`. A package opts into
//! the module ecosystem with a `modgraph` block:
//!
//! ```json
//! {
//!   "name": "theme-utils",
//!   "version": "1.2.0",
//!   "dependencies": { "color-math": "^2.0.0" },
//!   "modgraph": {
//!     "needs": "^3.0.0",
//!     "name": "utils"
//!   }
//! }
//! ```
//!
//! Only the fields the resolver reads are modelled; unknown keys are ignored.

use std::collections::BTreeMap;

use modgraph_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The subset of `package.json` the resolver understands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Package name.
    #[serde(default)]
    pub name: Option<String>,
    /// Package version.
    #[serde(default)]
    pub version: Option<String>,
    /// Runtime dependencies, identifier to range.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    /// Peer dependencies, identifier to range.
    #[serde(default)]
    pub peer_dependencies: BTreeMap<String, String>,
    /// Development dependencies; only followed for the project root.
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
    /// Ecosystem opt-in block.
    #[serde(default)]
    pub modgraph: Option<ModuleDeclaration>,
}

/// The `modgraph` block of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModuleDeclaration {
    /// Overrides the package name as the module's identity.
    #[serde(default)]
    pub name: Option<String>,
    /// Range of core module versions this module works with.
    #[serde(default)]
    pub needs: Option<String>,
}

impl PackageManifest {
    /// Parse manifest JSON read from `path`.
    pub fn from_json(path: &NormalizedPath, content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|source| Error::ManifestParse {
            path: path.clone(),
            source,
        })
    }

    /// Whether the package opts into the module ecosystem.
    pub fn is_extension(&self) -> bool {
        self.modgraph.is_some()
    }

    /// The module name: the declaration's override, else the package name.
    pub fn module_name(&self) -> Option<&str> {
        self.modgraph
            .as_ref()
            .and_then(|decl| decl.name.as_deref())
            .or(self.name.as_deref())
    }

    /// The engine requirement declared in the `modgraph` block.
    pub fn engine_requirement(&self) -> Option<&str> {
        self.modgraph.as_ref().and_then(|decl| decl.needs.as_deref())
    }

    /// Merge dependency tables into one identifier-keyed set.
    ///
    /// Order of precedence (later wins on conflicting ranges):
    /// `dependencies`, `peerDependencies`, then `devDependencies` when
    /// `include_dev` is set.
    pub fn merged_dependencies(&self, include_dev: bool) -> BTreeMap<String, String> {
        let mut merged = self.dependencies.clone();
        merged.extend(
            self.peer_dependencies
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        if include_dev {
            merged.extend(
                self.dev_dependencies
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }
        merged
    }
}

/// A manifest location together with its contents, if it exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    /// Path of the manifest file (which may not exist).
    pub path: NormalizedPath,
    /// Parsed contents; `None` when there is no manifest at `path`.
    pub data: Option<PackageManifest>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> PackageManifest {
        PackageManifest::from_json(&NormalizedPath::new("/p/package.json"), json).unwrap()
    }

    #[test]
    fn test_plain_package_is_not_extension() {
        let manifest = parse(r#"{"name": "lodash", "version": "4.17.21"}"#);
        assert!(!manifest.is_extension());
        assert_eq!(manifest.module_name(), Some("lodash"));
        assert_eq!(manifest.engine_requirement(), None);
    }

    #[test]
    fn test_declaration_block() {
        let manifest = parse(
            r#"{
                "name": "theme-utils",
                "version": "1.2.0",
                "modgraph": { "needs": "^3.0.0", "name": "utils" }
            }"#,
        );
        assert!(manifest.is_extension());
        assert_eq!(manifest.module_name(), Some("utils"));
        assert_eq!(manifest.engine_requirement(), Some("^3.0.0"));
    }

    #[test]
    fn test_empty_declaration_block_still_opts_in() {
        let manifest = parse(r#"{"name": "a", "modgraph": {}}"#);
        assert!(manifest.is_extension());
        assert_eq!(manifest.module_name(), Some("a"));
    }

    #[test]
    fn test_merge_precedence() {
        let manifest = parse(
            r#"{
                "dependencies": { "a": "1.0.0", "b": "1.0.0" },
                "peerDependencies": { "b": "2.0.0", "c": "1.0.0" },
                "devDependencies": { "c": "3.0.0", "d": "1.0.0" }
            }"#,
        );

        let runtime = manifest.merged_dependencies(false);
        assert_eq!(runtime.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(runtime["b"], "2.0.0");
        assert_eq!(runtime["c"], "1.0.0");

        let root = manifest.merged_dependencies(true);
        assert_eq!(root.len(), 4);
        assert_eq!(root["c"], "3.0.0");
    }

    #[test]
    fn test_malformed_manifest_is_error() {
        let result = PackageManifest::from_json(&NormalizedPath::new("/p/package.json"), "{");
        assert!(matches!(result, Err(Error::ManifestParse { .. })));
    }
}
