//! Manifest lookup and package identifier resolution.
//!
//! The discovery engine never touches the filesystem directly; it goes
//! through [`ManifestResolver`]. [`FsResolver`] is the default implementation
//! and follows the node-style layout: bare identifiers are looked up in
//! `node_modules` directories, walking upward from the requesting package.

use modgraph_fs::{NormalizedPath, io};

use crate::config::ModgraphConfig;
use crate::error::{Error, Result};
use crate::manifest::{ManifestFile, PackageManifest};

/// Locates and reads package manifests.
pub trait ManifestResolver {
    /// Nearest directory at or above `path` that contains a manifest.
    fn find_nearest_manifest(&self, path: &NormalizedPath) -> Option<NormalizedPath>;

    /// Read the manifest in `dir`.
    ///
    /// A missing manifest is `data: None`, not an error.
    fn read_manifest(&self, dir: &NormalizedPath) -> Result<ManifestFile>;

    /// Resolve a package identifier to the absolute path of its manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestNotFound`] when nothing matches.
    fn resolve_identifier(
        &self,
        identifier: &str,
        requester_manifest: &NormalizedPath,
        requester_dir: &NormalizedPath,
    ) -> Result<NormalizedPath>;

    /// Resolve symbolic links in `path`.
    fn real_path(&self, path: &NormalizedPath) -> Result<NormalizedPath>;
}

/// [`ManifestResolver`] over the real filesystem.
#[derive(Debug, Clone)]
pub struct FsResolver {
    manifest_file: String,
    modules_dir: String,
}

impl Default for FsResolver {
    fn default() -> Self {
        Self::from_config(&ModgraphConfig::default())
    }
}

impl FsResolver {
    /// Create a resolver with the default `package.json` / `node_modules` layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver using the file names from `config`.
    pub fn from_config(config: &ModgraphConfig) -> Self {
        Self {
            manifest_file: config.manifest_file.clone(),
            modules_dir: config.modules_dir.clone(),
        }
    }

    /// Manifest path for a directory.
    fn manifest_in(&self, dir: &NormalizedPath) -> NormalizedPath {
        dir.join(&self.manifest_file)
    }

    /// A path identifier names either a manifest file or its directory.
    fn resolve_path(&self, target: &NormalizedPath) -> Option<NormalizedPath> {
        if target.is_file() {
            Some(target.clone())
        } else {
            let manifest = self.manifest_in(target);
            manifest.is_file().then_some(manifest)
        }
    }
}

impl ManifestResolver for FsResolver {
    fn find_nearest_manifest(&self, path: &NormalizedPath) -> Option<NormalizedPath> {
        path.find_upward(&self.manifest_file)
    }

    fn read_manifest(&self, dir: &NormalizedPath) -> Result<ManifestFile> {
        let path = self.manifest_in(dir);
        let data = match io::read_text_if_exists(&path)? {
            Some(content) => Some(PackageManifest::from_json(&path, &content)?),
            None => None,
        };
        Ok(ManifestFile { path, data })
    }

    fn resolve_identifier(
        &self,
        identifier: &str,
        requester_manifest: &NormalizedPath,
        requester_dir: &NormalizedPath,
    ) -> Result<NormalizedPath> {
        let not_found = || Error::ManifestNotFound {
            identifier: identifier.to_string(),
            from: requester_manifest.clone(),
        };

        let as_path = NormalizedPath::new(identifier);
        if as_path.is_absolute() {
            return self.resolve_path(&as_path).ok_or_else(not_found);
        }
        if identifier.starts_with("./") || identifier.starts_with("../") {
            return self
                .resolve_path(&requester_dir.join(identifier))
                .ok_or_else(not_found);
        }

        requester_dir
            .ancestors()
            .filter(|dir| dir.file_name() != Some(self.modules_dir.as_str()))
            .map(|dir| self.manifest_in(&dir.join(&self.modules_dir).join(identifier)))
            .find(|candidate| candidate.is_file())
            .ok_or_else(not_found)
    }

    fn real_path(&self, path: &NormalizedPath) -> Result<NormalizedPath> {
        Ok(io::real_path(path)?)
    }
}
