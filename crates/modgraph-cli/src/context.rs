//! Project context: configuration lookup and session construction.

use std::path::Path;

use modgraph_core::{
    CONFIG_FILENAME, FsResolver, ManifestResolver, ModgraphConfig, ModuleSession,
};
use modgraph_fs::{NormalizedPath, io};

use crate::error::Result;

/// Resolve the session for the project containing `dir`.
///
/// `config` overrides the `modgraph.toml` lookup. When no core module
/// location is configured, an installed copy is looked up from the project.
pub fn load_session(dir: &Path, config: Option<&Path>) -> Result<ModuleSession> {
    let dir = io::real_path(&NormalizedPath::new(std::path::absolute(dir)?))?;
    let mut config = load_config(&dir, config)?;

    if config.core.path.is_none() {
        config.core.path = find_installed_core(&config, &dir);
    }

    Ok(ModuleSession::open(dir, config)?)
}

fn load_config(dir: &NormalizedPath, explicit: Option<&Path>) -> Result<ModgraphConfig> {
    if let Some(path) = explicit {
        let path = NormalizedPath::new(std::path::absolute(path)?);
        tracing::debug!("Using configuration {}", path);
        let base = path.parent().unwrap_or_else(|| dir.clone());
        return Ok(ModgraphConfig::load(&path)?.relative_to(&base));
    }

    match dir.find_upward(CONFIG_FILENAME) {
        Some(root) => Ok(ModgraphConfig::discover(&root)?),
        None => Ok(ModgraphConfig::default()),
    }
}

fn find_installed_core(config: &ModgraphConfig, dir: &NormalizedPath) -> Option<NormalizedPath> {
    let resolver = FsResolver::from_config(config);
    let project = resolver.find_nearest_manifest(dir).unwrap_or_else(|| dir.clone());
    let found = resolver
        .resolve_identifier(
            &config.core.name,
            &project.join(&config.manifest_file),
            &project,
        )
        .ok()?;
    tracing::debug!("Found installed core module at {}", found);
    found.parent()
}
