//! Recursive module discovery.
//!
//! [`Discovery`] turns a project directory into the raw (non-deduplicated)
//! module tree. Nodes are created eagerly when a manifest is found, but their
//! dependency lists are only expanded when first read through
//! [`DependencySource::dependencies`]. Both steps go through the caches in
//! [`SharedCaches`], so a `(path, kind)` pair is discovered at most once and
//! an identifier is resolved at most once per requester.

use std::rc::Rc;

use modgraph_fs::NormalizedPath;

use crate::cache::SharedCaches;
use crate::config::CoreConfig;
use crate::error::{Error, Result};
use crate::node::{Dependency, Expansion, ModuleNode, NodeId, insert_dependency};
use crate::resolver::ManifestResolver;

/// How a directory is being discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoverKind {
    /// The project itself: kept even without opting in, follows dev dependencies.
    Root,
    /// A declared dependency: kept only if it opts in.
    Dependency,
    /// A module named explicitly by the caller: kept without opting in.
    Explicit,
    /// The core module installation: kept without opting in, named after the
    /// configured core name.
    Core,
}

impl DiscoverKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Dependency => "dependency",
            Self::Explicit => "explicit",
            Self::Core => "core",
        }
    }
}

/// Read access to a module tree.
///
/// Implemented by [`Discovery`] over the live cache, and by anything else
/// that can present nodes with ordered dependency lists.
pub trait DependencySource {
    /// Shared handle to a node.
    fn node(&self, id: NodeId) -> Rc<ModuleNode>;

    /// Ordered dependencies of a node; empty when it has none.
    fn dependencies(&self, id: NodeId) -> Result<Vec<Dependency>>;
}

/// The discovery engine.
pub struct Discovery<'a> {
    resolver: &'a dyn ManifestResolver,
    caches: SharedCaches,
    core: CoreConfig,
}

impl<'a> Discovery<'a> {
    /// Create a discovery engine over `resolver`, memoizing into `caches`.
    pub fn new(resolver: &'a dyn ManifestResolver, caches: SharedCaches, core: CoreConfig) -> Self {
        Self {
            resolver,
            caches,
            core,
        }
    }

    /// Discover the module whose manifest lives in `dir`.
    ///
    /// Returns `None` when the directory is not part of the module graph:
    /// no manifest (unless it is the root), or a dependency that does not
    /// opt into the ecosystem.
    pub fn discover(&self, dir: &NormalizedPath, kind: DiscoverKind) -> Result<Option<NodeId>> {
        let key = format!("resolve-module~{}!{}", dir, kind.tag());
        self.caches
            .modules
            .entries
            .get_or_else(&key, || self.create_node(dir, kind))
    }

    /// Discover the core module from its configured installation directory.
    pub fn discover_core(&self) -> Result<NodeId> {
        let dir = self
            .core
            .path
            .as_ref()
            .ok_or_else(|| Error::CoreModuleUnconfigured(self.core.name.clone()))?;
        let not_found = || Error::CoreModuleNotFound {
            name: self.core.name.clone(),
            path: dir.clone(),
        };

        let manifest = self.resolver.read_manifest(dir)?;
        if manifest.data.is_none() {
            return Err(not_found());
        }
        let resolved = self
            .resolve_module_package(manifest.path.as_str(), &manifest.path, dir)?
            .ok_or_else(not_found)?;
        let core_dir = resolved.parent().unwrap_or(resolved);
        self.discover(&core_dir, DiscoverKind::Core)?
            .ok_or_else(not_found)
    }

    fn create_node(&self, dir: &NormalizedPath, kind: DiscoverKind) -> Result<Option<NodeId>> {
        let file = self.resolver.read_manifest(dir)?;
        let is_root = kind == DiscoverKind::Root;

        let data = match file.data {
            Some(data) => data,
            None if is_root => {
                tracing::debug!("No manifest at project root {}", dir);
                Default::default()
            }
            None => return Ok(None),
        };

        let is_extension = match kind {
            DiscoverKind::Explicit | DiscoverKind::Core => true,
            DiscoverKind::Root | DiscoverKind::Dependency => data.is_extension(),
        };
        if !is_extension && !is_root {
            return Ok(None);
        }

        let name = match kind {
            DiscoverKind::Core => self.core.name.clone(),
            _ => data
                .module_name()
                .or_else(|| dir.file_name())
                .unwrap_or_default()
                .to_string(),
        };

        let node = ModuleNode {
            name,
            version: data.version.clone(),
            path: dir.clone(),
            is_extension,
            engine_requirement: data.engine_requirement().map(str::to_string),
            is_root,
            manifest_path: file.path,
            declared: data.merged_dependencies(is_root),
            expansion: Default::default(),
        };
        tracing::debug!("Discovered {} at {}", node.label(), node.path);

        Ok(Some(self.caches.modules.alloc(node)))
    }

    /// Resolve every declared dependency of `node`.
    fn expand(&self, node: &ModuleNode) -> Result<Expansion> {
        let mut expansion = Expansion::default();

        for identifier in node.declared.keys() {
            let Some(manifest) =
                self.resolve_module_package(identifier, &node.manifest_path, &node.path)?
            else {
                expansion.missing.push(identifier.clone());
                continue;
            };
            let dir = manifest.parent().unwrap_or(manifest);
            if let Some(id) = self.discover(&dir, DiscoverKind::Dependency)? {
                let name = self.node(id).name.clone();
                insert_dependency(&mut expansion.dependencies, Dependency { name, id });
            }
        }

        if node.is_root
            && !expansion
                .dependencies
                .iter()
                .any(|dep| dep.name == self.core.name)
        {
            let id = self.discover_core()?;
            insert_dependency(
                &mut expansion.dependencies,
                Dependency {
                    name: self.core.name.clone(),
                    id,
                },
            );
        }

        Ok(expansion)
    }

    /// Resolve an identifier to its manifest path; `None` when it cannot be found.
    fn resolve_module_package(
        &self,
        identifier: &str,
        parent: &NormalizedPath,
        parent_dir: &NormalizedPath,
    ) -> Result<Option<NormalizedPath>> {
        let key = format!("resolve-module-package~{identifier}!{parent}!{parent_dir}");
        self.caches.packages.get_or_else(&key, || {
            match self
                .resolver
                .resolve_identifier(identifier, parent, parent_dir)
            {
                Ok(path) => Ok(Some(path)),
                Err(e @ Error::ManifestNotFound { .. }) => {
                    tracing::debug!("Failed to resolve module package: {}", e);
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
    }
}

impl DependencySource for Discovery<'_> {
    fn node(&self, id: NodeId) -> Rc<ModuleNode> {
        self.caches.modules.node(id)
    }

    fn dependencies(&self, id: NodeId) -> Result<Vec<Dependency>> {
        let node = self.node(id);
        if let Some(expansion) = node.expansion.get() {
            return Ok(expansion.dependencies.clone());
        }

        let expansion = self.expand(&node)?;
        let dependencies = expansion.dependencies.clone();
        // expansion never re-enters itself for the same node
        let _ = node.expansion.set(expansion);
        Ok(dependencies)
    }
}
