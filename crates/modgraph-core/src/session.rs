//! One resolution run over a project.
//!
//! [`ModuleSession`] drives discovery, flattening, deduplication, engine
//! checks and pruning once, then answers lookups and access checks against
//! the result.

use std::fmt;
use std::rc::Rc;

use modgraph_fs::NormalizedPath;

use crate::access::AccessController;
use crate::cache::SharedCaches;
use crate::config::ModgraphConfig;
use crate::dedupe::{ModuleCollection, ModuleMap, check_engines, dedupe, flatten};
use crate::discovery::{DependencySource, DiscoverKind, Discovery};
use crate::error::{Error, Result};
use crate::issues::IssueSet;
use crate::node::{Dependency, ModuleNode, NodeId, insert_dependency};
use crate::resolver::{FsResolver, ManifestResolver};
use crate::tree::{ModuleBranch, ROOT_NAME, prune};
use crate::version::{SemverComparator, VersionComparator};

/// Inputs to [`ModuleSession::new`] beyond the project directory.
pub struct SessionOptions {
    pub config: ModgraphConfig,
    /// Caches to reuse; a private set is created when `None`.
    pub caches: Option<SharedCaches>,
    pub comparator: Box<dyn VersionComparator>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            config: ModgraphConfig::default(),
            caches: None,
            comparator: Box::new(SemverComparator),
        }
    }
}

impl SessionOptions {
    pub fn with_config(mut self, config: ModgraphConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_caches(mut self, caches: SharedCaches) -> Self {
        self.caches = Some(caches);
        self
    }

    pub fn with_comparator(mut self, comparator: impl VersionComparator + 'static) -> Self {
        self.comparator = Box::new(comparator);
        self
    }

    /// Attach an extra module directory to the project root.
    pub fn with_module(mut self, dir: impl Into<NormalizedPath>) -> Self {
        self.config.modules.push(dir.into());
        self
    }
}

/// The discovered tree with explicit modules grafted onto the root.
struct RawTree<'a> {
    discovery: &'a Discovery<'a>,
    root: NodeId,
    explicit: Vec<Dependency>,
}

impl DependencySource for RawTree<'_> {
    fn node(&self, id: NodeId) -> Rc<ModuleNode> {
        self.discovery.node(id)
    }

    fn dependencies(&self, id: NodeId) -> Result<Vec<Dependency>> {
        let mut dependencies = self.discovery.dependencies(id)?;
        if id == self.root {
            for dependency in &self.explicit {
                insert_dependency(&mut dependencies, dependency.clone());
            }
        }
        Ok(dependencies)
    }
}

/// The resolved module graph of one project.
pub struct ModuleSession {
    root: Rc<ModuleNode>,
    core_name: String,
    collection: ModuleCollection,
    modules: ModuleMap,
    issues: IssueSet,
    access: AccessController,
}

impl fmt::Debug for ModuleSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSession")
            .field("root", &self.root.path)
            .field("modules", &self.modules.len())
            .field("issues", &self.issues.len())
            .finish()
    }
}

impl ModuleSession {
    /// Resolve the project containing `dir` with the default filesystem resolver.
    pub fn open(dir: impl Into<NormalizedPath>, config: ModgraphConfig) -> Result<Self> {
        let resolver = Rc::new(FsResolver::from_config(&config));
        Self::new(dir, resolver, SessionOptions::default().with_config(config))
    }

    /// Resolve the project whose nearest manifest is at or above `dir`.
    pub fn new(
        dir: impl Into<NormalizedPath>,
        resolver: Rc<dyn ManifestResolver>,
        options: SessionOptions,
    ) -> Result<Self> {
        let dir = dir.into();
        let root_dir = resolver.find_nearest_manifest(&dir).unwrap_or(dir);
        let SessionOptions {
            config,
            caches,
            comparator,
        } = options;

        let discovery = Discovery::new(
            &*resolver,
            caches.unwrap_or_default(),
            config.core.clone(),
        );
        let root = discovery
            .discover(&root_dir, DiscoverKind::Root)?
            .ok_or_else(|| Error::ManifestNotFound {
                identifier: root_dir.to_string(),
                from: root_dir.clone(),
            })?;

        let mut explicit = Vec::new();
        for module_dir in &config.modules {
            match discovery.discover(module_dir, DiscoverKind::Explicit)? {
                Some(id) => explicit.push(Dependency {
                    name: discovery.node(id).name.clone(),
                    id,
                }),
                None => tracing::warn!("Explicit module {} has no manifest", module_dir),
            }
        }
        let raw = RawTree {
            discovery: &discovery,
            root,
            explicit,
        };

        let flattened = flatten(&raw, root)?;
        let mut issues = IssueSet {
            missing_dependencies: flattened.missing,
            ..IssueSet::default()
        };
        let modules = dedupe(&flattened.collection, &*comparator, &mut issues);
        check_engines(&modules, &config.core.name, &*comparator, &mut issues);
        let tree = prune(&raw, root, &modules)?;

        let session = Self {
            root: raw.node(root),
            core_name: config.core.name.clone(),
            collection: flattened.collection,
            modules,
            issues,
            access: AccessController::new(tree, config.core.name, Rc::clone(&resolver)),
        };
        tracing::debug!(
            "discovered modules\n\t{}",
            session.render_graph().trim_end().replace('\n', "\n\t")
        );
        Ok(session)
    }

    /// Name of the project root package.
    pub fn project_name(&self) -> &str {
        &self.root.name
    }

    /// Directory of the project root package.
    pub fn root_dir(&self) -> &NormalizedPath {
        &self.root.path
    }

    /// `:root(<project name>)`, or `:root` for an unnamed project.
    pub fn decorated_root_name(&self) -> String {
        if self.root.name.is_empty() {
            ROOT_NAME.to_string()
        } else {
            format!("{}({})", ROOT_NAME, self.root.name)
        }
    }

    /// Every occurrence of every extension module, before deduplication.
    pub fn collection(&self) -> &ModuleCollection {
        &self.collection
    }

    /// The canonical module registry.
    pub fn modules(&self) -> &ModuleMap {
        &self.modules
    }

    /// Selected modules in discovery order.
    pub fn list(&self) -> impl Iterator<Item = &ModuleNode> {
        self.modules.iter()
    }

    /// The pruned tree.
    pub fn tree(&self) -> &ModuleBranch {
        self.access.tree()
    }

    /// The selected core module.
    pub fn core(&self) -> Option<&ModuleNode> {
        self.modules.get(&self.core_name)
    }

    pub fn issues(&self) -> &IssueSet {
        &self.issues
    }

    /// The selected module named `name`, regardless of access.
    pub fn find(&self, name: &str) -> Option<&ModuleNode> {
        self.modules.get(name)
    }

    /// Whether code at `origin` may reference `name`.
    pub fn can_access(&self, name: &str, origin: &NormalizedPath) -> Result<bool> {
        self.access.can_access(name, origin)
    }

    /// The selected module named `name`, if it exists and `origin` may reference it.
    pub fn access(&self, name: &str, origin: &NormalizedPath) -> Result<Option<&ModuleNode>> {
        let Some(module) = self.find(name) else {
            return Ok(None);
        };
        Ok(self.can_access(name, origin)?.then_some(module))
    }

    /// Archy-style rendering of the pruned tree.
    pub fn render_graph(&self) -> String {
        self.tree().render(&self.decorated_root_name())
    }

    /// Run `hook` for every selected module in list order.
    ///
    /// Stops at the first failure, reported as [`Error::ModuleInit`].
    pub fn init<H, E, R>(
        &self,
        host: &H,
        engine: &E,
        mut hook: impl FnMut(&ModuleNode, &H, &E) -> std::result::Result<(), R>,
    ) -> Result<()>
    where
        H: ?Sized,
        E: ?Sized,
        R: fmt::Display,
    {
        for module in self.list() {
            tracing::debug!("Initializing {}", module.label());
            hook(module, host, engine).map_err(|e| Error::ModuleInit {
                name: module.name.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}
