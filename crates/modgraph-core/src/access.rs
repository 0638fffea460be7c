//! Position-based access control.
//!
//! A file may reference a module only if the package that contains it is the
//! module itself or declares the module as a direct dependency. Packages are
//! located in the pruned tree by directory, so every occurrence of a package
//! grants what any of its occurrences would.

use std::rc::Rc;

use modgraph_fs::NormalizedPath;

use crate::cache::SimpleCache;
use crate::error::Result;
use crate::resolver::ManifestResolver;
use crate::tree::{ModuleBranch, find_branches_by_path};

/// Answers whether a location may reference a module by name.
pub struct AccessController {
    tree: ModuleBranch,
    core_name: String,
    resolver: Rc<dyn ManifestResolver>,
    cache: SimpleCache<bool>,
}

impl AccessController {
    pub fn new(
        tree: ModuleBranch,
        core_name: impl Into<String>,
        resolver: Rc<dyn ManifestResolver>,
    ) -> Self {
        Self {
            tree,
            core_name: core_name.into(),
            resolver,
            cache: SimpleCache::new(),
        }
    }

    /// The pruned tree decisions are made against.
    pub fn tree(&self) -> &ModuleBranch {
        &self.tree
    }

    /// Whether code at `origin` may reference the module `name`.
    ///
    /// The core module is always accessible. When access is denied and
    /// `origin` is reached through a symbolic link, the resolved location is
    /// tried as well.
    pub fn can_access(&self, name: &str, origin: &NormalizedPath) -> Result<bool> {
        if name == self.core_name {
            return Ok(true);
        }

        let mut granted = self.cached_evaluate(name, origin)?;
        if !granted {
            let real = self.resolver.real_path(origin)?;
            if &real != origin {
                granted = self.evaluate(name, &real);
            }
        }

        tracing::debug!(
            "{} access to {} from {}",
            if granted { "granted" } else { "denied" },
            name,
            origin
        );
        Ok(granted)
    }

    fn cached_evaluate(&self, name: &str, origin: &NormalizedPath) -> Result<bool> {
        let nearest = self.resolver.find_nearest_manifest(origin);
        let key = format!(
            "{}!{}!{}",
            name,
            nearest.as_ref().map(NormalizedPath::as_str).unwrap_or_default(),
            origin
        );

        self.cache
            .get_or_else(&key, || Ok(nearest.is_some_and(|dir| self.is_visible_from(name, &dir))))
    }

    fn evaluate(&self, name: &str, origin: &NormalizedPath) -> bool {
        self.resolver
            .find_nearest_manifest(origin)
            .is_some_and(|dir| self.is_visible_from(name, &dir))
    }

    /// One hop: the package itself or one of its direct dependencies.
    fn is_visible_from(&self, name: &str, package_dir: &NormalizedPath) -> bool {
        find_branches_by_path(&self.tree, package_dir)
            .into_iter()
            .any(|branch| branch.name == name || branch.dependency(name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FsResolver;
    use modgraph_test_utils::TestProject;

    fn branch(name: &str, path: &NormalizedPath, deps: Vec<ModuleBranch>) -> ModuleBranch {
        ModuleBranch {
            name: name.to_string(),
            version: Some("1.0.0".to_string()),
            path: path.clone(),
            dependencies: (!deps.is_empty()).then_some(deps),
        }
    }

    fn controller(project: &TestProject) -> AccessController {
        let root = NormalizedPath::new(project.root());
        let a = root.join("node_modules/a");
        let b = root.join("node_modules/b");
        let c = root.join("node_modules/c");

        let tree = branch(
            "app",
            &root,
            vec![
                branch("a", &a, vec![branch("b", &b, vec![branch("c", &c, vec![])])]),
                branch("b", &b, vec![branch("c", &c, vec![])]),
            ],
        );
        AccessController::new(tree, "modgraph", Rc::new(FsResolver::new()))
    }

    fn layout() -> TestProject {
        let project = TestProject::new();
        project.root_package("app", &["a", "b"]);
        project.module("node_modules/a", "a", "1.0.0", None, &["b"]);
        project.module("node_modules/b", "b", "1.0.0", None, &["c"]);
        project.module("node_modules/c", "c", "1.0.0", None, &[]);
        project
    }

    #[test]
    fn test_core_is_always_accessible() {
        let project = layout();
        let access = controller(&project);
        let nowhere = NormalizedPath::new("/definitely/not/here");

        assert!(access.can_access("modgraph", &nowhere).unwrap());
    }

    #[test]
    fn test_one_hop_only() {
        let project = layout();
        let access = controller(&project);
        let root = NormalizedPath::new(project.root());
        let from_root = root.join("styles/main.scss");
        let from_a = root.join("node_modules/a/index.js");

        assert!(access.can_access("a", &from_root).unwrap());
        assert!(access.can_access("b", &from_root).unwrap());
        assert!(!access.can_access("c", &from_root).unwrap());

        assert!(access.can_access("a", &from_a).unwrap());
        assert!(access.can_access("b", &from_a).unwrap());
        assert!(!access.can_access("c", &from_a).unwrap());
    }

    #[test]
    fn test_results_are_cached_per_name() {
        let project = layout();
        let access = controller(&project);
        let origin = NormalizedPath::new(project.root()).join("index.js");

        assert!(access.can_access("a", &origin).unwrap());
        assert!(!access.can_access("c", &origin).unwrap());
        assert!(access.can_access("a", &origin).unwrap());
        assert_eq!(access.cache.len(), 2);
    }

    #[test]
    fn test_origin_outside_any_package_is_denied() {
        let project = layout();
        let access = controller(&project);
        let outside = NormalizedPath::new(project.core_dir()).join("../elsewhere/file.js");

        assert!(!access.can_access("a", &outside).unwrap());
    }
}
