//! Discovered module nodes.
//!
//! Nodes live in a [`ModuleArena`] and refer to each other by [`NodeId`].
//! A node's dependency list is filled lazily, exactly once, by the discovery
//! engine; until then the node reports itself as unexpanded.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use modgraph_fs::NormalizedPath;
use serde::Serialize;

/// Index of a node inside a [`ModuleArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A resolved dependency edge, keyed by the dependency's module name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub id: NodeId,
}

/// Insert `dependency`, replacing an existing entry of the same name in place.
pub(crate) fn insert_dependency(dependencies: &mut Vec<Dependency>, dependency: Dependency) {
    match dependencies.iter_mut().find(|d| d.name == dependency.name) {
        Some(existing) => *existing = dependency,
        None => dependencies.push(dependency),
    }
}

/// Result of expanding a node's declared dependencies.
#[derive(Debug, Default)]
pub(crate) struct Expansion {
    pub(crate) dependencies: Vec<Dependency>,
    /// Identifiers that could not be resolved to a manifest.
    pub(crate) missing: Vec<String>,
}

/// One occurrence of a module at one path.
#[derive(Debug, Serialize)]
pub struct ModuleNode {
    /// Module name.
    pub name: String,
    /// Declared version, if any.
    pub version: Option<String>,
    /// Directory containing the module's manifest.
    pub path: NormalizedPath,
    /// Whether the package opts into the module ecosystem.
    pub is_extension: bool,
    /// Range of core module versions this module requires.
    pub engine_requirement: Option<String>,
    #[serde(skip)]
    pub(crate) is_root: bool,
    #[serde(skip)]
    pub(crate) manifest_path: NormalizedPath,
    /// Identifier to range, in expansion order.
    #[serde(skip)]
    pub(crate) declared: BTreeMap<String, String>,
    #[serde(skip)]
    pub(crate) expansion: OnceCell<Expansion>,
}

impl ModuleNode {
    /// Create a non-extension node with no declared dependencies.
    pub fn new(name: impl Into<String>, path: impl Into<NormalizedPath>) -> Self {
        let path = path.into();
        Self {
            name: name.into(),
            version: None,
            manifest_path: path.clone(),
            path,
            is_extension: false,
            engine_requirement: None,
            is_root: false,
            declared: BTreeMap::new(),
            expansion: OnceCell::new(),
        }
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Mark the node as an extension module.
    pub fn as_extension(mut self) -> Self {
        self.is_extension = true;
        self
    }

    /// Set the engine requirement.
    pub fn with_engine_requirement(mut self, range: impl Into<String>) -> Self {
        self.engine_requirement = Some(range.into());
        self
    }

    /// `name@version`, or just the name when unversioned.
    pub fn label(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }

    /// Whether dependency expansion has run for this node.
    pub fn is_expanded(&self) -> bool {
        self.expansion.get().is_some()
    }

    /// Expanded dependencies; `None` if unexpanded or expanded to nothing.
    pub fn dependencies(&self) -> Option<&[Dependency]> {
        self.expansion
            .get()
            .map(|expansion| expansion.dependencies.as_slice())
            .filter(|deps| !deps.is_empty())
    }

    /// Identifiers this node declared but that could not be resolved.
    pub fn missing(&self) -> &[String] {
        self.expansion
            .get()
            .map(|expansion| expansion.missing.as_slice())
            .unwrap_or_default()
    }
}

/// Append-only storage for nodes.
#[derive(Debug, Default)]
pub struct ModuleArena {
    nodes: Vec<Rc<ModuleNode>>,
}

impl ModuleArena {
    /// Store a node and return its id.
    pub fn alloc(&mut self, node: ModuleNode) -> NodeId {
        self.nodes.push(Rc::new(node));
        NodeId(self.nodes.len() - 1)
    }

    /// Shared handle to a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this arena.
    pub fn get(&self, id: NodeId) -> Rc<ModuleNode> {
        Rc::clone(&self.nodes[id.0])
    }

    /// Number of nodes stored.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        let node = ModuleNode::new("a", "/p/a").with_version("1.0.0");
        assert_eq!(node.label(), "a@1.0.0");
        assert_eq!(ModuleNode::new("root", "/p").label(), "root");
    }

    #[test]
    fn test_unexpanded_vs_expanded_empty() {
        let node = ModuleNode::new("a", "/p/a");
        assert!(!node.is_expanded());
        assert!(node.dependencies().is_none());

        node.expansion.set(Expansion::default()).unwrap();
        assert!(node.is_expanded());
        assert!(node.dependencies().is_none());
        assert!(node.missing().is_empty());
    }

    #[test]
    fn test_insert_dependency_replaces_in_place() {
        let mut arena = ModuleArena::default();
        let a = arena.alloc(ModuleNode::new("a", "/p/a"));
        let b = arena.alloc(ModuleNode::new("b", "/p/b"));
        let a2 = arena.alloc(ModuleNode::new("a", "/q/a"));

        let mut deps = Vec::new();
        insert_dependency(&mut deps, Dependency { name: "a".into(), id: a });
        insert_dependency(&mut deps, Dependency { name: "b".into(), id: b });
        insert_dependency(&mut deps, Dependency { name: "a".into(), id: a2 });

        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].id, a2);
        assert_eq!(deps[1].id, b);
        assert_eq!(arena.len(), 3);
    }
}
