//! Memoizing caches used during discovery.
//!
//! Caches are populate-once and never invalidated. They are cheap handles:
//! cloning a cache shares its storage, which is how several sessions reuse
//! the same discovery work (see [`SharedCaches`]).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use modgraph_fs::NormalizedPath;

use crate::node::{ModuleArena, ModuleNode, NodeId};

/// A string-keyed memoization table.
#[derive(Debug)]
pub struct SimpleCache<T> {
    entries: Rc<RefCell<HashMap<String, T>>>,
}

impl<T> Default for SimpleCache<T> {
    fn default() -> Self {
        Self {
            entries: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl<T> Clone for SimpleCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}

impl<T: Clone> SimpleCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`.
    pub fn get(&self, key: &str) -> Option<T> {
        self.entries.borrow().get(key).cloned()
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// Failures are not cached. `compute` may itself use the cache.
    pub fn get_or_else<E>(&self, key: &str, compute: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = compute()?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        Ok(value)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Discovered modules keyed by `(path, kind)`, together with the arena that
/// owns them.
#[derive(Debug, Clone, Default)]
pub struct ModuleCache {
    pub(crate) entries: SimpleCache<Option<NodeId>>,
    arena: Rc<RefCell<ModuleArena>>,
}

impl ModuleCache {
    /// Create an empty module cache.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc(&self, node: ModuleNode) -> NodeId {
        self.arena.borrow_mut().alloc(node)
    }

    /// Shared handle to a cached node.
    pub fn node(&self, id: NodeId) -> Rc<ModuleNode> {
        self.arena.borrow().get(id)
    }

    /// Number of nodes discovered so far.
    pub fn node_count(&self) -> usize {
        self.arena.borrow().len()
    }
}

/// Manifest paths keyed by `(identifier, requester manifest, requester dir)`.
///
/// `None` records an identifier that failed to resolve.
pub type PackageCache = SimpleCache<Option<NormalizedPath>>;

/// The caches a resolution session uses.
///
/// Pass a clone of the same value to several sessions to share discovery
/// work between them; by default each session gets a private instance.
#[derive(Debug, Clone, Default)]
pub struct SharedCaches {
    pub modules: ModuleCache,
    pub packages: PackageCache,
}

impl SharedCaches {
    /// Create a fresh, empty set of caches.
    pub fn new() -> Self {
        Self::default()
    }
}
