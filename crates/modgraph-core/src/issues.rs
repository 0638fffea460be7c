//! Diagnostics accumulated while resolving a module graph.
//!
//! None of these are fatal; the caller decides what to do with them.

use std::rc::Rc;

use serde::Serialize;

use crate::node::ModuleNode;

/// A request for a version that the selected version is not compatible with.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyVersionIssue {
    pub name: String,
    /// The occurrence that lost deduplication.
    pub requested: Rc<ModuleNode>,
    /// The occurrence that was selected.
    pub selected: Rc<ModuleNode>,
}

/// Everything that went wrong, short of an I/O failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueSet {
    /// Losing versions outside the winner's caret range.
    pub dependency_versions: Vec<DependencyVersionIssue>,
    /// Declared identifiers that could not be resolved to a manifest.
    pub missing_dependencies: Vec<String>,
    /// Selected modules without an engine requirement.
    pub missing_engine: Vec<Rc<ModuleNode>>,
    /// Selected modules whose engine requirement the core module does not satisfy.
    pub incompatible_engine: Vec<Rc<ModuleNode>>,
}

impl IssueSet {
    /// Whether no issue of any kind was recorded.
    pub fn is_empty(&self) -> bool {
        self.dependency_versions.is_empty()
            && self.missing_dependencies.is_empty()
            && self.missing_engine.is_empty()
            && self.incompatible_engine.is_empty()
    }

    /// Total number of recorded issues.
    pub fn len(&self) -> usize {
        self.dependency_versions.len()
            + self.missing_dependencies.len()
            + self.missing_engine.len()
            + self.incompatible_engine.len()
    }
}
