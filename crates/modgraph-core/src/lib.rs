//! Extension module graph resolution for modgraph.
//!
//! Given a project directory, this crate discovers every package that opts
//! into the module ecosystem, selects one version per module name, reports
//! version and engine problems, and decides which modules a given file may
//! reference.
//!
//! # Pipeline
//!
//! - [`Discovery`] expands the project into a raw tree of [`ModuleNode`]s.
//! - [`dedupe::flatten`] and [`dedupe::dedupe`] group the tree by name and
//!   select the highest version of each.
//! - [`tree::prune`] rewrites the raw tree against the selection.
//! - [`AccessController`] answers access checks against the pruned tree.
//!
//! [`ModuleSession`] runs all of it.
//!
//! # Example
//!
//! ```no_run
//! use modgraph_core::{ModgraphConfig, ModuleSession};
//!
//! let config = ModgraphConfig::discover(&"/path/to/project".into())?;
//! let session = ModuleSession::open("/path/to/project", config)?;
//! println!("{}", session.render_graph());
//! # Ok::<(), modgraph_core::Error>(())
//! ```

pub mod access;
pub mod cache;
pub mod config;
pub mod dedupe;
pub mod discovery;
pub mod error;
pub mod issues;
pub mod manifest;
pub mod node;
pub mod resolver;
pub mod session;
pub mod tree;
pub mod version;

pub use access::AccessController;
pub use cache::{ModuleCache, PackageCache, SharedCaches, SimpleCache};
pub use config::{CONFIG_FILENAME, CoreConfig, ModgraphConfig};
pub use dedupe::{ModuleCollection, ModuleMap};
pub use discovery::{DependencySource, DiscoverKind, Discovery};
pub use error::{Error, Result};
pub use issues::{DependencyVersionIssue, IssueSet};
pub use manifest::{ManifestFile, ModuleDeclaration, PackageManifest};
pub use node::{Dependency, ModuleNode, NodeId};
pub use resolver::{FsResolver, ManifestResolver};
pub use session::{ModuleSession, SessionOptions};
pub use tree::ModuleBranch;
pub use version::{SemverComparator, VersionComparator, VersionRange};
