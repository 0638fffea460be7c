//! Command implementations for modgraph-cli

pub mod access;
pub mod find;
pub mod graph;
pub mod issues;
pub mod list;

pub use access::run_access;
pub use find::run_find;
pub use graph::run_graph;
pub use issues::run_issues;
pub use list::run_list;
