//! Shared test utilities for the modgraph workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`] builder for on-disk package layouts

pub mod project;

pub use project::TestProject;
