//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// modgraph - Inspect the extension module graph of a project
#[derive(Parser, Debug)]
#[command(name = "modgraph")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to modgraph.toml in the project)
    #[arg(short, long, global = true, env = "MODGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory inside the project to resolve from
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub dir: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the resolved module tree
    Graph,

    /// List the selected version of every module
    List,

    /// Report version conflicts, missing dependencies and engine problems
    ///
    /// Always exits successfully; the report is informational.
    Issues {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Check whether a file may reference a module
    ///
    /// Exits with status 1 when access is denied.
    ///
    /// Examples:
    ///   modgraph access theme src/main.scss
    ///   modgraph access theme node_modules/widgets/index.scss
    Access {
        /// Module name
        name: String,

        /// File or directory doing the referencing
        origin: PathBuf,
    },

    /// Print the directory of the selected module
    Find {
        /// Module name
        name: String,
    },
}
