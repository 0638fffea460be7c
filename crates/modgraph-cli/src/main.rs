//! modgraph CLI
//!
//! Inspect the extension module graph of a project: render it, list the
//! selected modules, report issues and check access.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Returns `false` when the command ran but reported a negative result.
fn run() -> Result<bool> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command else {
        println!("{} module graph inspector", "modgraph".green().bold());
        println!();
        println!("Run {} for available commands.", "modgraph --help".cyan());
        return Ok(true);
    };

    let session = context::load_session(&cli.dir, cli.config.as_deref())?;
    match command {
        Commands::Graph => commands::run_graph(&session)?,
        Commands::List => commands::run_list(&session)?,
        Commands::Issues { json } => commands::run_issues(&session, json)?,
        Commands::Access { name, origin } => {
            return commands::run_access(&session, &name, &origin);
        }
        Commands::Find { name } => commands::run_find(&session, &name)?,
    }
    Ok(true)
}
