//! Access command

use std::path::Path;

use colored::Colorize;
use modgraph_core::ModuleSession;
use modgraph_fs::NormalizedPath;

use crate::error::Result;

/// Run the access command, returning whether access was granted
pub fn run_access(session: &ModuleSession, name: &str, origin: &Path) -> Result<bool> {
    let origin = NormalizedPath::new(std::path::absolute(origin)?);
    let granted = session.can_access(name, &origin)?;

    if granted {
        println!("{}", "granted".green().bold());
    } else {
        println!("{}", "denied".red().bold());
    }
    Ok(granted)
}
