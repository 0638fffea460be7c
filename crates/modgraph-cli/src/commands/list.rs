//! List command

use colored::Colorize;
use modgraph_core::ModuleSession;

use crate::error::Result;

/// Run the list command
pub fn run_list(session: &ModuleSession) -> Result<()> {
    for module in session.list() {
        println!(
            "{:<32} {}",
            module.label().green(),
            module.path.as_str().dimmed()
        );
    }
    Ok(())
}
