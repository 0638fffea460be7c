//! Find command

use modgraph_core::ModuleSession;

use crate::error::{CliError, Result};

/// Run the find command
pub fn run_find(session: &ModuleSession, name: &str) -> Result<()> {
    let module = session
        .find(name)
        .ok_or_else(|| CliError::user(format!("Module '{name}' not found")))?;
    println!("{}", module.path);
    Ok(())
}
