//! Graph command

use modgraph_core::ModuleSession;

use crate::error::Result;

/// Run the graph command
pub fn run_graph(session: &ModuleSession) -> Result<()> {
    print!("{}", session.render_graph());
    Ok(())
}
