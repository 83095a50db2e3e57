//! Down command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::{build_orchestrator, status, Access};

/// Execute the down command
pub fn execute(global: &GlobalArgs) -> Result<()> {
    let orchestrator = build_orchestrator(global, Access::ReadWrite)?;

    let Some(migration) = orchestrator.current()? else {
        status!(global, "No migrations to revert");
        return Ok(());
    };

    status!(global, "Reverting: {}...", migration.version);
    orchestrator.revert(&migration)?;
    Ok(())
}
