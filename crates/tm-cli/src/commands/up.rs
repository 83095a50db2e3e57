//! Up command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::{build_orchestrator, status, Access};

/// Execute the up command
pub fn execute(global: &GlobalArgs) -> Result<()> {
    let orchestrator = build_orchestrator(global, Access::ReadWrite)?;
    let unapplied = orchestrator.unapplied()?;

    if unapplied.is_empty() {
        status!(global, "No migrations to apply");
        return Ok(());
    }

    for migration in unapplied.iter() {
        status!(global, "Applying: {}...", migration.version);
        orchestrator.apply(migration)?;
    }
    Ok(())
}
