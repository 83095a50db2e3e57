//! To command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, ToArgs};
use crate::commands::common::{build_orchestrator, status, Access};

/// Execute the to command
pub fn execute(args: &ToArgs, global: &GlobalArgs) -> Result<()> {
    let orchestrator = build_orchestrator(global, Access::ReadWrite)?;
    let after = orchestrator.applied_after(args.version)?;

    if after.is_empty() {
        status!(global, "Already at {}", args.version);
        return Ok(());
    }

    // Newest first, so each down script sees the schema it was written for.
    for migration in after.iter().rev() {
        status!(global, "Reverting: {}...", migration.version);
        orchestrator.revert(migration)?;
    }
    Ok(())
}
