//! Latest command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::{build_orchestrator, Access};

/// Execute the latest command
pub fn execute(global: &GlobalArgs) -> Result<()> {
    if let Some(latest) = build_orchestrator(global, Access::ReadOnly)?.latest()? {
        println!("{}", latest.version);
    }
    Ok(())
}
