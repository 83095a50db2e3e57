//! Current command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::{build_orchestrator, Access};

/// Execute the current command
pub fn execute(global: &GlobalArgs) -> Result<()> {
    if let Some(current) = build_orchestrator(global, Access::ReadOnly)?.current()? {
        println!("{}", current.version);
    }
    Ok(())
}
