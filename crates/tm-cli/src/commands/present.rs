//! Present command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::{build_orchestrator, Access};

/// Execute the present command
pub fn execute(global: &GlobalArgs) -> Result<()> {
    let present = build_orchestrator(global, Access::ReadOnly)?.present()?;
    let versions: Vec<String> = present.iter().map(|m| m.version.to_string()).collect();
    if !versions.is_empty() {
        println!("{}", versions.join(","));
    }
    Ok(())
}
