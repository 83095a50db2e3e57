//! New command implementation

use anyhow::{bail, Context, Result};
use std::fs;
use tm_core::{Migration, SystemClock, DOWN_FILE, UP_FILE};

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::{load_config, migrations_dir, status};

/// Execute the new command
pub fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let src = migrations_dir(global, &config);
    if !src.is_dir() {
        bail!("Migrations directory {} does not exist", src.display());
    }

    let migration = Migration::generate(&args.name.join("_"), &SystemClock)
        .context("Invalid migration name")?;
    let dir = src.join(&migration.path);

    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    for file in [UP_FILE, DOWN_FILE] {
        let path = dir.join(file);
        fs::write(&path, "").with_context(|| format!("Failed to create {}", path.display()))?;
    }

    status!(global, "Created {}", dir.display());
    Ok(())
}
