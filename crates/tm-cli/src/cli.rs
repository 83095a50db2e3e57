//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use tm_core::Version;

/// Tidemark - apply and revert versioned SQL migrations
#[derive(Parser, Debug)]
#[command(name = "tidemark")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Database location (DuckDB file, `duckdb://<path>` or `:memory:`)
    #[arg(short, long, global = true, env = "DATABASE_URL")]
    pub url: Option<String>,

    /// Folder with migrations (default: `migrations_dir` from tidemark.yml)
    #[arg(short, long, global = true, env = "DATABASE_SRC")]
    pub src: Option<String>,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Output only errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new migration folder
    New(NewArgs),

    /// Apply new migrations
    Up,

    /// Revert the last applied migration
    Down,

    /// Revert every migration applied after a version
    To(ToArgs),

    /// Latest migration in the source
    Latest,

    /// Latest applied migration
    Current,

    /// List all present versions
    Present,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Migration name; multiple words are joined with underscores
    #[arg(required = true, num_args = 1..)]
    pub name: Vec<String>,
}

/// Arguments for the to command
#[derive(Args, Debug)]
pub struct ToArgs {
    /// Version to migrate down to; it stays applied
    pub version: Version,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
