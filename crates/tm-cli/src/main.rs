//! Tidemark CLI - versioned SQL migrations for DuckDB

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{current, down, latest, new, present, to, up};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.global);

    match &cli.command {
        Commands::New(args) => new::execute(args, &cli.global),
        Commands::Up => up::execute(&cli.global),
        Commands::Down => down::execute(&cli.global),
        Commands::To(args) => to::execute(args, &cli.global),
        Commands::Latest => latest::execute(&cli.global),
        Commands::Current => current::execute(&cli.global),
        Commands::Present => present::execute(&cli.global),
    }
}

/// `RUST_LOG` wins over the flags.
fn init_logging(global: &cli::GlobalArgs) {
    let level = if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
