use anyhow::Result;
use commands::{CommandLine, Commands};
use tracing_subscriber::EnvFilter;

mod commands;

fn main() -> Result<()> {
    let cli = CommandLine::parse_args();

    // stdout carries JSON only.
    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Solve { input } => commands::solve::run(&input),
        Commands::Formula { goods } => commands::formula::run(goods),
        Commands::Normalize {
            database,
            config,
            backfill,
            no_dedupe_routes,
        } => commands::normalize::run(&database, config.as_deref(), backfill, no_dedupe_routes),
    }
}
