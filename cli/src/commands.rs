pub mod formula;
pub mod normalize;
pub mod solve;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "camels-tools")]
#[command(about = "Market-clearing solver and data store maintenance for the simulation.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Solve a market system read from a JSON file and print the allocation
    Solve {
        /// `{ "pool": .., "formulation": .., "goods": [..] }`
        input: PathBuf,
    },
    /// Print the closed-form surplus split for N goods
    Formula {
        goods: usize,
    },
    /// Run the normalization pass over a SQLite store
    Normalize {
        database: PathBuf,
        /// JSON file overriding the default pass settings
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// How missing frequency rows are found
        #[arg(long, value_enum)]
        backfill: Option<Backfill>,
        /// Leave reversed route rows in place
        #[arg(long)]
        no_dedupe_routes: bool,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum Backfill {
    GapScan,
    SetDifference,
}

impl From<Backfill> for ::normalize::BackfillStrategy {
    fn from(b: Backfill) -> Self {
        match b {
            Backfill::GapScan => ::normalize::BackfillStrategy::GapScan,
            Backfill::SetDifference => ::normalize::BackfillStrategy::SetDifference,
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_flags_parse() {
        let cli = CommandLine::try_parse_from([
            "camels-tools",
            "normalize",
            "world.db",
            "--backfill",
            "set-difference",
            "--no-dedupe-routes",
        ])
        .unwrap();
        let Commands::Normalize {
            database,
            config,
            backfill,
            no_dedupe_routes,
        } = cli.command
        else {
            panic!("expected normalize");
        };
        assert_eq!(database, PathBuf::from("world.db"));
        assert!(config.is_none());
        assert!(matches!(backfill, Some(Backfill::SetDifference)));
        assert!(no_dedupe_routes);
    }

    #[test]
    fn formula_needs_a_count() {
        assert!(CommandLine::try_parse_from(["camels-tools", "formula"]).is_err());
        let cli = CommandLine::try_parse_from(["camels-tools", "-v", "formula", "3"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Formula { goods: 3 }));
    }
}
