use std::fs;
use std::path::Path;

use anyhow::{Context, ensure};
use ::normalize::{NormalizeConfig, Store};

use super::Backfill;

pub fn run(
    database: &Path,
    config: Option<&Path>,
    backfill: Option<Backfill>,
    no_dedupe_routes: bool,
) -> anyhow::Result<()> {
    // Opening a missing path would silently create an empty store.
    ensure!(database.exists(), "no database at {}", database.display());

    let mut cfg = match config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<NormalizeConfig>(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => NormalizeConfig::default(),
    };
    if let Some(backfill) = backfill {
        cfg.backfill = backfill.into();
    }
    if no_dedupe_routes {
        cfg.dedupe_routes = false;
    }

    let mut store = Store::open(database)
        .with_context(|| format!("opening {}", database.display()))?;
    let report = store
        .run_pass(&cfg)
        .with_context(|| format!("normalizing {}; nothing was changed", database.display()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
