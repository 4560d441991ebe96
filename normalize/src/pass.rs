use rusqlite::Connection;
use serde::Serialize;

use crate::backfill::backfill_frequencies;
use crate::config::NormalizeConfig;
use crate::error::StoreResult;
use crate::livestock::rescale_livestock;
use crate::routes::dedupe_routes;
use crate::table::{Table, reindex_towns, sort_table};

/// Row counts touched by each step of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub consumption_sorted: usize,
    pub inputs_sorted: usize,
    pub outputs_sorted: usize,
    pub frequencies_backfilled: usize,
    pub frequencies_sorted: usize,
    pub towns_reindexed: usize,
    pub names_sorted: usize,
    pub livestock_rescaled: usize,
    /// `None` when route de-duplication is disabled.
    pub routes_removed: Option<usize>,
}

/// Run every normalization step inside one transaction.
///
/// Any failure rolls the whole pass back. The pass is not idempotent: the
/// livestock rescale compounds on each run.
pub fn run_pass(conn: &mut Connection, cfg: &NormalizeConfig) -> StoreResult<PassReport> {
    cfg.validate()?;
    let tx = conn.transaction()?;

    let mut report = PassReport {
        consumption_sorted: sort_table(&tx, Table::Consumption)?,
        inputs_sorted: sort_table(&tx, Table::Inputs)?,
        outputs_sorted: sort_table(&tx, Table::Outputs)?,
        frequencies_backfilled: backfill_frequencies(&tx, cfg.backfill, cfg.nation_count)?,
        ..Default::default()
    };
    report.frequencies_sorted = sort_table(&tx, Table::Frequencies)?;
    report.towns_reindexed = reindex_towns(&tx, cfg.fixed_towns)?;
    report.names_sorted = sort_table(&tx, Table::Names)?;
    report.livestock_rescaled = rescale_livestock(&tx, cfg)?;
    if cfg.dedupe_routes {
        report.routes_removed = Some(dedupe_routes(&tx)?);
    }

    tx.commit()?;
    tracing::info!(target: "normalize", step = "commit", report = ?report);
    Ok(report)
}
