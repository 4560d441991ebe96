use std::collections::{BTreeSet, HashSet};

use rusqlite::{Connection, params};

use crate::config::BackfillStrategy;
use crate::error::StoreResult;

/// Every (business, mode) pair, modes numbered `1..=businesses.modes`.
fn business_modes(conn: &Connection) -> StoreResult<Vec<(i64, i64)>> {
    let mut stmt = conn.prepare("SELECT business_id, modes FROM businesses ORDER BY business_id")?;
    let businesses = stmt
        .query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(businesses
        .into_iter()
        .flat_map(|(business, modes)| (1..=modes).map(move |mode| (business, mode)))
        .collect())
}

fn insert_zero(conn: &Connection, nation: i64, business: i64, mode: i64) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO frequencies VALUES (?1, ?2, ?3, ?4)",
        params![nation, business, mode, 0.0],
    )?;
    Ok(())
}

/// Drop every (nation, business, mode) row past the first stored one.
fn remove_duplicates(conn: &Connection) -> StoreResult<usize> {
    let removed = conn.execute(
        "DELETE FROM frequencies WHERE rowid NOT IN (
             SELECT MIN(rowid) FROM frequencies GROUP BY nation_id, business_id, mode
         )",
        [],
    )?;
    Ok(removed)
}

/// Leave exactly one `frequencies` row per (nation, business, mode) for
/// nations `1..=nation_count`: duplicate keys keep their first row, and
/// missing keys get a zero-frequency row. Returns the number inserted.
pub fn backfill_frequencies(
    conn: &Connection,
    strategy: BackfillStrategy,
    nation_count: i64,
) -> StoreResult<usize> {
    let duplicates = remove_duplicates(conn)?;
    let inserted = match strategy {
        BackfillStrategy::GapScan => gap_scan(conn, nation_count)?,
        BackfillStrategy::SetDifference => set_difference(conn, nation_count)?,
    };

    tracing::info!(
        target: "normalize",
        step = "backfill",
        table = "frequencies",
        strategy = ?strategy,
        rows = inserted as u64,
        duplicates = duplicates as u64,
    );
    Ok(inserted)
}

fn gap_scan(conn: &Connection, nation_count: i64) -> StoreResult<usize> {
    let mut inserted = 0;
    let mut present_stmt =
        conn.prepare("SELECT nation_id FROM frequencies WHERE business_id = ?1 AND mode = ?2")?;
    for (business, mode) in business_modes(conn)? {
        let present = present_stmt
            .query_map(params![business, mode], |r| r.get::<_, i64>(0))?
            .collect::<rusqlite::Result<HashSet<_>>>()?;
        for nation in (1..=nation_count).filter(|n| !present.contains(n)) {
            insert_zero(conn, nation, business, mode)?;
            inserted += 1;
        }
    }
    Ok(inserted)
}

fn set_difference(conn: &Connection, nation_count: i64) -> StoreResult<usize> {
    let expected: BTreeSet<(i64, i64, i64)> = business_modes(conn)?
        .into_iter()
        .flat_map(|(business, mode)| (1..=nation_count).map(move |n| (n, business, mode)))
        .collect();
    let present = conn
        .prepare("SELECT nation_id, business_id, mode FROM frequencies")?
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
        .collect::<rusqlite::Result<BTreeSet<(i64, i64, i64)>>>()?;

    let mut inserted = 0;
    for &(nation, business, mode) in expected.difference(&present) {
        insert_zero(conn, nation, business, mode)?;
        inserted += 1;
    }
    Ok(inserted)
}
