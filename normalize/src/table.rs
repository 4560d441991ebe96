use rusqlite::types::Value;
use rusqlite::{Connection, Params, params_from_iter};

use crate::error::StoreResult;

/// Tables rewritten in sorted order by the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Consumption,
    Inputs,
    Outputs,
    Frequencies,
    Names,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Consumption => "consumption",
            Table::Inputs => "inputs",
            Table::Outputs => "outputs",
            Table::Frequencies => "frequencies",
            Table::Names => "names",
        }
    }

    pub fn sort_key(self) -> &'static str {
        match self {
            Table::Consumption => "nation_id, good_id, material_id",
            Table::Inputs | Table::Outputs => "business_id, mode, good_id",
            Table::Frequencies => "nation_id, business_id, mode",
            Table::Names => "nation_id",
        }
    }
}

pub(crate) type RawRow = Vec<Value>;

/// Read every column of every row `sql` returns.
pub(crate) fn read_rows<P: Params>(conn: &Connection, sql: &str, params: P) -> StoreResult<Vec<RawRow>> {
    let mut stmt = conn.prepare(sql)?;
    let width = stmt.column_count();
    let rows = stmt
        .query_map(params, |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<RawRow>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Append rows to `table` in the given order.
pub(crate) fn insert_rows(conn: &Connection, table: &str, rows: &[RawRow]) -> StoreResult<usize> {
    let Some(width) = rows.first().map(Vec::len) else {
        return Ok(0);
    };
    let placeholders = (1..=width)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = conn.prepare(&format!("INSERT INTO {table} VALUES ({placeholders})"))?;
    for row in rows {
        stmt.execute(params_from_iter(row.iter()))?;
    }
    Ok(rows.len())
}

/// Rewrite `table` so its physical row order follows its sort key.
///
/// Reads everything, deletes everything, re-inserts in order. Column layout
/// is taken from the table itself.
pub fn sort_table(conn: &Connection, table: Table) -> StoreResult<usize> {
    let rows = read_rows(
        conn,
        &format!("SELECT * FROM {} ORDER BY {}", table.name(), table.sort_key()),
        [],
    )?;
    conn.execute(&format!("DELETE FROM {}", table.name()), [])?;
    let written = insert_rows(conn, table.name(), &rows)?;

    tracing::info!(target: "normalize", step = "sort", table = table.name(), rows = written as u64);
    Ok(written)
}

/// Re-sort towns past the fixed ones by (nation, longitude, latitude) and
/// number them consecutively from `fixed_towns + 1`.
pub fn reindex_towns(conn: &Connection, fixed_towns: i64) -> StoreResult<usize> {
    let mut rows = read_rows(
        conn,
        "SELECT * FROM towns WHERE town_id > ?1 ORDER BY nation_id, longitude, latitude",
        [fixed_towns],
    )?;
    conn.execute("DELETE FROM towns WHERE town_id > ?1", [fixed_towns])?;
    for (next_id, row) in (fixed_towns + 1..).zip(rows.iter_mut()) {
        row[0] = Value::Integer(next_id);
    }
    let written = insert_rows(conn, "towns", &rows)?;

    tracing::info!(target: "normalize", step = "reindex", table = "towns", rows = written as u64);
    Ok(written)
}
