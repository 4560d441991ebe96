use rusqlite::Connection;

use crate::error::StoreResult;

/// Routes are undirected and stored once, as `from_id < to_id`.
///
/// Every other row (reversed copies and self-loops) is deleted. Exact
/// duplicates of a forward row are left alone. Returns the number of rows
/// removed.
pub fn dedupe_routes(conn: &Connection) -> StoreResult<usize> {
    let removed = conn.execute("DELETE FROM routes WHERE from_id >= to_id", [])?;
    let rows: i64 = conn.query_row("SELECT COUNT(*) FROM routes", [], |r| r.get(0))?;

    tracing::info!(target: "normalize", step = "dedupe", table = "routes", rows = rows as u64, removed = removed as u64);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes(conn: &Connection) -> Vec<(i64, i64)> {
        conn.prepare("SELECT from_id, to_id FROM routes ORDER BY rowid")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(crate::SCHEMA).unwrap();
        conn
    }

    #[test]
    fn only_forward_rows_survive() {
        let conn = conn();
        conn.execute_batch(
            "INSERT INTO routes VALUES (1, 2);
             INSERT INTO routes VALUES (2, 1);
             INSERT INTO routes VALUES (5, 3);
             INSERT INTO routes VALUES (4, 4);
             INSERT INTO routes VALUES (2, 3);",
        )
        .unwrap();

        assert_eq!(dedupe_routes(&conn).unwrap(), 3);
        assert_eq!(routes(&conn), vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn reversed_only_rows_are_dropped_and_forward_copies_kept() {
        let conn = conn();
        conn.execute_batch(
            "INSERT INTO routes VALUES (5, 3);
             INSERT INTO routes VALUES (1, 2);
             INSERT INTO routes VALUES (1, 2);",
        )
        .unwrap();

        assert_eq!(dedupe_routes(&conn).unwrap(), 1);
        assert_eq!(routes(&conn), vec![(1, 2), (1, 2)]);
    }

    #[test]
    fn clean_table_is_untouched() {
        let conn = conn();
        conn.execute_batch("INSERT INTO routes VALUES (1, 2);").unwrap();
        assert_eq!(dedupe_routes(&conn).unwrap(), 0);
        assert_eq!(routes(&conn), vec![(1, 2)]);
    }
}
