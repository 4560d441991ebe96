//! One-off maintenance of the simulation's SQLite store: re-sort tables,
//! backfill missing frequency rows, renumber generated towns, convert
//! yearly livestock outputs to daily rates and drop reversed routes.
//!
//! Every step takes the connection explicitly; [`run_pass`] chains them in
//! a single transaction.

use std::path::Path;

use rusqlite::Connection;

mod backfill;
mod config;
mod error;
mod livestock;
mod pass;
mod routes;
mod table;

pub use backfill::backfill_frequencies;
pub use config::{BackfillStrategy, NormalizeConfig};
pub use error::{StoreError, StoreResult};
pub use livestock::{daily_rate, rescale_livestock};
pub use pass::{PassReport, run_pass};
pub use routes::dedupe_routes;
pub use table::{Table, reindex_towns, sort_table};

/// Layout of the tables the pass reads and writes.
pub const SCHEMA: &str = include_str!("../schema.sql");

/// Owns the connection to one store.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open an existing database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create any missing tables.
    pub fn create_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn run_pass(&mut self, cfg: &NormalizeConfig) -> StoreResult<PassReport> {
        run_pass(&mut self.conn, cfg)
    }
}
