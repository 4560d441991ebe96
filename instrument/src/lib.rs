//! Test instrumentation: record `tracing` events into per-target tables.
//!
//! Events are grouped by their `target`; every field becomes a column.
//! Capture is scoped to a closure, so tests running in parallel threads
//! never see each other's rows.
//!
//! # Usage
//!
//! ```ignore
//! // In library code:
//! tracing::info!(target: "equilibrium", pool, total_quantity);
//!
//! // In a test:
//! let (_, recorder) = instrument::capture(|| system.solve(formulation));
//! let df = recorder.table("equilibrium").unwrap().to_dataframe()?;
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::subscriber::Interest;
use tracing::{Event, Id, Level, Metadata, Subscriber};

/// One recorded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    UInt(u64),
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Cell::UInt(v) => Some(v as f64),
            Cell::Int(v) => Some(v as f64),
            Cell::Float(v) => Some(v),
            _ => None,
        }
    }

    fn kind(&self) -> Kind {
        match self {
            Cell::UInt(_) => Kind::UInt,
            Cell::Int(_) => Kind::Int,
            Cell::Float(_) => Kind::Float,
            Cell::Bool(_) => Kind::Bool,
            Cell::Text(_) => Kind::Text,
        }
    }

    fn render(&self) -> String {
        match self {
            Cell::UInt(v) => v.to_string(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Bool(v) => v.to_string(),
            Cell::Text(v) => v.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    UInt,
    Int,
    Float,
    Bool,
    Text,
}

impl Kind {
    /// Column type able to hold both kinds.
    fn widen(self, other: Kind) -> Kind {
        use Kind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (UInt | Int | Float, UInt | Int | Float) => Float,
            _ => Text,
        }
    }
}

pub type Row = BTreeMap<String, Cell>;

/// Rows recorded for one target, in emission order.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Union of field names over every row.
    pub fn column_names(&self) -> BTreeSet<String> {
        self.rows.iter().flat_map(|r| r.keys().cloned()).collect()
    }

    /// Values of one numeric column; rows without it are skipped.
    pub fn floats(&self, name: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|r| r.get(name).and_then(Cell::as_f64))
            .collect()
    }

    /// Values of one column rendered as text; rows without it are skipped.
    pub fn texts(&self, name: &str) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|r| r.get(name).map(Cell::render))
            .collect()
    }
}

/// Tables keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub tables: HashMap<String, Table>,
}

impl Recorder {
    pub fn table(&self, target: &str) -> Option<&Table> {
        self.tables.get(target)
    }

    /// Number of rows recorded for `target` (0 if none).
    pub fn count(&self, target: &str) -> usize {
        self.tables.get(target).map_or(0, Table::len)
    }
}

/// Visitor that writes event fields into one row.
struct RowVisitor<'a> {
    row: &'a mut Row,
}

impl Visit for RowVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.row.insert(field.name().to_string(), Cell::UInt(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.row.insert(field.name().to_string(), Cell::Int(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.row.insert(field.name().to_string(), Cell::Float(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.row.insert(field.name().to_string(), Cell::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.row
            .insert(field.name().to_string(), Cell::Text(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.row
            .insert(field.name().to_string(), Cell::Text(format!("{:?}", value)));
    }
}

/// Subscriber that appends every enabled event to a shared [`Recorder`].
pub struct TableSubscriber {
    targets: Option<Vec<String>>,
    max_level: Level,
    sink: Arc<Mutex<Recorder>>,
}

impl TableSubscriber {
    /// Record events from every target at DEBUG and above.
    pub fn new() -> Self {
        Self {
            targets: None,
            max_level: Level::DEBUG,
            sink: Arc::default(),
        }
    }

    /// Only record events whose target is listed.
    pub fn with_targets(mut self, targets: &[&str]) -> Self {
        self.targets = Some(targets.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }

    /// Handle to the recorded data, valid after the subscriber is dropped.
    pub fn sink(&self) -> Arc<Mutex<Recorder>> {
        Arc::clone(&self.sink)
    }
}

impl Default for TableSubscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl Subscriber for TableSubscriber {
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        // Other threads may hold different scoped subscribers; never let a
        // cached interest decide for them.
        Interest::sometimes()
    }

    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event()
            && *metadata.level() <= self.max_level
            && self
                .targets
                .as_ref()
                .is_none_or(|ts| ts.iter().any(|t| t == metadata.target()))
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut row = Row::new();
        event.record(&mut RowVisitor { row: &mut row });

        let target = event.metadata().target().to_string();
        let mut recorder = match self.sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        recorder.tables.entry(target).or_default().rows.push(row);
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Run `f` with a [`TableSubscriber`] as the thread's default and return
/// what it recorded.
pub fn capture<R>(f: impl FnOnce() -> R) -> (R, Recorder) {
    capture_with(TableSubscriber::new(), f)
}

/// Like [`capture`], limited to the listed targets.
pub fn capture_targets<R>(targets: &[&str], f: impl FnOnce() -> R) -> (R, Recorder) {
    capture_with(TableSubscriber::new().with_targets(targets), f)
}

pub fn capture_with<R>(subscriber: TableSubscriber, f: impl FnOnce() -> R) -> (R, Recorder) {
    let sink = subscriber.sink();
    let out = tracing::subscriber::with_default(subscriber, f);
    let mut guard = match sink.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    (out, std::mem::take(&mut *guard))
}

// === Polars Integration ===

use polars::prelude::*;

impl Table {
    /// Convert to a DataFrame; missing fields become nulls.
    ///
    /// A column mixing integer and float fields is widened to `f64`; any
    /// other mix is rendered as strings.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::new();

        for name in self.column_names() {
            let cells: Vec<Option<&Cell>> = self.rows.iter().map(|r| r.get(&name)).collect();
            let kind = cells
                .iter()
                .flatten()
                .map(|c| c.kind())
                .reduce(Kind::widen)
                .unwrap_or(Kind::Text);

            let col_name: PlSmallStr = name.as_str().into();
            let column = match kind {
                Kind::UInt => Column::new(
                    col_name,
                    cells
                        .iter()
                        .map(|c| match c {
                            Some(Cell::UInt(v)) => Some(*v),
                            _ => None,
                        })
                        .collect::<Vec<Option<u64>>>(),
                ),
                Kind::Int => Column::new(
                    col_name,
                    cells
                        .iter()
                        .map(|c| match c {
                            Some(Cell::Int(v)) => Some(*v),
                            _ => None,
                        })
                        .collect::<Vec<Option<i64>>>(),
                ),
                Kind::Float => Column::new(
                    col_name,
                    cells
                        .iter()
                        .map(|c| c.and_then(Cell::as_f64))
                        .collect::<Vec<Option<f64>>>(),
                ),
                Kind::Bool => Column::new(
                    col_name,
                    cells
                        .iter()
                        .map(|c| match c {
                            Some(Cell::Bool(v)) => Some(*v),
                            _ => None,
                        })
                        .collect::<Vec<Option<bool>>>(),
                ),
                Kind::Text => Column::new(
                    col_name,
                    cells
                        .iter()
                        .map(|c| c.map(Cell::render))
                        .collect::<Vec<Option<String>>>(),
                ),
            };
            columns.push(column);
        }

        DataFrame::new(columns)
    }
}

impl Recorder {
    /// Convert all tables to polars DataFrames.
    pub fn to_dataframes(&self) -> PolarsResult<HashMap<String, DataFrame>> {
        self.tables
            .iter()
            .map(|(name, table)| Ok((name.clone(), table.to_dataframe()?)))
            .collect()
    }
}
