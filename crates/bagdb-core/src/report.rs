// crates/bagdb-core/src/report.rs

//! Run-scoped bookkeeping.
//!
//! One [`RunReport`] is created per extraction and passed by `&mut` through
//! every stage. Nothing is counted in globals, so two runs in one process
//! never see each other's numbers.

use crate::schema::DdlKind;
use crate::validate::ValidationReport;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct RegionCount {
    pub label: String,
    pub prefix: String,
    pub requested: usize,
    pub selected: usize,
}

/// Key counts per closure stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClosureCounts {
    pub addresses: usize,
    pub streets: usize,
    pub dwelling_units: usize,
    pub buildings: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyMode {
    /// Rows whose key is in the closure.
    Entity,
    /// Rows whose two keys are both in the closure.
    Junction,
    /// Every row.
    Full,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCopy {
    pub table: String,
    pub mode: CopyMode,
    pub rows: u64,
}

/// An index or view that could not be created on the target.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDdl {
    pub kind: DdlKind,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub source: String,
    pub target: String,
    pub roots_requested: usize,
    pub roots_selected: usize,
    pub regions: Vec<RegionCount>,
    pub closure: ClosureCounts,
    pub tables: Vec<TableCopy>,
    pub skipped_ddl: Vec<SkippedDdl>,
    pub warnings: Vec<String>,
    pub validation: Option<ValidationReport>,
    pub duration_ms: u128,
    pub target_bytes: u64,
}

impl RunReport {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    /// Records a non-fatal condition and logs it.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.warnings.push(message);
    }

    pub fn record_copy(&mut self, table: &str, mode: CopyMode, rows: u64) {
        self.tables.push(TableCopy {
            table: table.to_owned(),
            mode,
            rows,
        });
    }

    pub fn record_skipped(&mut self, kind: DdlKind, name: &str, error: impl ToString) {
        let error = error.to_string();
        self.warn(format!("skipped {kind} `{name}`: {error}"));
        self.skipped_ddl.push(SkippedDdl {
            kind,
            name: name.to_owned(),
            error,
        });
    }

    /// Rows copied into `table`, if it was copied in this run.
    pub fn rows_copied(&self, table: &str) -> Option<u64> {
        self.tables.iter().find(|t| t.table == table).map(|t| t.rows)
    }

    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }
}
