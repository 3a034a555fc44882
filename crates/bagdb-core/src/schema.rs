// crates/bagdb-core/src/schema.rs

//! # Schema Mirror
//!
//! Reads the source catalog once into a [`SchemaPlan`] and replays it on the
//! target in two phases:
//!
//! 1. [`SchemaPlan::create_tables`] before any data is copied. A failure here
//!    means extractor and dataset disagree on the schema and is fatal.
//! 2. [`SchemaPlan::apply_deferred`] after the bulk load: indices, then views.
//!    Failures are recorded on the report and skipped.
//!
//! Spatial-index structures (`geoindex*`, an R*Tree with shadow tables) and
//! SQLite internals (`sqlite_*`) are never mirrored.

use crate::error::{BagError, Result};
use crate::report::RunReport;
use rusqlite::Connection;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Catalog names starting with one of these are not mirrored.
pub const EXCLUDED_PREFIXES: &[&str] = &["geoindex", "sqlite_"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DdlKind {
    Table,
    Index,
    View,
}

impl DdlKind {
    fn from_catalog(kind: &str) -> Option<Self> {
        match kind {
            "table" => Some(Self::Table),
            "index" => Some(Self::Index),
            "view" => Some(Self::View),
            _ => None,
        }
    }
}

impl fmt::Display for DdlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Index => "index",
            Self::View => "view",
        })
    }
}

/// One catalog entry, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DdlStatement {
    pub kind: DdlKind,
    pub name: String,
    /// Table the entry belongs to (itself, for tables).
    pub table: String,
    pub sql: String,
}

/// The mirrored part of a source schema, in declaration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaPlan {
    pub statements: Vec<DdlStatement>,
}

fn is_excluded(name: &str, excluded: &[&str]) -> bool {
    excluded.iter().any(|prefix| {
        name.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

impl SchemaPlan {
    /// Captures tables, indices and views using [`EXCLUDED_PREFIXES`].
    pub fn capture(source: &Connection) -> Result<Self> {
        Self::capture_excluding(source, EXCLUDED_PREFIXES)
    }

    pub fn capture_excluding(source: &Connection, excluded: &[&str]) -> Result<Self> {
        // Implicit indices (primary keys, UNIQUE) have no SQL; the table DDL recreates them.
        let mut stmt = source.prepare(
            "SELECT type, name, tbl_name, sql FROM sqlite_master
             WHERE sql IS NOT NULL
             ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut statements = Vec::new();
        for row in rows {
            let (kind, name, table, sql) = row?;
            let Some(kind) = DdlKind::from_catalog(&kind) else {
                continue; // triggers
            };
            if is_excluded(&name, excluded) || is_excluded(&table, excluded) {
                debug!(%kind, %name, "excluded from mirror");
                continue;
            }
            statements.push(DdlStatement {
                kind,
                name,
                table,
                sql,
            });
        }
        Ok(Self { statements })
    }

    pub fn of_kind(&self, kind: DdlKind) -> impl Iterator<Item = &DdlStatement> {
        self.statements.iter().filter(move |s| s.kind == kind)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.of_kind(DdlKind::Table).map(|s| s.name.as_str()).collect()
    }

    /// Phase one: creates every table on the target, in declaration order.
    ///
    /// Also switches off foreign key enforcement on `target`: tables are
    /// bulk-loaded one at a time, so a child table may be filled before its
    /// parent. Closure completeness is checked by the validator instead.
    pub fn create_tables(&self, target: &Connection) -> Result<usize> {
        // no-op inside a transaction, so set it first
        target.pragma_update(None, "foreign_keys", false)?;
        let tx = target.unchecked_transaction()?;
        let mut created = 0;
        for ddl in self.of_kind(DdlKind::Table) {
            tx.execute_batch(&ddl.sql)
                .map_err(|source| BagError::SchemaMismatch {
                    name: ddl.name.clone(),
                    source,
                })?;
            debug!(table = %ddl.name, "created table");
            created += 1;
        }
        tx.commit()?;
        info!(tables = created, "schema mirrored");
        Ok(created)
    }

    /// Phase two: indices, then views. Returns how many were created.
    pub fn apply_deferred(&self, target: &Connection, report: &mut RunReport) -> usize {
        let mut created = 0;
        for kind in [DdlKind::Index, DdlKind::View] {
            for ddl in self.of_kind(kind) {
                match target.execute_batch(&ddl.sql) {
                    Ok(()) => {
                        debug!(%kind, name = %ddl.name, "created");
                        created += 1;
                    }
                    Err(e) => report.record_skipped(kind, &ddl.name, e),
                }
            }
        }
        info!(created, skipped = report.skipped_ddl.len(), "indices and views created");
        created
    }
}

/// Captures the source schema and creates its tables on `target`.
/// The returned plan is reused for [`SchemaPlan::apply_deferred`].
pub fn mirror_schema(source: &Connection, target: &Connection) -> Result<SchemaPlan> {
    let plan = SchemaPlan::capture(source)?;
    plan.create_tables(target)?;
    Ok(plan)
}
