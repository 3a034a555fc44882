// crates/bagdb-core/src/validate.rs

//! # Validator
//!
//! Post-build diagnostics for operators. Nothing here fails a run: every
//! empty count or broken reference becomes a warning on the
//! [`ValidationReport`]. Only a target that cannot be queried at all
//! returns an error.

use crate::error::Result;
use crate::lookup::{self, PostcodeHit};
use crate::model::{quote_ident, EntityTable, JunctionTable, Layout};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub table_rows: BTreeMap<String, u64>,
    pub view_rows: BTreeMap<String, u64>,
    pub distinct_postcodes: u64,
    pub sample: Option<PostcodeHit>,
    /// Addresses whose street is absent.
    pub addresses_without_street: u64,
    /// Junction rows with at least one missing endpoint, per junction.
    pub dangling_junction_rows: BTreeMap<String, u64>,
    /// Dwelling units no address points to.
    pub orphan_dwelling_units: u64,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// True when no referential check found a broken reference.
    pub fn is_consistent(&self) -> bool {
        self.addresses_without_street == 0
            && self.orphan_dwelling_units == 0
            && self.dangling_junction_rows.values().all(|n| *n == 0)
    }

    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }

    /// Runs a `COUNT`-style query; a failing query is a warning, not an error.
    fn scalar(&mut self, conn: &Connection, what: &str, sql: &str) -> Option<u64> {
        match conn.query_row(sql, [], |r| r.get::<_, i64>(0)) {
            Ok(n) => Some(n.max(0) as u64),
            Err(e) => {
                self.warn(format!("{what}: query failed: {e}"));
                None
            }
        }
    }
}

fn dangling_sql(junction: &JunctionTable, left: &EntityTable, right: &EntityTable) -> String {
    format!(
        "SELECT COUNT(*) FROM {j} AS j
         WHERE NOT EXISTS (SELECT 1 FROM {l} WHERE {l}.{lk} = j.{jl})
            OR NOT EXISTS (SELECT 1 FROM {r} WHERE {r}.{rk} = j.{jr})",
        j = quote_ident(junction.name),
        jl = quote_ident(junction.left),
        jr = quote_ident(junction.right),
        l = quote_ident(left.name),
        lk = quote_ident(left.key),
        r = quote_ident(right.name),
        rk = quote_ident(right.key),
    )
}

fn view_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'view' ORDER BY rowid")?;
    let names = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

pub fn validate(target: &Connection, layout: &Layout) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();

    for table in layout.tables() {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        if let Some(n) = report.scalar(target, table, &sql) {
            info!(table, rows = n, "table rows");
            if n == 0 {
                report.warn(format!("{table}: no rows"));
            }
            report.table_rows.insert(table.to_owned(), n);
        }
    }

    let views = view_names(target)?;
    if !views.iter().any(|v| v == layout.label_view.name) {
        report.warn(format!("label view `{}` is missing", layout.label_view.name));
    }
    for view in views {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(&view));
        if let Some(n) = report.scalar(target, &view, &sql) {
            info!(view = %view, rows = n, "view rows");
            if n == 0 {
                report.warn(format!("view {view}: no rows"));
            }
            report.view_rows.insert(view, n);
        }
    }

    let sql = format!(
        "SELECT COUNT(DISTINCT {}) FROM {}",
        quote_ident(layout.postcode_column),
        quote_ident(layout.addresses.name)
    );
    if let Some(n) = report.scalar(target, "distinct postcodes", &sql) {
        info!(postcodes = n, "distinct postcodes");
        if n == 0 {
            report.warn("no postcodes in target".to_owned());
        }
        report.distinct_postcodes = n;
    }

    match lookup::sample(target, layout) {
        Ok(Some(hit)) => {
            info!(postcode = %hit.postcode, lat = ?hit.lat, lon = ?hit.lon, "sample query succeeded");
            report.sample = Some(hit);
        }
        Ok(None) => report.warn("sample query returned no rows".to_owned()),
        Err(e) => report.warn(format!("sample query failed: {e}")),
    }

    let sql = format!(
        "SELECT COUNT(*) FROM {a} AS a
         WHERE a.{r} IS NOT NULL
           AND NOT EXISTS (SELECT 1 FROM {s} WHERE {s}.{sk} = a.{r})",
        a = quote_ident(layout.addresses.name),
        r = quote_ident(layout.street_ref_column),
        s = quote_ident(layout.streets.name),
        sk = quote_ident(layout.streets.key),
    );
    if let Some(n) = report.scalar(target, "address streets", &sql) {
        if n > 0 {
            report.warn(format!("{n} addresses reference a missing street"));
        }
        report.addresses_without_street = n;
    }

    for (junction, left, right) in [
        (&layout.address_units, &layout.addresses, &layout.dwelling_units),
        (&layout.unit_buildings, &layout.dwelling_units, &layout.buildings),
    ] {
        let sql = dangling_sql(junction, left, right);
        if let Some(n) = report.scalar(target, junction.name, &sql) {
            if n > 0 {
                report.warn(format!("{}: {n} rows with a missing endpoint", junction.name));
            }
            report.dangling_junction_rows.insert(junction.name.to_owned(), n);
        }
    }

    let junction = &layout.address_units;
    let sql = format!(
        "SELECT COUNT(*) FROM {u} AS u
         WHERE NOT EXISTS (SELECT 1 FROM {j} WHERE {j}.{jr} = u.{uk})",
        u = quote_ident(layout.dwelling_units.name),
        uk = quote_ident(layout.dwelling_units.key),
        j = quote_ident(junction.name),
        jr = quote_ident(junction.right),
    );
    if let Some(n) = report.scalar(target, "orphan units", &sql) {
        if n > 0 {
            report.warn(format!("{n} dwelling units without an address"));
        }
        report.orphan_dwelling_units = n;
    }

    info!(
        warnings = report.warnings.len(),
        consistent = report.is_consistent(),
        "validation complete"
    );
    Ok(report)
}
