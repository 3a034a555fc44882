// crates/bagdb-core/src/closure.rs

//! # Closure Walker
//!
//! Expands a root set of postcodes into the keys of every record the sample
//! needs. The relation graph is fixed and acyclic:
//!
//! ```text
//! postcodes ─▶ addresses ─▶ streets
//!                  │
//!                  └─▶ dwelling units ─▶ buildings
//! ```
//!
//! so the walk is exactly four stages, each a `SELECT DISTINCT` over the
//! previous stage's keys. There is no fixpoint iteration.

use crate::error::Result;
use crate::model::{quote_ident, Key, Layout, Postcode};
use crate::params::{InList, KEYS_MARKER};
use crate::report::{ClosureCounts, RunReport};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

/// Keys reachable from a root set, per entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClosureSet {
    pub addresses: BTreeSet<Key>,
    pub streets: BTreeSet<Key>,
    pub dwelling_units: BTreeSet<Key>,
    pub buildings: BTreeSet<Key>,
}

impl ClosureSet {
    pub fn counts(&self) -> ClosureCounts {
        ClosureCounts {
            addresses: self.addresses.len(),
            streets: self.streets.len(),
            dwelling_units: self.dwelling_units.len(),
            buildings: self.buildings.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

fn select_distinct(column: &str, table: &str, filter: &str) -> String {
    format!(
        "SELECT DISTINCT {} FROM {} WHERE {} IN ({KEYS_MARKER})",
        quote_ident(column),
        quote_ident(table),
        quote_ident(filter)
    )
}

fn check_stage(report: &mut RunReport, stage: &str, keys: &BTreeSet<Key>) {
    info!(stage, count = keys.len(), "closure stage");
    if keys.is_empty() {
        report.warn(format!("closure stage `{stage}` matched no records"));
    }
}

/// Computes the closure of `roots` with batches sized for `source`.
pub fn compute_closure(
    source: &Connection,
    roots: &BTreeSet<Postcode>,
    report: &mut RunReport,
) -> Result<ClosureSet> {
    let in_list = InList::for_connection(source, 0);
    compute_closure_in(source, &Layout::BAG, roots, &in_list, report)
}

pub fn compute_closure_in(
    source: &Connection,
    layout: &Layout,
    roots: &BTreeSet<Postcode>,
    in_list: &InList,
    report: &mut RunReport,
) -> Result<ClosureSet> {
    let root_keys: Vec<Key> = roots.iter().map(|p| Key::from(p.as_str())).collect();

    // 1. addresses carrying a root postcode
    let addresses = in_list.query_keys(
        source,
        &select_distinct(layout.addresses.key, layout.addresses.name, layout.postcode_column),
        &root_keys,
    )?;
    check_stage(report, "addresses", &addresses);
    let address_keys: Vec<Key> = addresses.iter().cloned().collect();

    // 2. streets those addresses lie on
    let streets = in_list.query_keys(
        source,
        &select_distinct(layout.street_ref_column, layout.addresses.name, layout.addresses.key),
        &address_keys,
    )?;
    check_stage(report, "streets", &streets);

    // 3. dwelling units joined to those addresses
    let junction = &layout.address_units;
    let dwelling_units = in_list.query_keys(
        source,
        &select_distinct(junction.right, junction.name, junction.left),
        &address_keys,
    )?;
    check_stage(report, "dwelling_units", &dwelling_units);
    let unit_keys: Vec<Key> = dwelling_units.iter().cloned().collect();

    // 4. buildings holding those units
    let junction = &layout.unit_buildings;
    let buildings = in_list.query_keys(
        source,
        &select_distinct(junction.right, junction.name, junction.left),
        &unit_keys,
    )?;
    check_stage(report, "buildings", &buildings);

    let closure = ClosureSet {
        addresses,
        streets,
        dwelling_units,
        buildings,
    };
    report.closure = closure.counts();
    Ok(closure)
}
