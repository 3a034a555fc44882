// crates/bagdb-core/src/select.rs

//! # Root Selector
//!
//! Picks the postcodes the sample is grown from: a random draw per covered
//! region, then a random remainder from anywhere else. Randomness comes from
//! SQLite's `RANDOM()`, so two runs pick different postcodes; only the
//! cardinalities and region membership are stable.

use crate::error::Result;
use crate::model::{quote_ident, CoverageSpec, Layout, Postcode};
use crate::report::{RegionCount, RunReport};
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use tracing::info;

struct EligibleQuery {
    by_prefix: String,
    any: String,
}

impl EligibleQuery {
    fn new(layout: &Layout) -> Self {
        let table = quote_ident(layout.addresses.name);
        let postcode = quote_ident(layout.postcode_column);
        let status = quote_ident(layout.status_column);
        let eligible = format!("{postcode} != '' AND IFNULL({status}, '') != ?1");
        Self {
            by_prefix: format!(
                "SELECT DISTINCT {postcode} FROM {table}
                 WHERE {postcode} LIKE ?2 || '%' AND {eligible}
                 ORDER BY RANDOM() LIMIT ?3"
            ),
            any: format!(
                "SELECT DISTINCT {postcode} FROM {table}
                 WHERE {eligible}
                 ORDER BY RANDOM() LIMIT ?2"
            ),
        }
    }
}

fn sql_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Selects up to `total_count` distinct, non-withdrawn postcodes.
///
/// Each region contributes up to `coverage.per_region` postcodes; short
/// regions contribute what they have. The remainder is drawn from all
/// eligible postcodes not already chosen. A result smaller than
/// `total_count` is reported as a warning.
pub fn select_roots(
    source: &Connection,
    coverage: &CoverageSpec,
    total_count: usize,
    report: &mut RunReport,
) -> Result<BTreeSet<Postcode>> {
    select_roots_in(source, &Layout::BAG, coverage, total_count, report)
}

pub fn select_roots_in(
    source: &Connection,
    layout: &Layout,
    coverage: &CoverageSpec,
    total_count: usize,
    report: &mut RunReport,
) -> Result<BTreeSet<Postcode>> {
    let queries = EligibleQuery::new(layout);
    let withdrawn = layout.withdrawn_status;
    let mut covered: BTreeSet<Postcode> = BTreeSet::new();

    report.roots_requested = total_count;

    let mut stmt = source.prepare(&queries.by_prefix)?;
    for region in &coverage.regions {
        let rows = stmt.query_map(
            params![withdrawn, region.prefix, sql_limit(coverage.per_region)],
            |row| row.get::<_, Postcode>(0),
        )?;
        let mut selected = 0;
        for postcode in rows {
            if covered.insert(postcode?) {
                selected += 1;
            }
        }
        info!(region = %region.label, prefix = %region.prefix, selected, "region sampled");
        if selected < coverage.per_region {
            report.warn(format!(
                "region {} ({}): only {selected} of {} postcodes available",
                region.label, region.prefix, coverage.per_region
            ));
        }
        report.regions.push(RegionCount {
            label: region.label.clone(),
            prefix: region.prefix.clone(),
            requested: coverage.per_region,
            selected,
        });
    }

    let needed = total_count.saturating_sub(covered.len());
    let mut roots = covered.clone();
    if needed > 0 {
        // Over-draw by the covered count and drop covered postcodes: at most
        // `covered.len()` draws can collide, so `needed` survive whenever the
        // pool allows it. No NOT IN list, hence no parameter ceiling.
        let mut stmt = source.prepare(&queries.any)?;
        let rows = stmt.query_map(
            params![withdrawn, sql_limit(needed.saturating_add(covered.len()))],
            |row| row.get::<_, Postcode>(0),
        )?;
        let mut added = 0;
        for postcode in rows {
            let postcode = postcode?;
            if added == needed {
                break;
            }
            if !covered.contains(&postcode) && roots.insert(postcode) {
                added += 1;
            }
        }
        info!(requested = needed, selected = added, "remainder sampled");
    }

    report.roots_selected = roots.len();
    if roots.is_empty() {
        report.warn("root selection produced no postcodes");
    } else if roots.len() < total_count {
        report.warn(format!(
            "selected {} of {total_count} requested postcodes",
            roots.len()
        ));
    }
    info!(total = roots.len(), "postcodes selected");
    Ok(roots)
}
