//! Sample extraction example for bagdb-rs
//!
//! Builds a small Utrecht-heavy sample and queries it.
//!
//! ```text
//! cargo run --example sample_extract -- bag.sqlite bag-sample.sqlite
//! ```

use bagdb_rs::{extract, lookup, CoverageSpec, Postcode, Region};
use std::env;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let mut args = env::args().skip(1);
    let source = PathBuf::from(args.next().unwrap_or_else(|| "bag.sqlite".into()));
    let target = PathBuf::from(args.next().unwrap_or_else(|| "bag-sample.sqlite".into()));

    println!("=== bagdb sample extraction ===\n");

    let coverage = CoverageSpec::new(
        vec![Region {
            label: "Utrecht".into(),
            prefix: "35".into(),
        }],
        5,
    )?;
    let report = extract(&source, &target, &coverage, 8)?;

    println!("--- Postcodes ---");
    println!("  selected {} of {}", report.roots_selected, report.roots_requested);
    for region in &report.regions {
        println!("  {}: {}/{}", region.label, region.selected, region.requested);
    }

    println!("\n--- Rows copied ---");
    for table in &report.tables {
        println!("  {:<8} {}", table.table, table.rows);
    }

    println!("\n--- Warnings ---");
    if report.warnings.is_empty() {
        println!("  none");
    }
    for w in &report.warnings {
        println!("  {w}");
    }

    if let Some(hit) = report.validation.as_ref().and_then(|v| v.sample.clone()) {
        println!("\n--- Lookup ---");
        let conn = bagdb_rs::dataset::open_read_only(&target)?;
        let postcode = Postcode::parse(&hit.postcode)?;
        match lookup(&conn, &postcode)? {
            Some(hit) => println!("  {} -> {:?}, {:?}", hit.postcode, hit.lat, hit.lon),
            None => println!("  {postcode} not found"),
        }
    }

    Ok(())
}
