//! bagdb — build and inspect BAG sample databases
//!
//! Usage examples
//! --------------
//!
//! - Build a sample with the default major-city coverage
//!   $ bagdb extract --source bag.sqlite --target bag-sample.sqlite
//!
//! - Guarantee 5 Utrecht postcodes out of 8 in total, keep the report
//!   $ bagdb extract -s bag.sqlite -t small.sqlite -r Utrecht=35 --per-region 5 -n 8 --report run.json
//!
//! - Check an existing dataset
//!   $ bagdb validate bag-sample.sqlite
//!
//! - Resolve a postcode
//!   $ bagdb lookup "3511 ab" --db bag-sample.sqlite
//!
//! `BAG_SOURCE_DB` and `BAG_SAMPLE_DB` stand in for the path flags.
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr.
mod args;

use crate::args::{CliArgs, Commands, ExtractArgs};
use anyhow::Context;
use bagdb_core::dataset::open_read_only;
use bagdb_core::{
    extract, lookup, validate, CoverageSpec, Layout, Postcode, RunReport, ValidationReport,
    DEFAULT_COVERED_POSTCODES,
};
use clap::Parser;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn coverage_from(args: &ExtractArgs) -> anyhow::Result<CoverageSpec> {
    if let Some(path) = &args.coverage {
        return CoverageSpec::load_from_path(path)
            .with_context(|| format!("reading coverage from {}", path.display()));
    }
    if args.regions.is_empty() {
        let mut spec = CoverageSpec::major_cities();
        if let Some(n) = args.per_region {
            spec.per_region = n;
        }
        return Ok(spec);
    }
    let regions = args
        .regions
        .iter()
        .map(|r| CoverageSpec::parse_region(r))
        .collect::<Result<Vec<_>, _>>()?;
    let per_region = args
        .per_region
        .unwrap_or(DEFAULT_COVERED_POSTCODES / regions.len());
    Ok(CoverageSpec::new(regions, per_region)?)
}

fn print_validation(v: &ValidationReport) {
    println!("Tables:");
    for (table, rows) in &v.table_rows {
        println!("  {table}: {rows}");
    }
    println!("Views:");
    for (view, rows) in &v.view_rows {
        println!("  {view}: {rows}");
    }
    println!("Distinct postcodes: {}", v.distinct_postcodes);
    match &v.sample {
        Some(hit) => println!(
            "Sample: {} -> ({:?}, {:?}) {}",
            hit.postcode,
            hit.lat,
            hit.lon,
            hit.woonplaats.as_deref().unwrap_or("-")
        ),
        None => println!("Sample: none"),
    }
    println!("Addresses without street: {}", v.addresses_without_street);
    for (junction, rows) in &v.dangling_junction_rows {
        println!("Dangling {junction} rows: {rows}");
    }
    println!("Dwelling units without address: {}", v.orphan_dwelling_units);
    println!("Consistent: {}", v.is_consistent());
}

fn print_run(report: &RunReport) {
    println!("Sample written to {}", report.target);
    println!(
        "  Postcodes: {} of {} requested",
        report.roots_selected, report.roots_requested
    );
    for region in &report.regions {
        println!(
            "    {} ({}): {}/{}",
            region.label, region.prefix, region.selected, region.requested
        );
    }
    for t in &report.tables {
        println!("  {}: {} rows", t.table, t.rows);
    }
    println!("  Skipped indices/views: {}", report.skipped_ddl.len());
    println!("  Warnings: {}", report.warnings.len());
    println!(
        "  Size: {} bytes in {} ms",
        report.target_bytes, report.duration_ms
    );
    if let Some(v) = &report.validation {
        print_validation(v);
    }
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    match args.command {
        Commands::Extract(extract_args) => {
            let coverage = coverage_from(&extract_args)?;
            let report = extract(
                &extract_args.source,
                &extract_args.target,
                &coverage,
                extract_args.total,
            )
            .with_context(|| {
                format!(
                    "extracting {} into {}",
                    extract_args.source.display(),
                    extract_args.target.display()
                )
            })?;
            if let Some(path) = &extract_args.report {
                fs::write(path, serde_json::to_vec_pretty(&report)?)
                    .with_context(|| format!("writing report to {}", path.display()))?;
                info!(path = %path.display(), "run report written");
            }
            print_run(&report);
        }

        Commands::Validate { db } => {
            let conn = open_read_only(&db)?;
            let report = validate(&conn, &Layout::BAG)?;
            print_validation(&report);
            for w in &report.warnings {
                eprintln!("warning: {w}");
            }
        }

        Commands::Lookup { postcode, db } => {
            let postcode = Postcode::parse(&postcode)?;
            let conn = open_read_only(&db)?;
            match lookup(&conn, &postcode)? {
                Some(hit) => println!(
                    "{}: lat {:?}, lon {:?}, {}",
                    hit.postcode,
                    hit.lat,
                    hit.lon,
                    hit.woonplaats.as_deref().unwrap_or("-")
                ),
                None => eprintln!("No address found for: {postcode}"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_args(argv: &[&str]) -> ExtractArgs {
        let base = ["bagdb", "extract", "-s", "bag.sqlite", "-t", "out.sqlite"];
        let args = CliArgs::try_parse_from(base.iter().chain(argv)).unwrap();
        match args.command {
            Commands::Extract(a) => a,
            other => panic!("expected extract, got {other:?}"),
        }
    }

    #[test]
    fn default_coverage_is_major_cities() {
        let args = extract_args(&[]);
        assert_eq!(args.total, bagdb_core::DEFAULT_TOTAL_POSTCODES);
        assert!(args.report.is_none());
        assert_eq!(coverage_from(&args).unwrap(), CoverageSpec::major_cities());
    }

    #[test]
    fn regions_share_covered_postcodes() {
        let args = extract_args(&["-r", "Utrecht=35", "-r", "Groningen=97", "--report", "run.json"]);
        let spec = coverage_from(&args).unwrap();
        assert_eq!(spec.regions.len(), 2);
        assert_eq!(spec.per_region, DEFAULT_COVERED_POSTCODES / 2);
        assert_eq!(args.report.as_deref(), Some(std::path::Path::new("run.json")));
    }

    #[test]
    fn coverage_file_conflicts_with_regions() {
        let parsed = CliArgs::try_parse_from([
            "bagdb", "extract", "-s", "a", "-t", "b", "-r", "Utrecht=35", "-c", "cov.json",
        ]);
        assert!(parsed.is_err());
    }
}
