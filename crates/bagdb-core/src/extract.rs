// crates/bagdb-core/src/extract.rs

//! # Extraction run
//!
//! Wires the stages together: mirror the schema, pick root postcodes,
//! expand them into a closed record set, copy rows, build indices and views,
//! then validate the result.
//!
//! ```no_run
//! use bagdb_core::{extract, CoverageSpec, DEFAULT_TOTAL_POSTCODES};
//! use std::path::Path;
//!
//! let report = extract(
//!     Path::new("bag.sqlite"),
//!     Path::new("bag-sample.sqlite"),
//!     &CoverageSpec::major_cities(),
//!     DEFAULT_TOTAL_POSTCODES,
//! )?;
//! println!("{} rows copied", report.total_rows());
//! # Ok::<(), bagdb_core::BagError>(())
//! ```

use crate::closure::compute_closure_in;
use crate::copy::Copier;
use crate::dataset::{open_read_only, recreate_target};
use crate::error::Result;
use crate::model::{CoverageSpec, Layout};
use crate::params::InList;
use crate::report::RunReport;
use crate::schema::SchemaPlan;
use crate::select::select_roots_in;
use crate::validate::validate;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Configurable extraction run. [`extract`] uses the defaults.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    layout: Layout,
    in_list: Option<InList>,
}

impl Extractor {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            in_list: None,
        }
    }

    /// Fixes the IN-list batch size instead of deriving it from the source.
    pub fn with_in_list(mut self, in_list: InList) -> Self {
        self.in_list = Some(in_list);
        self
    }

    pub fn run(
        &self,
        source_path: &Path,
        target_path: &Path,
        coverage: &CoverageSpec,
        total_count: usize,
    ) -> Result<RunReport> {
        let started = Instant::now();
        let layout = &self.layout;
        let mut report = RunReport::new(
            source_path.display().to_string(),
            target_path.display().to_string(),
        );

        let source = open_read_only(source_path)?;
        let mut target = recreate_target(source_path, target_path)?;
        let in_list = self
            .in_list
            .unwrap_or_else(|| InList::for_connection(&source, 0));

        info!(step = 1, "mirroring schema");
        let plan = SchemaPlan::capture(&source)?;
        plan.create_tables(&target)?;

        info!(step = 2, "selecting root postcodes");
        let roots = select_roots_in(&source, layout, coverage, total_count, &mut report)?;

        info!(step = 3, roots = roots.len(), "computing closure");
        let closure = compute_closure_in(&source, layout, &roots, &in_list, &mut report)?;

        info!(step = 4, batch = in_list.batch(), "copying rows");
        {
            let mut copier = Copier::new(&source, &mut target).with_in_list(in_list);
            let r = &mut report;
            copier.copy_entity(layout.addresses.name, layout.addresses.key, &closure.addresses, r)?;
            copier.copy_entity(
                layout.dwelling_units.name,
                layout.dwelling_units.key,
                &closure.dwelling_units,
                r,
            )?;
            copier.copy_entity(layout.streets.name, layout.streets.key, &closure.streets, r)?;
            copier.copy_entity(layout.buildings.name, layout.buildings.key, &closure.buildings, r)?;
            copier.copy_full_table(layout.places, r)?;

            let j = &layout.address_units;
            copier.copy_junction(j.name, j.left, &closure.addresses, j.right, &closure.dwelling_units, r)?;
            let j = &layout.unit_buildings;
            copier.copy_junction(j.name, j.left, &closure.dwelling_units, j.right, &closure.buildings, r)?;
        }

        info!(step = 5, "creating indices and views");
        plan.apply_deferred(&target, &mut report);

        drop(source);
        target.close().map_err(|(_, e)| e)?;

        info!(step = 6, "validating target");
        let target = open_read_only(target_path)?;
        report.validation = Some(validate(&target, layout)?);
        drop(target);

        report.duration_ms = started.elapsed().as_millis();
        report.target_bytes = fs::metadata(target_path)?.len();

        info!(
            postcodes = roots.len(),
            rows = report.total_rows(),
            warnings = report.warnings.len(),
            bytes = report.target_bytes,
            ms = report.duration_ms as u64,
            "extraction complete"
        );
        Ok(report)
    }
}

/// Builds a sample database at `target_path` from the full dataset at
/// `source_path`. Any existing file at `target_path` is replaced.
pub fn extract(
    source_path: &Path,
    target_path: &Path,
    coverage: &CoverageSpec,
    total_count: usize,
) -> Result<RunReport> {
    Extractor::default().run(source_path, target_path, coverage, total_count)
}
