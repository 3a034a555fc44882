// crates/bagdb-core/src/lib.rs

//! Builds small, referentially closed samples of a BAG address database.
//!
//! A run picks root postcodes (a guaranteed share per region, the rest at
//! random), follows them through addresses, streets, dwelling units and
//! buildings, and copies exactly those rows plus the full place table into
//! a fresh SQLite file with the source's own schema, indices and views.

pub mod closure;
pub mod copy;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod lookup;
pub mod model;
pub mod params;
pub mod report;
pub mod schema;
pub mod select;
pub mod validate;

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
mod fixture;

pub use crate::error::{BagError, Result};
pub use closure::{compute_closure, ClosureSet};
pub use copy::Copier;
pub use extract::{extract, Extractor};
pub use lookup::{lookup, PostcodeHit};
pub use model::{
    CoverageSpec, Key, Layout, Postcode, Region, DEFAULT_COVERED_POSTCODES, DEFAULT_TOTAL_POSTCODES,
};
pub use params::InList;
pub use report::RunReport;
pub use schema::{mirror_schema, SchemaPlan};
pub use select::select_roots;
pub use validate::{validate, ValidationReport};
