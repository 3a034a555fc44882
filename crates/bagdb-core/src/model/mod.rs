// crates/bagdb-core/src/model/mod.rs
pub mod coverage;
pub mod key;
pub mod layout;
pub mod postcode;

pub use coverage::{CoverageSpec, Region, DEFAULT_COVERED_POSTCODES, DEFAULT_TOTAL_POSTCODES};
pub use key::Key;
pub use layout::{quote_ident, EntityTable, JunctionTable, LabelView, Layout};
pub use postcode::Postcode;
