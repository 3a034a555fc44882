// crates/bagdb-core/src/error.rs

//! Error types shared by every stage of an extraction run.
//!
//! Structural failures (schema replay, storage, missing source) surface as
//! [`BagError`] and abort the run. Data sparsity never does: empty selections
//! are recorded as warnings on the [`RunReport`](crate::report::RunReport).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BagError {
    /// The source dataset could not be opened.
    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A table definition from the source could not be replayed on the target.
    /// Extractor and dataset disagree on the schema; the run must stop.
    #[error("Schema mismatch while creating `{name}`: {source}")]
    SchemaMismatch {
        name: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A table the copy plan names is absent from the source.
    #[error("Table `{0}` not found in source dataset")]
    MissingTable(String),

    /// Source and target resolve to the same file.
    #[error("Refusing to overwrite the source dataset at {0}")]
    SamePath(String),

    #[error("Invalid postcode `{0}`: expected 4 digits followed by 2 letters (e.g. 3511AB)")]
    InvalidPostcode(String),

    #[error("Invalid coverage spec: {0}")]
    InvalidCoverage(String),
}

pub type Result<T> = std::result::Result<T, BagError>;
