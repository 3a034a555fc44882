//! Workspace root for `bagdb-rs`; re-exports [`bagdb_core`] so the demos
//! can be built from the repository root.

pub use bagdb_core::*;
