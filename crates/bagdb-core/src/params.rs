// crates/bagdb-core/src/params.rs

//! # Bounded IN-lists
//!
//! SQLite caps the number of bound parameters per statement
//! (`SQLITE_LIMIT_VARIABLE_NUMBER`, 32766 for the bundled build). Closure
//! stages routinely produce tens of thousands of keys, so every
//! `... IN (...)` query goes through [`InList`], which splits the key slice
//! into batches that fit and prepares one statement per batch shape.

use crate::error::Result;
use crate::model::Key;
use rusqlite::limits::Limit;
use rusqlite::{params_from_iter, CachedStatement, Connection};
use std::collections::BTreeSet;

/// Marker replaced by the placeholder list in statement templates.
pub const KEYS_MARKER: &str = "{keys}";

/// Batch size for an engine limit, leaving `reserved` parameters for the
/// rest of the statement. Never zero.
pub fn batch_for_limit(limit: usize, reserved: usize) -> usize {
    limit.saturating_sub(reserved).max(1)
}

/// `?,?,?` with `n` placeholders.
pub fn placeholders(n: usize) -> String {
    let mut s = String::with_capacity(n * 2);
    for i in 0..n {
        if i > 0 {
            s.push(',');
        }
        s.push('?');
    }
    s
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InList {
    batch: usize,
}

impl InList {
    /// Sizes batches from the connection's own parameter limit.
    pub fn for_connection(conn: &Connection, reserved: usize) -> Self {
        let limit = conn.limit(Limit::SQLITE_LIMIT_VARIABLE_NUMBER).max(1) as usize;
        Self {
            batch: batch_for_limit(limit, reserved),
        }
    }

    /// Fixed batch size; tests use tiny batches to force chunking.
    pub fn with_batch(batch: usize) -> Self {
        Self {
            batch: batch.max(1),
        }
    }

    pub fn batch(&self) -> usize {
        self.batch
    }

    /// Splits keys into parameter-sized batches. Each key lands in exactly
    /// one batch.
    pub fn chunks<'k>(&self, keys: &'k [Key]) -> std::slice::Chunks<'k, Key> {
        keys.chunks(self.batch)
    }

    /// Prepares `template` with [`KEYS_MARKER`] expanded for `chunk`.
    /// Full batches share one SQL text, so the statement cache serves them.
    pub fn prepare<'c>(
        &self,
        conn: &'c Connection,
        template: &str,
        chunk: &[Key],
    ) -> Result<CachedStatement<'c>> {
        debug_assert!(chunk.len() <= self.batch);
        let sql = template.replace(KEYS_MARKER, &placeholders(chunk.len()));
        Ok(conn.prepare_cached(&sql)?)
    }

    /// Runs a single-column key query once per batch and unions the results.
    /// `NULL`s in the result column are skipped.
    pub fn query_keys(
        &self,
        conn: &Connection,
        template: &str,
        keys: &[Key],
    ) -> Result<BTreeSet<Key>> {
        let mut out = BTreeSet::new();
        for chunk in self.chunks(keys) {
            let mut stmt = self.prepare(conn, template, chunk)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                row.get::<_, Option<Key>>(0)
            })?;
            for key in rows {
                if let Some(key) = key? {
                    out.insert(key);
                }
            }
        }
        Ok(out)
    }
}
