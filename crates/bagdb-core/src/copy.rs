// crates/bagdb-core/src/copy.rs

//! # Bulk Copier
//!
//! Moves rows from source to target for the keys of a [`ClosureSet`].
//! Column lists are read from the source at copy time and reused verbatim
//! for the insert, so columns added upstream travel along without code
//! changes. Each table is copied inside one target transaction: a crash
//! leaves whole tables either copied or empty.
//!
//! [`ClosureSet`]: crate::closure::ClosureSet

use crate::error::{BagError, Result};
use crate::model::{quote_ident, Key};
use crate::params::{placeholders, InList, KEYS_MARKER};
use crate::report::{CopyMode, RunReport};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::collections::BTreeSet;
use tracing::info;

/// Column names of `table` in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    if columns.is_empty() {
        return Err(BagError::MissingTable(table.to_owned()));
    }
    Ok(columns)
}

fn column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn select_sql(table: &str, columns: &[String], key_column: Option<&str>) -> String {
    let mut sql = format!("SELECT {} FROM {}", column_list(columns), quote_ident(table));
    if let Some(key) = key_column {
        sql.push_str(&format!(" WHERE {} IN ({KEYS_MARKER})", quote_ident(key)));
    }
    sql
}

fn insert_sql(table: &str, columns: &[String]) -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        column_list(columns),
        placeholders(columns.len())
    )
}

pub struct Copier<'a> {
    source: &'a Connection,
    target: &'a mut Connection,
    in_list: InList,
}

impl<'a> Copier<'a> {
    pub fn new(source: &'a Connection, target: &'a mut Connection) -> Self {
        let in_list = InList::for_connection(source, 0);
        Self {
            source,
            target,
            in_list,
        }
    }

    /// Overrides the batch size derived from the source connection.
    pub fn with_in_list(mut self, in_list: InList) -> Self {
        self.in_list = in_list;
        self
    }

    /// Copies the rows of `table` whose `key_column` is in `ids`.
    pub fn copy_entity(
        &mut self,
        table: &str,
        key_column: &str,
        ids: &BTreeSet<Key>,
        report: &mut RunReport,
    ) -> Result<u64> {
        if ids.is_empty() {
            report.warn(format!("{table}: no keys selected, nothing copied"));
            report.record_copy(table, CopyMode::Entity, 0);
            return Ok(0);
        }
        let columns = table_columns(self.source, table)?;
        let keys: Vec<Key> = ids.iter().cloned().collect();
        let select = select_sql(table, &columns, Some(key_column));
        let batches: Vec<&[Key]> = self.in_list.chunks(&keys).collect();

        let copied = self.transfer(table, &columns, &select, &batches, |_| true)?;
        info!(table, rows = copied, "copied filtered table");
        report.record_copy(table, CopyMode::Entity, copied);
        Ok(copied)
    }

    /// Copies the rows of a junction table whose `col_a` is in `ids_a` AND
    /// whose `col_b` is in `ids_b`. A row with only one endpoint in the
    /// sample would dangle in the target, so it is dropped.
    ///
    /// Batches run over `ids_a` only; `col_b` is checked in memory, which
    /// keeps every statement within a single batch of parameters.
    pub fn copy_junction(
        &mut self,
        table: &str,
        col_a: &str,
        ids_a: &BTreeSet<Key>,
        col_b: &str,
        ids_b: &BTreeSet<Key>,
        report: &mut RunReport,
    ) -> Result<u64> {
        if ids_a.is_empty() || ids_b.is_empty() {
            report.warn(format!("{table}: no keys selected, nothing copied"));
            report.record_copy(table, CopyMode::Junction, 0);
            return Ok(0);
        }
        let columns = table_columns(self.source, table)?;
        let b_index = columns.iter().position(|c| c == col_b).ok_or_else(|| {
            BagError::SchemaMismatch {
                name: table.to_owned(),
                source: rusqlite::Error::InvalidColumnName(col_b.to_owned()),
            }
        })?;

        let keys: Vec<Key> = ids_a.iter().cloned().collect();
        let select = select_sql(table, &columns, Some(col_a));
        let batches: Vec<&[Key]> = self.in_list.chunks(&keys).collect();

        let copied = self.transfer(table, &columns, &select, &batches, |row| {
            Key::from_value(&row[b_index]).is_some_and(|k| ids_b.contains(&k))
        })?;
        info!(table, rows = copied, "copied junction table");
        report.record_copy(table, CopyMode::Junction, copied);
        Ok(copied)
    }

    /// Copies every row of a small reference table.
    pub fn copy_full_table(&mut self, table: &str, report: &mut RunReport) -> Result<u64> {
        let columns = table_columns(self.source, table)?;
        let select = select_sql(table, &columns, None);
        let unfiltered: &[Key] = &[];

        let copied = self.transfer(table, &columns, &select, &[unfiltered], |_| true)?;
        info!(table, rows = copied, "copied full table");
        report.record_copy(table, CopyMode::Full, copied);
        Ok(copied)
    }

    fn transfer(
        &mut self,
        table: &str,
        columns: &[String],
        select: &str,
        batches: &[&[Key]],
        keep: impl Fn(&[Value]) -> bool,
    ) -> Result<u64> {
        let tx = self.target.transaction()?;
        let mut copied = 0u64;
        {
            let mut insert = tx.prepare(&insert_sql(table, columns))?;
            for batch in batches {
                let mut stmt = self.in_list.prepare(self.source, select, batch)?;
                let mut rows = stmt.query(params_from_iter(batch.iter()))?;
                while let Some(row) = rows.next()? {
                    let values = (0..columns.len())
                        .map(|i| row.get::<_, Value>(i))
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    if keep(&values) {
                        insert.execute(params_from_iter(values.iter()))?;
                        copied += 1;
                    }
                }
            }
        }
        tx.commit()?;
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;
    use crate::schema::mirror_schema;

    fn empty_target(source: &Connection) -> Connection {
        let target = Connection::open_in_memory().unwrap();
        mirror_schema(source, &target).unwrap();
        target
    }

    fn keys(ids: impl IntoIterator<Item = String>) -> BTreeSet<Key> {
        ids.into_iter().map(Key::Text).collect()
    }

    fn dump(conn: &Connection, sql: &str) -> Vec<Vec<Value>> {
        let mut stmt = conn.prepare(sql).unwrap();
        let n = stmt.column_count();
        stmt.query_map([], |row| (0..n).map(|i| row.get::<_, Value>(i)).collect())
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn columns_follow_declaration_order() {
        let source = fixture::source_in_memory();
        let cols = table_columns(&source, "nums").unwrap();
        assert_eq!(cols.first().map(String::as_str), Some("id"));
        assert_eq!(cols.last().map(String::as_str), Some("ligtAanRef"));
        assert!(matches!(
            table_columns(&source, "nope"),
            Err(BagError::MissingTable(_))
        ));
    }

    #[test]
    fn chunked_copy_equals_single_batch_copy() {
        let source = fixture::source_in_memory();
        let ids = keys((0..40).map(fixture::vbo_id));

        let mut small = empty_target(&source);
        let mut wide = empty_target(&source);
        let mut report = RunReport::default();

        let n_small = Copier::new(&source, &mut small)
            .with_in_list(InList::with_batch(3))
            .copy_entity("vbos", "id", &ids, &mut report)
            .unwrap();
        let n_wide = Copier::new(&source, &mut wide)
            .with_in_list(InList::with_batch(10_000))
            .copy_entity("vbos", "id", &ids, &mut report)
            .unwrap();

        assert_eq!(n_small, n_wide);
        assert_eq!(n_small, 40);
        let q = "SELECT * FROM vbos ORDER BY id";
        assert_eq!(dump(&small, q), dump(&wide, q));
        assert_eq!(dump(&small, q), {
            let mut stmt = source
                .prepare("SELECT * FROM vbos WHERE id < '0344010000000040' ORDER BY id")
                .unwrap();
            let n = stmt.column_count();
            stmt.query_map([], |row| (0..n).map(|i| row.get::<_, Value>(i)).collect())
                .unwrap()
                .collect::<rusqlite::Result<Vec<Vec<Value>>>>()
                .unwrap()
        });
    }

    #[test]
    fn addresses_copy_before_their_streets() {
        let source = fixture::source_in_memory();
        let mut target = Connection::open_in_memory().unwrap();
        target.pragma_update(None, "foreign_keys", true).unwrap();
        mirror_schema(&source, &target).unwrap();
        let mut report = RunReport::default();

        // nums.ligtAanRef references oprs, which is still empty
        let nums = keys((0..5).map(fixture::num_id));
        let copied = Copier::new(&source, &mut target)
            .copy_entity("nums", "id", &nums, &mut report)
            .unwrap();
        assert_eq!(copied, 5);

        let enforced: i64 = target
            .query_row("PRAGMA foreign_keys", [], |r| r.get(0))
            .unwrap();
        assert_eq!(enforced, 0);
        assert_eq!(fixture::count(&target, "SELECT COUNT(*) FROM oprs"), 0);
    }

    #[test]
    fn junction_rows_need_both_endpoints() {
        let source = fixture::source_in_memory();
        let mut target = empty_target(&source);
        let mut report = RunReport::default();

        // Addresses 6..=8 (1011AA) and units 6..=9; unit 9 is shared with
        // address 9 of 1011AB, which is not selected.
        let nums = keys((6..=8).map(fixture::num_id));
        let vbos = keys((6..=9).map(fixture::vbo_id));

        let copied = Copier::new(&source, &mut target)
            .with_in_list(InList::with_batch(2))
            .copy_junction("vbo_num", "num", &nums, "vbo", &vbos, &mut report)
            .unwrap();

        // own rows for 6, 7, 8 plus (vbo 9, num 8)
        assert_eq!(copied, 4);
        let dangling = fixture::count(
            &target,
            &format!(
                "SELECT COUNT(*) FROM vbo_num WHERE num = '{}'",
                fixture::num_id(9)
            ),
        );
        assert_eq!(dangling, 0);
    }

    #[test]
    fn empty_key_sets_copy_nothing_and_warn() {
        let source = fixture::source_in_memory();
        let mut target = empty_target(&source);
        let mut report = RunReport::default();
        let mut copier = Copier::new(&source, &mut target);

        let none = BTreeSet::new();
        let some = keys([fixture::vbo_id(0)]);
        assert_eq!(copier.copy_entity("pnds", "id", &none, &mut report).unwrap(), 0);
        assert_eq!(
            copier
                .copy_junction("vbo_pnd", "vbo", &some, "pnd", &none, &mut report)
                .unwrap(),
            0
        );
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.rows_copied("pnds"), Some(0));
    }

    #[test]
    fn full_copy_keeps_every_row_and_blob() {
        let source = fixture::source_in_memory();
        let mut target = empty_target(&source);
        let mut report = RunReport::default();
        let mut copier = Copier::new(&source, &mut target);

        let places = copier.copy_full_table("wpls", &mut report).unwrap();
        assert_eq!(places as usize, fixture::PLACES);

        let all_pnds = copier.copy_full_table("pnds", &mut report).unwrap();
        assert_eq!(all_pnds as i64, fixture::count(&source, "SELECT COUNT(*) FROM pnds"));
        let q = "SELECT * FROM pnds ORDER BY id";
        assert_eq!(dump(&target, q), dump(&source, q));
    }
}
