// crates/bagdb-core/src/lookup.rs

//! Postcode → coordinate lookups through the label view.
//!
//! This is the read path downstream consumers use; a sample database is only
//! useful if these queries behave the same as against the full dataset.

use crate::error::Result;
use crate::model::{quote_ident, Layout, Postcode};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostcodeHit {
    pub postcode: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub woonplaats: Option<String>,
}

impl PostcodeHit {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            postcode: row.get(0)?,
            lat: row.get(1)?,
            lon: row.get(2)?,
            woonplaats: row.get(3)?,
        })
    }
}

fn hit_query(layout: &Layout, filtered: bool) -> String {
    let view = &layout.label_view;
    let postcode = quote_ident(view.postcode);
    let filter = if filtered {
        format!(" WHERE {postcode} = ?1")
    } else {
        String::new()
    };
    format!(
        "SELECT {postcode}, {}, {}, {} FROM {}{filter} LIMIT 1",
        quote_ident(view.lat),
        quote_ident(view.lon),
        quote_ident(view.place),
        quote_ident(view.name)
    )
}

/// First label-view row for `postcode`.
pub fn lookup(conn: &Connection, postcode: &Postcode) -> Result<Option<PostcodeHit>> {
    lookup_in(conn, &Layout::BAG, postcode)
}

pub fn lookup_in(
    conn: &Connection,
    layout: &Layout,
    postcode: &Postcode,
) -> Result<Option<PostcodeHit>> {
    Ok(conn
        .query_row(&hit_query(layout, true), [postcode], PostcodeHit::from_row)
        .optional()?)
}

/// Any one row of the label view.
pub fn sample(conn: &Connection, layout: &Layout) -> Result<Option<PostcodeHit>> {
    Ok(conn
        .query_row(&hit_query(layout, false), [], PostcodeHit::from_row)
        .optional()?)
}
