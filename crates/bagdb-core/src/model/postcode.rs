// crates/bagdb-core/src/model/postcode.rs
use crate::error::{BagError, Result};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Dutch postcode: 4 digits followed by 2 letters, e.g. `3511AB`.
///
/// Values read from the dataset are taken as-is (the register contains a
/// few oddities); user input goes through [`Postcode::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Postcode(String);

impl Postcode {
    /// Normalizes and validates user input.
    ///
    /// Whitespace is removed anywhere in the string and letters are
    /// uppercased, so `" 3511 ab "` parses as `3511AB`.
    ///
    /// ```rust
    /// use bagdb_core::Postcode;
    ///
    /// assert_eq!(Postcode::parse("3511 ab").unwrap().as_str(), "3511AB");
    /// assert!(Postcode::parse("35AB11").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let normalized: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let bytes = normalized.as_bytes();
        let valid = bytes.len() == 6
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[4..].iter().all(u8::is_ascii_uppercase);

        if valid {
            Ok(Self(normalized))
        } else {
            Err(BagError::InvalidPostcode(input.trim().to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The leading digits a region prefix is matched against.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl FromSql for Postcode {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Postcode)
    }
}

impl ToSql for Postcode {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl fmt::Display for Postcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
