//! bagdb-cli
//! =========
//!
//! Command-line interface for the `bagdb-core` sample extractor.
//!
//! This crate primarily provides a binary (`bagdb`). The library target only
//! exists so docs.rs renders this overview.
//!
//! Quick start
//! -----------
//!
//! ```text
//! cargo install bagdb-cli
//! bagdb extract --source bag.sqlite --target bag-sample.sqlite
//! bagdb validate bag-sample.sqlite
//! bagdb lookup 3511AB --db bag-sample.sqlite
//! ```
//!
//! For programmatic access use the `bagdb-core` crate directly.
#![cfg_attr(docsrs, feature(doc_cfg))]
