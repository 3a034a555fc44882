// Synthetic BAG-shaped source dataset shared by unit tests, integration
// tests and benches. Depends on rusqlite only so it can be mounted into the
// library with `#[path]`.
#![allow(dead_code)]

use rusqlite::{params, Connection};
use std::path::Path;

pub const SCHEMA: &str = include_str!("../fixtures/bag_schema.sql");

pub const ACTIVE: &str = "Naamgeving uitgegeven";
pub const WITHDRAWN: &str = "Naamgeving ingetrokken";

pub const UTRECHT: i64 = 3295;
pub const AMSTERDAM: i64 = 3594;
pub const ROTTERDAM: i64 = 3086;
pub const GRONINGEN: i64 = 1050;

/// Rows in `wpls`; Groningen has no streets.
pub const PLACES: usize = 4;
/// Distinct non-empty postcodes with at least one non-withdrawn address.
pub const ELIGIBLE_POSTCODES: usize = 18;
/// Eligible postcodes starting with `35`, one address each.
pub const UTRECHT_ELIGIBLE: usize = 5;

pub fn num_id(seq: usize) -> String {
    format!("0344200{seq:09}")
}

pub fn vbo_id(seq: usize) -> String {
    format!("0344010{seq:09}")
}

pub fn pnd_id(seq: usize) -> String {
    format!("0344100{seq:09}")
}

fn opr_id(wpl: i64, n: usize) -> String {
    format!("{wpl:04}300{n:09}")
}

/// `(postcode, place, status)` per address, in insertion order.
fn address_plan() -> Vec<(String, i64, &'static str)> {
    let mut plan = Vec::new();
    for c in 'A'..='E' {
        plan.push((format!("3511A{c}"), UTRECHT, ACTIVE));
    }
    plan.push(("3599ZZ".to_owned(), UTRECHT, WITHDRAWN));
    for c in 'A'..='F' {
        for _ in 0..3 {
            plan.push((format!("1011A{c}"), AMSTERDAM, ACTIVE));
        }
    }
    for c in 'A'..='F' {
        for _ in 0..3 {
            plan.push((format!("3011A{c}"), ROTTERDAM, ACTIVE));
        }
    }
    plan.push(("3012AA".to_owned(), ROTTERDAM, ACTIVE));
    plan.push(("3012AA".to_owned(), ROTTERDAM, WITHDRAWN));
    plan.push((String::new(), ROTTERDAM, ACTIVE));
    plan
}

fn origin(wpl: i64) -> (f64, f64) {
    match wpl {
        UTRECHT => (52.0907, 5.1214),
        AMSTERDAM => (52.3676, 4.9041),
        _ => (51.9244, 4.4777),
    }
}

/// Creates the schema and fills it.
pub fn populate(conn: &Connection) {
    conn.execute_batch(SCHEMA).expect("fixture schema");

    for (id, naam) in [
        (UTRECHT, "Utrecht"),
        (AMSTERDAM, "Amsterdam"),
        (ROTTERDAM, "Rotterdam"),
        (GRONINGEN, "Groningen"),
    ] {
        conn.execute(
            "INSERT INTO wpls VALUES (?1, ?2, 'Woonplaats aangewezen')",
            params![id, naam],
        )
        .unwrap();
    }

    for wpl in [UTRECHT, AMSTERDAM, ROTTERDAM] {
        for n in 0..2 {
            conn.execute(
                "INSERT INTO oprs VALUES (?1, ?2, 'Weg', 'Naamgeving uitgegeven', ?3)",
                params![opr_id(wpl, n), format!("Straat {wpl}-{n}"), wpl],
            )
            .unwrap();
        }
    }

    let plan = address_plan();
    let mut house = 0;
    let mut building = 0;
    let mut prev_postcode: Option<&str> = None;

    for (seq, (postcode, wpl, status)) in plan.iter().enumerate() {
        if prev_postcode != Some(postcode.as_str()) {
            house = 0;
            building += 1;
            conn.execute(
                "INSERT INTO pnds VALUES (?1, 'Pand in gebruik', ?2, ?3)",
                params![pnd_id(building * 2), 1900 + building as i64, vec![building as u8; 4]],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO pnds VALUES (?1, 'Pand in gebruik', NULL, NULL)",
                params![pnd_id(building * 2 + 1)],
            )
            .unwrap();
            prev_postcode = Some(postcode.as_str());
        }
        house += 1;

        conn.execute(
            "INSERT INTO nums VALUES (?1, ?2, ?3, NULL, NULL, ?4, ?5)",
            params![num_id(seq), postcode, house, status, opr_id(*wpl, seq % 2)],
        )
        .unwrap();

        let (lat, lon) = origin(*wpl);
        let lat = lat + seq as f64 * 0.0001;
        let lon = lon + seq as f64 * 0.0001;
        conn.execute(
            "INSERT INTO vbos VALUES (?1, 'Verblijfsobject in gebruik', 'woonfunctie', ?2, ?3, ?4, ?5, ?6)",
            params![vbo_id(seq), 60 + seq as i64, 136000.0 + seq as f64, 455000.0, lat, lon],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO geoindex VALUES (?1, ?2, ?2, ?3, ?3)",
            params![seq as i64 + 1, lat, lon],
        )
        .unwrap();

        conn.execute(
            "INSERT INTO vbo_num VALUES (?1, ?2)",
            params![vbo_id(seq), num_id(seq)],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO vbo_pnd VALUES (?1, ?2)",
            params![vbo_id(seq), pnd_id(building * 2)],
        )
        .unwrap();
        // First unit of every postcode also sits in an annex building.
        if house == 1 {
            conn.execute(
                "INSERT INTO vbo_pnd VALUES (?1, ?2)",
                params![vbo_id(seq), pnd_id(building * 2 + 1)],
            )
            .unwrap();
        }
    }

    // The last address of each 3-address postcode shares the unit of the
    // next postcode's first address.
    for seq in 0..plan.len() - 1 {
        let same_next = plan[seq + 1].0 == plan[seq].0;
        let third = seq >= 2 && plan[seq - 1].0 == plan[seq].0 && plan[seq - 2].0 == plan[seq].0;
        if third && !same_next {
            conn.execute(
                "INSERT INTO vbo_num VALUES (?1, ?2)",
                params![vbo_id(seq + 1), num_id(seq)],
            )
            .unwrap();
        }
    }

    // Never reachable from any address.
    conn.execute(
        "INSERT INTO vbos VALUES ('0344019999999999', 'Verblijfsobject gevormd', NULL, NULL, NULL, NULL, NULL, NULL)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO pnds VALUES ('0344109999999999', 'Bouwvergunning verleend', NULL, NULL)",
        [],
    )
    .unwrap();
}

pub fn source_in_memory() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    populate(&conn);
    conn
}

pub fn write_source(path: &Path) {
    let conn = Connection::open(path).unwrap();
    populate(&conn);
}

pub fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |r| r.get(0)).unwrap()
}
