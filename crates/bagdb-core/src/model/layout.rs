// crates/bagdb-core/src/model/layout.rs

//! Static description of the BAG dataset tables the extractor walks.

use serde::Serialize;

/// An entity table with a single-column key.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntityTable {
    pub name: &'static str,
    pub key: &'static str,
}

/// A many-to-many relation expressed purely by two foreign keys.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JunctionTable {
    pub name: &'static str,
    pub left: &'static str,
    pub right: &'static str,
}

/// The denormalized per-address view and the columns lookups read from it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LabelView {
    pub name: &'static str,
    pub postcode: &'static str,
    pub lat: &'static str,
    pub lon: &'static str,
    pub place: &'static str,
}

/// Table and column names of the source dataset.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Layout {
    /// Addresses (`nummeraanduidingen`).
    pub addresses: EntityTable,
    pub postcode_column: &'static str,
    pub status_column: &'static str,
    /// Address column referencing its street.
    pub street_ref_column: &'static str,
    /// Lifecycle status that makes an address ineligible as a root.
    pub withdrawn_status: &'static str,

    /// Streets / public spaces (`openbare ruimten`).
    pub streets: EntityTable,
    /// Dwelling units (`verblijfsobjecten`).
    pub dwelling_units: EntityTable,
    /// Buildings (`panden`).
    pub buildings: EntityTable,
    /// Places (`woonplaatsen`), always copied in full.
    pub places: &'static str,

    /// Address ↔ dwelling unit; `left` is the address key.
    pub address_units: JunctionTable,
    /// Dwelling unit ↔ building; `left` is the unit key.
    pub unit_buildings: JunctionTable,

    /// Read by downstream consumers.
    pub label_view: LabelView,
}

impl Layout {
    pub const BAG: Layout = Layout {
        addresses: EntityTable { name: "nums", key: "id" },
        postcode_column: "postcode",
        status_column: "status",
        street_ref_column: "ligtAanRef",
        withdrawn_status: "Naamgeving ingetrokken",
        streets: EntityTable { name: "oprs", key: "id" },
        dwelling_units: EntityTable { name: "vbos", key: "id" },
        buildings: EntityTable { name: "pnds", key: "id" },
        places: "wpls",
        address_units: JunctionTable {
            name: "vbo_num",
            left: "num",
            right: "vbo",
        },
        unit_buildings: JunctionTable {
            name: "vbo_pnd",
            left: "vbo",
            right: "pnd",
        },
        label_view: LabelView {
            name: "unilabel",
            postcode: "postcode",
            lat: "lat",
            lon: "lon",
            place: "woonplaats",
        },
    };

    /// Every table the validator counts, in copy order.
    pub fn tables(&self) -> [&'static str; 7] {
        [
            self.addresses.name,
            self.dwelling_units.name,
            self.streets.name,
            self.buildings.name,
            self.places,
            self.address_units.name,
            self.unit_buildings.name,
        ]
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::BAG
    }
}

/// Quotes an SQL identifier. Names come from [`Layout`] or the source
/// catalog, never from user input, but may contain mixed case.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
