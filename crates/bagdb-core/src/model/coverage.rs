// crates/bagdb-core/src/model/coverage.rs
use crate::error::{BagError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Postcode area prefixes of the major Dutch cities.
static MAJOR_CITIES: Lazy<Vec<Region>> = Lazy::new(|| {
    [
        ("Amsterdam", "10"),
        ("Rotterdam", "30"),
        ("Den Haag", "25"),
        ("Utrecht", "35"),
        ("Eindhoven", "56"),
        ("Groningen", "97"),
    ]
    .into_iter()
    .map(|(label, prefix)| Region {
        label: label.to_owned(),
        prefix: prefix.to_owned(),
    })
    .collect()
});

/// Postcodes reserved for the major cities when no coverage is given.
pub const DEFAULT_COVERED_POSTCODES: usize = 250;
/// Root set size when none is given.
pub const DEFAULT_TOTAL_POSTCODES: usize = 1000;

/// A named postcode area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub label: String,
    /// Leading postcode digits, e.g. `"35"` for 3500-3599.
    pub prefix: String,
}

/// Which regions the root set must cover, and how densely.
///
/// JSON form:
///
/// ```json
/// { "per_region": 5, "regions": [ { "label": "Utrecht", "prefix": "35" } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSpec {
    pub regions: Vec<Region>,
    pub per_region: usize,
}

impl CoverageSpec {
    pub fn new(regions: Vec<Region>, per_region: usize) -> Result<Self> {
        let spec = Self {
            regions,
            per_region,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Six major cities sharing [`DEFAULT_COVERED_POSTCODES`] between them.
    pub fn major_cities() -> Self {
        let regions = MAJOR_CITIES.clone();
        let per_region = DEFAULT_COVERED_POSTCODES / regions.len();
        Self {
            regions,
            per_region,
        }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            BagError::NotFound(format!("Coverage spec not found at {}: {}", path.display(), e))
        })?;
        let spec: Self = serde_json::from_str(&text)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parses `LABEL=PREFIX`, as accepted on the command line.
    pub fn parse_region(arg: &str) -> Result<Region> {
        let (label, prefix) = arg
            .split_once('=')
            .ok_or_else(|| BagError::InvalidCoverage(format!("expected LABEL=PREFIX, got `{arg}`")))?;
        let region = Region {
            label: label.trim().to_owned(),
            prefix: prefix.trim().to_owned(),
        };
        check_region(&region)?;
        Ok(region)
    }

    pub fn validate(&self) -> Result<()> {
        for (i, region) in self.regions.iter().enumerate() {
            check_region(region)?;
            if self.regions[..i].iter().any(|r| r.label == region.label) {
                return Err(BagError::InvalidCoverage(format!(
                    "duplicate region `{}`",
                    region.label
                )));
            }
        }
        Ok(())
    }
}

impl Default for CoverageSpec {
    fn default() -> Self {
        Self::major_cities()
    }
}

fn check_region(region: &Region) -> Result<()> {
    if region.label.is_empty() {
        return Err(BagError::InvalidCoverage("empty region label".into()));
    }
    let p = &region.prefix;
    if p.is_empty() || p.len() > 4 || !p.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BagError::InvalidCoverage(format!(
            "region `{}`: prefix `{p}` must be 1-4 digits",
            region.label
        )));
    }
    Ok(())
}
