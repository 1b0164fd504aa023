#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location, metric, and time-series types shared across homescope.
//!
//! These types describe what a user has selected (locations and metrics),
//! what the remote market database returns (geo-entities and
//! observations), and what the chart consumes (series and chart rows).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Maximum number of locations a user may compare at once.
pub const MAX_LOCATIONS: usize = 3;

/// Maximum number of metrics a user may chart at once.
pub const MAX_VARIABLES: usize = 2;

/// Result of trying to add an item to a capped selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    /// The item was appended.
    Added,
    /// An equivalent item is already selected; nothing changed.
    Duplicate,
    /// The selection is at capacity; nothing changed.
    Full,
}

impl AddOutcome {
    /// Returns `true` if the selection changed.
    #[must_use]
    pub const fn is_added(self) -> bool {
        matches!(self, Self::Added)
    }
}

/// Geographic resolution of a location.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Granularity {
    /// The whole country.
    National,
    /// A US state (or DC).
    State,
    /// A metropolitan statistical area.
    Metro,
    /// A county or county-equivalent.
    County,
    /// A five-digit ZIP code.
    Zip,
}

impl Granularity {
    /// Returns the `geo_type` value the market database uses for this
    /// granularity.
    #[must_use]
    pub const fn geo_type(self) -> &'static str {
        match self {
            Self::National => "country",
            Self::State => "state",
            Self::Metro => "msa",
            Self::County => "county",
            Self::Zip => "zip",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::National,
            Self::State,
            Self::Metro,
            Self::County,
            Self::Zip,
        ]
    }
}

/// A place the user has picked for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Display name (e.g. "Austin, TX", "90210", "California").
    pub name: String,
    /// Geographic resolution.
    pub granularity: Granularity,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub fn new(name: impl Into<String>, granularity: Granularity) -> Self {
        Self {
            name: name.into(),
            granularity,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.granularity)
    }
}

/// How a metric's values should be rendered.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ValueType {
    /// US dollars.
    Currency,
    /// A ratio (0.085 means 8.5%).
    Percent,
    /// A plain quantity.
    Number,
}

/// A metric from the market catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// Database primary key.
    pub id: i64,
    /// Stable machine key (e.g. `"median_list_price"`).
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Catalog grouping (e.g. "Prices", "Inventory").
    pub category: Option<String>,
    /// Free-text explanation shown next to the picker.
    pub description: Option<String>,
    /// Display formatting hint.
    pub value_type: Option<ValueType>,
}

/// A concrete geographic area in the market database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoEntity {
    /// Stable identifier.
    pub id: i64,
    /// Name as stored (e.g. "Austin-Round Rock-Georgetown, TX").
    pub name: String,
    /// Schema vocabulary type (`state`, `msa`, `county`, `zip`, `country`).
    pub geo_type: String,
}

/// One stored measurement for a (location, metric) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Observation date.
    pub date: NaiveDate,
    /// Raw value.
    pub value: f64,
    /// Precomputed period-over-period change as a ratio, when stored.
    pub change: Option<f64>,
}

/// A chart-ready point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Point date.
    pub date: NaiveDate,
    /// Display value.
    pub value: f64,
}

/// The points for one (location, metric) combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    /// Legend label; also the key used on [`ChartRow::values`].
    pub label: String,
    /// Key of the metric this series was built from.
    pub variable_key: String,
    /// Points in ascending date order.
    pub points: Vec<SeriesPoint>,
}

/// One x-axis position on the chart.
///
/// Series without a value on this date are absent from `values`, not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRow {
    /// Row date.
    pub date: NaiveDate,
    /// Series label to value.
    pub values: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granularity_parses_case_insensitively() {
        assert_eq!("ZIP".parse::<Granularity>().unwrap(), Granularity::Zip);
        assert_eq!("metro".parse::<Granularity>().unwrap(), Granularity::Metro);
        assert!("city".parse::<Granularity>().is_err());
    }

    #[test]
    fn granularity_maps_to_schema_vocabulary() {
        assert_eq!(Granularity::Metro.geo_type(), "msa");
        assert_eq!(Granularity::National.geo_type(), "country");
        for g in Granularity::all() {
            assert!(!g.geo_type().is_empty());
        }
    }

    #[test]
    fn value_type_display_matches_schema() {
        assert_eq!(ValueType::Currency.to_string(), "currency");
        assert_eq!("Percent".parse::<ValueType>().unwrap(), ValueType::Percent);
    }

    #[test]
    fn location_display_includes_granularity() {
        let loc = Location::new("Travis County, TX", Granularity::County);
        assert_eq!(loc.to_string(), "Travis County, TX (county)");
    }
}
