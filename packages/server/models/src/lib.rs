#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the homescope server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the domain types to allow independent evolution of the API
//! contract.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use homescope_market_models::{AddOutcome, ChartRow, Location, ValueType, Variable};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// A pickable metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVariable {
    /// Catalog key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Display value type.
    pub value_type: Option<ValueType>,
}

impl From<Variable> for ApiVariable {
    fn from(v: Variable) -> Self {
        Self {
            key: v.key,
            label: v.label,
            description: v.description,
            value_type: v.value_type,
        }
    }
}

/// One category of the metric picker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVariableGroup {
    /// Category name.
    pub category: String,
    /// Metrics in this category.
    pub variables: Vec<ApiVariable>,
}

/// Query parameters for the variables endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableQueryParams {
    /// Case-insensitive name filter.
    pub q: Option<String>,
}

/// Query parameters for the places autocomplete endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceQueryParams {
    /// Partially typed location text.
    pub input: String,
}

/// One autocomplete suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSuggestion {
    /// Id to pass to the place resolution endpoint.
    pub place_id: String,
    /// Display text.
    pub description: String,
}

/// Slider position in percent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRange {
    /// Left handle, 0 to 100.
    pub start: f64,
    /// Right handle, 0 to 100.
    pub end: f64,
}

/// Request body for the series endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSeriesRequest {
    /// Locations in selection order. Entries past the cap are ignored.
    pub locations: Vec<Location>,
    /// Variable keys in selection order. Entries past the cap are ignored.
    pub variables: Vec<String>,
    /// Slider position; the whole range when absent.
    pub range: Option<ApiRange>,
}

/// One chart row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiChartRow {
    /// Row date.
    pub date: NaiveDate,
    /// Series label to value.
    pub values: BTreeMap<String, f64>,
}

impl From<ChartRow> for ApiChartRow {
    fn from(row: ChartRow) -> Self {
        Self {
            date: row.date,
            values: row.values,
        }
    }
}

/// One legend entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLegendEntry {
    /// Series label.
    pub label: String,
    /// Series colour.
    pub color: String,
    /// Last visible value, formatted.
    pub latest: String,
    /// Signed change over the window, formatted.
    pub change: String,
}

/// What happened to a requested selection item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSelectionOutcome {
    /// Location name or variable key.
    pub item: String,
    /// `None` when a variable key is not in the catalog.
    pub outcome: Option<AddOutcome>,
}

/// Response body for the series endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSeriesResponse {
    /// Rows inside the window.
    pub rows: Vec<ApiChartRow>,
    /// Total rows before windowing.
    pub total_rows: usize,
    /// Legend entries.
    pub legend: Vec<ApiLegendEntry>,
    /// Contextual hint.
    pub hint: Option<String>,
    /// Per-item selection outcomes, in request order.
    pub selection: Vec<ApiSelectionOutcome>,
}

/// One leaderboard row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMarketEntry {
    /// Market name.
    pub name: String,
    /// Metric the ranking is by.
    pub metric: String,
    /// Raw value.
    pub value: f64,
    /// Value formatted for display.
    pub formatted: String,
}

/// Highest and lowest markets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLeaderboards {
    /// Most expensive markets.
    pub highest: Vec<ApiMarketEntry>,
    /// Cheapest markets.
    pub lowest: Vec<ApiMarketEntry>,
}

/// Query parameters for the forecast endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastQueryParams {
    /// Whether the caller has a subscription.
    #[serde(default)]
    pub subscribed: bool,
}

/// Request body for email sign-up.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSignUpRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Response body for email sign-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSignUpResponse {
    /// Where to navigate on success.
    pub redirect: Option<String>,
    /// Informational message (e.g. confirmation pending).
    pub notice: Option<String>,
    /// Inline error message.
    pub error: Option<String>,
}
