//! Dashboard session state.
//!
//! [`Dashboard`] is the single owner of everything the location-detail
//! screen shows: the metric catalog, both selections, the assembled chart
//! rows, the county hint, and the range slider. Every selection change
//! marks the chart stale; a refresh brings it back in line.
//!
//! Refreshes are split into [`Dashboard::begin_refresh`] (snapshot the
//! selection and take a generation number), [`RefreshRequest::run`] (the
//! slow part, which borrows nothing from the dashboard), and
//! [`Dashboard::complete_refresh`]. A result whose generation is older than
//! the last one applied is dropped, so an overlapping slow fetch can never
//! overwrite fresher data.

use std::collections::BTreeMap;
use std::sync::Arc;

use homescope_analytics::format::{format_percent_change, infer_variable};
use homescope_analytics::{RangePercent, ValueFormat, summarize, visible_rows};
use homescope_database::MarketSource;
use homescope_geography::LocationSelection;
use homescope_market_models::{AddOutcome, ChartRow, Location, Variable};
use homescope_variables::{
    VariableSelection, filter_by_name, find_by_key, group_by_category, visible_variables,
};
use serde::{Deserialize, Serialize};

use crate::fetch::{FetchResult, fetch_series};

/// A snapshot of the selection to fetch for.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshRequest {
    generation: u64,
    variables: Vec<Variable>,
    locations: Vec<Location>,
}

impl RefreshRequest {
    /// Generation this request was issued as.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs the fetch cycle for this snapshot.
    pub async fn run<S: MarketSource + ?Sized>(self, source: &S) -> RefreshResult {
        let fetched = if self.variables.is_empty() || self.locations.is_empty() {
            FetchResult::default()
        } else {
            fetch_series(source, &self.variables, &self.locations).await
        };

        RefreshResult {
            generation: self.generation,
            fetched,
        }
    }
}

/// Output of a [`RefreshRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshResult {
    generation: u64,
    fetched: FetchResult,
}

impl RefreshResult {
    /// Generation of the request that produced this result.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// One legend entry, ready to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    /// Series label.
    pub label: String,
    /// Series colour.
    pub color: String,
    /// Last visible value.
    pub last_value: Option<f64>,
    /// Last visible value, formatted.
    pub last_value_text: String,
    /// First-to-last change over the window, in percent.
    pub percent_change: Option<f64>,
    /// Signed change text, e.g. `+4.20%`.
    pub percent_change_text: String,
}

/// Everything the screen renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Selected locations.
    pub locations: Vec<Location>,
    /// Selected metrics.
    pub variables: Vec<Variable>,
    /// Rows inside the range window.
    pub rows: Vec<ChartRow>,
    /// Total number of assembled rows.
    pub total_rows: usize,
    /// One entry per series.
    pub legend: Vec<LegendEntry>,
    /// Contextual hint.
    pub hint: Option<String>,
    /// Slider position.
    pub range: RangePercent,
    /// Whether a refresh is outstanding.
    pub is_loading: bool,
    /// Whether the selection changed since the last applied refresh.
    pub is_stale: bool,
}

/// The location-detail session.
pub struct Dashboard<S: MarketSource + ?Sized> {
    source: Arc<S>,
    catalog: Vec<Variable>,
    locations: LocationSelection,
    variables: VariableSelection,
    rows: Option<Vec<ChartRow>>,
    labels: Vec<String>,
    hint: Option<String>,
    range: RangePercent,
    issued: u64,
    applied: u64,
    stale: bool,
}

impl<S: MarketSource + ?Sized> Dashboard<S> {
    /// Creates an empty session over `source`.
    #[must_use]
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            catalog: Vec::new(),
            locations: LocationSelection::new(),
            variables: VariableSelection::new(),
            rows: None,
            labels: Vec::new(),
            hint: None,
            range: RangePercent::FULL,
            issued: 0,
            applied: 0,
            stale: false,
        }
    }

    /// Loads the metric catalog. A failure leaves the catalog empty.
    pub async fn load_catalog(&mut self) {
        match self.source.variables().await {
            Ok(catalog) => {
                log::info!("Loaded {} catalog variables", catalog.len());
                self.catalog = catalog;
            }
            Err(e) => {
                log::error!("Failed to load variable catalog: {e}");
                self.catalog.clear();
            }
        }
    }

    /// Replaces the catalog directly.
    pub fn set_catalog(&mut self, catalog: Vec<Variable>) {
        self.catalog = catalog;
    }

    /// Full catalog, including derived variants.
    #[must_use]
    pub fn catalog(&self) -> &[Variable] {
        &self.catalog
    }

    /// Pickable metrics matching `query`, grouped by category.
    #[must_use]
    pub fn catalog_groups(&self, query: &str) -> BTreeMap<String, Vec<Variable>> {
        let visible = visible_variables(&self.catalog);
        let matching: Vec<Variable> = filter_by_name(&visible, query)
            .into_iter()
            .cloned()
            .collect();
        group_by_category(&matching)
    }

    /// Selected locations.
    #[must_use]
    pub const fn locations(&self) -> &LocationSelection {
        &self.locations
    }

    /// Selected metrics.
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        self.variables.as_slice()
    }

    /// Adds a location.
    pub fn add_location(&mut self, location: Location) -> AddOutcome {
        let outcome = self.locations.add(location);
        self.stale |= outcome.is_added();
        outcome
    }

    /// Removes a location by name.
    pub fn remove_location(&mut self, name: &str) -> bool {
        let removed = self.locations.remove(name);
        self.stale |= removed;
        removed
    }

    /// Selects a metric by catalog key. `None` if the key is unknown or
    /// names a hidden `_mom`/`_yoy` variant.
    pub fn select_variable(&mut self, key: &str) -> Option<AddOutcome> {
        let visible = visible_variables(&self.catalog);
        let variable = find_by_key(&visible, key)?.clone();
        let outcome = self.variables.select(variable);
        self.stale |= outcome.is_added();
        Some(outcome)
    }

    /// Deselects a metric.
    pub fn remove_variable(&mut self, key: &str) -> bool {
        let removed = self.variables.remove(key);
        self.stale |= removed;
        removed
    }

    /// Moves the range slider.
    pub fn set_range(&mut self, range: RangePercent) {
        self.range = range;
    }

    /// Whether the chart lags behind the selection.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Whether a refresh has been issued but not yet applied.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.issued > self.applied
    }

    /// Snapshots the selection for a refresh.
    pub fn begin_refresh(&mut self) -> RefreshRequest {
        self.issued += 1;
        self.stale = false;
        RefreshRequest {
            generation: self.issued,
            variables: self.variables.as_slice().to_vec(),
            locations: self.locations.as_slice().to_vec(),
        }
    }

    /// Applies a refresh result. Returns `false` if it was superseded.
    pub fn complete_refresh(&mut self, result: RefreshResult) -> bool {
        if result.generation <= self.applied {
            log::debug!(
                "Dropping refresh {} (already applied {})",
                result.generation,
                self.applied
            );
            return false;
        }

        self.applied = result.generation;
        self.labels = result.fetched.labels();
        self.rows = result.fetched.rows();
        self.hint = result.fetched.hint;
        true
    }

    /// Fetches and applies data for the current selection.
    pub async fn refresh(&mut self) {
        let request = self.begin_refresh();
        let result = request.run(self.source.as_ref()).await;
        self.complete_refresh(result);
    }

    /// Refreshes only if the selection changed.
    pub async fn refresh_if_stale(&mut self) {
        if self.stale {
            self.refresh().await;
        }
    }

    /// Assembled rows, `None` if nothing has data.
    #[must_use]
    pub fn rows(&self) -> Option<&[ChartRow]> {
        self.rows.as_deref()
    }

    /// Current hint.
    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Builds the derived view.
    #[must_use]
    pub fn view(&self) -> DashboardView {
        let all = self.rows.as_deref().unwrap_or_default();
        let visible = visible_rows(all, self.range);
        let selected = self.variables.as_slice();

        let legend = summarize(visible, &self.labels)
            .into_iter()
            .map(|s| {
                let format = ValueFormat::for_optional(infer_variable(&s.label, selected));
                LegendEntry {
                    last_value_text: format.legend(s.last_value),
                    percent_change_text: format_percent_change(s.percent_change),
                    label: s.label,
                    color: s.color,
                    last_value: s.last_value,
                    percent_change: s.percent_change,
                }
            })
            .collect();

        DashboardView {
            locations: self.locations.as_slice().to_vec(),
            variables: selected.to_vec(),
            rows: visible.to_vec(),
            total_rows: all.len(),
            legend,
            hint: self.hint.clone(),
            range: self.range,
            is_loading: self.is_loading(),
            is_stale: self.stale,
        }
    }
}
