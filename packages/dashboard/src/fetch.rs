//! The fetch-and-reshape step.
//!
//! For every selected (variable, location) pair: fetch loosely filtered
//! candidate geo-entities, pick the first that satisfies the strict
//! matching rule, fetch its observations, and convert them to chart
//! points. Pairs run one after another. A pair that fails or finds no
//! match contributes nothing; the remaining pairs still run.

use homescope_analytics::{merge_series, series_points};
use homescope_database::MarketSource;
use homescope_geography::{NameFilter, select_match};
use homescope_market_models::{ChartRow, Granularity, Location, Series, Variable};

/// Shown when a metro search found nothing.
pub const COUNTY_HINT: &str =
    "No metro-level data found for that area. Try searching for the county instead.";

/// Output of one fetch cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResult {
    /// One series per matched pair, in variable-major selection order.
    pub series: Vec<Series>,
    /// User-facing hint, if the cycle ended on an unmatched metro.
    pub hint: Option<String>,
}

impl FetchResult {
    /// Labels of the produced series, in order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.series.iter().map(|s| s.label.clone()).collect()
    }

    /// Merges the series into chart rows.
    #[must_use]
    pub fn rows(&self) -> Option<Vec<ChartRow>> {
        merge_series(&self.series)
    }
}

/// Label for the series of one pair.
///
/// With several variables selected the variable label is appended so
/// series of the same location stay distinguishable.
#[must_use]
pub fn series_label(location: &Location, variable: &Variable, variable_count: usize) -> String {
    if variable_count > 1 {
        format!("{} - {}", location.name, variable.label)
    } else {
        location.name.clone()
    }
}

/// Fetches one pair. `Ok(None)` means no geo-entity matched.
async fn fetch_pair<S: MarketSource + ?Sized>(
    source: &S,
    variable: &Variable,
    location: &Location,
    label: String,
) -> Result<Option<Series>, homescope_database::DbError> {
    let filter = NameFilter::for_location(location);
    let candidates = source
        .candidate_entities(variable.id, location.granularity, &filter)
        .await?;

    let Some(entity) = select_match(location, &candidates) else {
        return Ok(None);
    };

    log::debug!(
        "Matched {location} to geo-entity {} ({}) for {}",
        entity.id,
        entity.name,
        variable.key
    );

    let observations = source.observations(variable.id, entity.id).await?;

    Ok(Some(Series {
        label,
        variable_key: variable.key.clone(),
        points: series_points(&variable.key, &observations),
    }))
}

/// Runs the fetch cycle for the current selection.
pub async fn fetch_series<S: MarketSource + ?Sized>(
    source: &S,
    variables: &[Variable],
    locations: &[Location],
) -> FetchResult {
    let mut result = FetchResult::default();

    for variable in variables {
        for location in locations {
            let label = series_label(location, variable, variables.len());

            match fetch_pair(source, variable, location, label).await {
                Ok(Some(series)) => {
                    result.hint = None;
                    result.series.push(series);
                }
                Ok(None) => {
                    log::info!("No geo-entity matched {location} for {}", variable.key);
                    if location.granularity == Granularity::Metro {
                        result.hint = Some(COUNTY_HINT.to_string());
                    }
                }
                Err(e) => {
                    log::error!("Failed to fetch {} for {location}: {e}", variable.key);
                }
            }
        }
    }

    result
}
