//! Series assembly.
//!
//! Joins any number of series on date. Each output row carries only the
//! series that have a value on that date; a missing series is left unset
//! rather than filled with zero.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use homescope_market_models::{ChartRow, Series};

/// Merges series into one row per distinct date, ascending.
///
/// Returns `None` if no series contributed a single point.
#[must_use]
pub fn merge_series(series: &[Series]) -> Option<Vec<ChartRow>> {
    let mut by_date: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();

    for s in series {
        for point in &s.points {
            by_date
                .entry(point.date)
                .or_default()
                .insert(s.label.clone(), point.value);
        }
    }

    if by_date.is_empty() {
        return None;
    }

    log::debug!(
        "Merged {} series into {} chart rows",
        series.len(),
        by_date.len()
    );

    Some(
        by_date
            .into_iter()
            .map(|(date, values)| ChartRow { date, values })
            .collect(),
    )
}
