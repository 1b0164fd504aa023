#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Chart data preparation for market time series.
//!
//! Everything here is a pure function of already-fetched data:
//!
//! - [`period`] turns raw observations into chart points, substituting
//!   the stored period-over-period change for flagged metrics.
//! - [`merge`] unions any number of series into one row per date.
//! - [`range`] maps a percentage slider onto a row window and summarizes
//!   each series over that window.
//! - [`format`] renders values for axis ticks, tooltips, and the legend.

pub mod format;
pub mod merge;
pub mod period;
pub mod range;

pub use format::ValueFormat;
pub use merge::merge_series;
pub use period::series_points;
pub use range::{RangePercent, SeriesSummary, summarize, visible_rows, window_indices};

/// Fixed legend colours, assigned by series order and wrapping after six.
pub const SERIES_COLORS: [&str; 6] = [
    "#2563eb", "#dc2626", "#16a34a", "#d97706", "#7c3aed", "#0891b2",
];

/// Returns the colour for the series at `index`.
#[must_use]
pub const fn series_color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_wrap_after_six() {
        assert_eq!(series_color(0), series_color(6));
        assert_ne!(series_color(0), series_color(1));
    }
}
