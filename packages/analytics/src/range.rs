//! Range-slider windowing and per-series summaries.
//!
//! The slider is a pair of percentages over the assembled rows. The window
//! always keeps at least two rows when the data has two, and a slider end
//! of 100% always includes the final row.

use homescope_market_models::ChartRow;
use serde::{Deserialize, Serialize};

use crate::series_color;

/// A slider position as `[start, end]` percentages of the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePercent {
    /// Left handle, 0 to 100.
    pub start: f64,
    /// Right handle, 0 to 100.
    pub end: f64,
}

impl Default for RangePercent {
    fn default() -> Self {
        Self::FULL
    }
}

impl RangePercent {
    /// The whole data set.
    pub const FULL: Self = Self {
        start: 0.0,
        end: 100.0,
    };

    /// Creates a range, clamping both handles to 0..=100 and swapping them
    /// if reversed. Non-finite handles fall back to the matching end of
    /// [`RangePercent::FULL`].
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        let clamp = |v: f64, fallback: f64| {
            if v.is_finite() {
                v.clamp(0.0, 100.0)
            } else {
                fallback
            }
        };
        let start = clamp(start, 0.0);
        let end = clamp(end, 100.0);
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scaled(len: usize, percent: f64, round_up: bool) -> usize {
    let raw = percent / 100.0 * len as f64;
    let idx = if round_up { raw.ceil() } else { raw.floor() };
    (idx.max(0.0) as usize).min(len)
}

/// Maps `range` onto `len` rows, returning `(start, end_exclusive)`.
#[must_use]
pub fn window_indices(len: usize, range: RangePercent) -> (usize, usize) {
    if len == 0 {
        return (0, 0);
    }

    let mut start = scaled(len, range.start, false).min(len - 1);
    let mut end = if range.end >= 100.0 {
        len
    } else {
        scaled(len, range.end, true)
    };

    if end <= start {
        end = start + 1;
    }

    if len >= 2 && end - start < 2 {
        if end < len {
            end += 1;
        } else {
            start -= 1;
        }
    }

    (start, end)
}

/// Returns the rows visible under `range`.
#[must_use]
pub fn visible_rows(rows: &[ChartRow], range: RangePercent) -> &[ChartRow] {
    let (start, end) = window_indices(rows.len(), range);
    &rows[start..end]
}

/// Percent change from `first` to `last`; `None` when `first` is zero.
#[must_use]
pub fn percent_change(first: f64, last: f64) -> Option<f64> {
    if first == 0.0 || !first.is_finite() || !last.is_finite() {
        return None;
    }
    Some((last - first) / first * 100.0)
}

/// What the legend shows for one series over the visible window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    /// Series label.
    pub label: String,
    /// Legend colour.
    pub color: String,
    /// First value in the window, if the series has one.
    pub first_value: Option<f64>,
    /// Last value in the window, if the series has one.
    pub last_value: Option<f64>,
    /// Percent change from first to last visible value.
    pub percent_change: Option<f64>,
}

/// Summarizes each label over `rows` (typically the visible window).
///
/// Colours follow the order of `labels`.
#[must_use]
pub fn summarize(rows: &[ChartRow], labels: &[String]) -> Vec<SeriesSummary> {
    labels
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let first_value = rows.iter().find_map(|r| r.values.get(label).copied());
            let last_value = rows.iter().rev().find_map(|r| r.values.get(label).copied());
            let percent_change = match (first_value, last_value) {
                (Some(first), Some(last)) => percent_change(first, last),
                _ => None,
            };
            SeriesSummary {
                label: label.clone(),
                color: series_color(idx).to_string(),
                first_value,
                last_value,
                percent_change,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn rows(values: &[(&str, &[f64])]) -> Vec<ChartRow> {
        let len = values.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        (0..len)
            .map(|i| {
                let mut map = BTreeMap::new();
                for (label, vals) in values {
                    if let Some(v) = vals.get(i) {
                        map.insert((*label).to_string(), *v);
                    }
                }
                ChartRow {
                    date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                        + chrono::Days::new(u64::try_from(i).unwrap()),
                    values: map,
                }
            })
            .collect()
    }

    #[test]
    fn full_range_includes_last_row() {
        for len in 1..50 {
            let (start, end) = window_indices(len, RangePercent::FULL);
            assert_eq!((start, end), (0, len));
        }
    }

    #[test]
    fn window_has_at_least_two_rows() {
        for len in 2..40 {
            for a in (0..=100).step_by(5) {
                for b in (a..=100).step_by(5) {
                    let r = RangePercent::new(f64::from(a), f64::from(b));
                    let (start, end) = window_indices(len, r);
                    assert!(end <= len, "len={len} range={r:?}");
                    assert!(end - start >= 2, "len={len} range={r:?} -> {start}..{end}");
                }
            }
        }
    }

    #[test]
    fn end_at_100_includes_last_row() {
        for len in 2..30 {
            for a in (0..=100).step_by(10) {
                let (_, end) = window_indices(len, RangePercent::new(f64::from(a), 100.0));
                assert_eq!(end, len);
            }
        }
    }

    #[test]
    fn single_row_and_empty() {
        assert_eq!(window_indices(1, RangePercent::new(50.0, 60.0)), (0, 1));
        assert_eq!(window_indices(0, RangePercent::FULL), (0, 0));
    }

    #[test]
    fn middle_window() {
        assert_eq!(window_indices(10, RangePercent::new(20.0, 50.0)), (2, 5));
    }

    #[test]
    fn range_new_clamps_and_orders() {
        assert_eq!(RangePercent::new(120.0, -5.0), RangePercent::new(0.0, 100.0));
        assert_eq!(
            RangePercent::new(70.0, 30.0),
            RangePercent {
                start: 30.0,
                end: 70.0
            }
        );
        assert_eq!(RangePercent::new(f64::NAN, f64::NAN), RangePercent::FULL);
    }

    #[test]
    fn summaries_use_first_and_last_visible_values() {
        let data = rows(&[("A", &[100.0, 110.0, 120.0, 150.0]), ("B", &[0.0, 5.0])]);
        let labels = vec!["A".to_string(), "B".to_string()];
        let visible = visible_rows(&data, RangePercent::new(25.0, 100.0));
        assert_eq!(visible.len(), 3);

        let summaries = summarize(visible, &labels);
        assert_eq!(summaries[0].first_value, Some(110.0));
        assert_eq!(summaries[0].last_value, Some(150.0));
        let pc = summaries[0].percent_change.unwrap();
        assert!((pc - 36.363_636).abs() < 1e-5);
        assert_eq!(summaries[0].color, series_color(0));

        assert_eq!(summaries[1].first_value, Some(5.0));
        assert_eq!(summaries[1].last_value, Some(5.0));
        assert_eq!(summaries[1].color, series_color(1));
    }

    #[test]
    fn percent_change_undefined_from_zero() {
        assert_eq!(percent_change(0.0, 10.0), None);
        assert_eq!(percent_change(10.0, 5.0), Some(-50.0));

        let data = rows(&[("B", &[0.0, 5.0])]);
        let summaries = summarize(&data, &["B".to_string()]);
        assert_eq!(summaries[0].percent_change, None);
        assert_eq!(summaries[0].last_value, Some(5.0));
    }
}
