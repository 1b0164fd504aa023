//! Observation to chart-point conversion.
//!
//! Most metrics chart their raw stored value. Metrics flagged by
//! [`is_period_change_metric`] chart the stored period-over-period change
//! instead, scaled from a ratio to percentage points. The first
//! chronological observation of a flagged metric has no prior period, so
//! it is dropped.

use homescope_market_models::{Observation, SeriesPoint};
use homescope_variables::is_period_change_metric;

/// Converts observations (ascending by date) for `variable_key` into chart
/// points.
///
/// Non-finite values are skipped. For flagged metrics, observations
/// without a stored change are skipped as well.
#[must_use]
pub fn series_points(variable_key: &str, observations: &[Observation]) -> Vec<SeriesPoint> {
    if is_period_change_metric(variable_key) {
        observations
            .iter()
            .skip(1)
            .filter_map(|o| {
                let change = o.change?;
                let value = change * 100.0;
                value.is_finite().then_some(SeriesPoint {
                    date: o.date,
                    value,
                })
            })
            .collect()
    } else {
        observations
            .iter()
            .filter(|o| o.value.is_finite())
            .map(|o| SeriesPoint {
                date: o.date,
                value: o.value,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(month: u32, value: f64, change: Option<f64>) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
            value,
            change,
        }
    }

    #[test]
    fn flagged_metric_drops_first_and_scales_change() {
        let observations = vec![
            obs(1, 300.0, None),
            obs(2, 305.0, Some(0.05)),
            obs(3, 270.0, Some(-0.115)),
        ];
        let points = series_points("hpi", &observations);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert!((points[0].value - 5.0).abs() < 1e-9);
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!((points[1].value - -11.5).abs() < 1e-9);
    }

    #[test]
    fn flagged_metric_drops_first_even_when_it_has_change() {
        let observations = vec![obs(1, 1.0, Some(0.5)), obs(2, 2.0, Some(0.25))];
        let points = series_points("case_shiller_hpi", &observations);
        assert_eq!(points.len(), 1);
        assert!((points[0].value - 25.0).abs() < 1e-9);
    }

    #[test]
    fn flagged_metric_drops_first_row_without_value() {
        let observations = vec![
            obs(1, f64::NAN, None),
            obs(2, f64::NAN, Some(0.02)),
            obs(3, 101.0, Some(0.01)),
        ];
        let points = series_points("hpi", &observations);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert!((points[0].value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn raw_metric_keeps_every_point() {
        let observations = vec![
            obs(1, 400_000.0, Some(0.01)),
            obs(2, f64::NAN, None),
            obs(3, 410_000.0, None),
        ];
        let points = series_points("median_list_price", &observations);
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, [400_000.0, 410_000.0]);
    }

    #[test]
    fn empty_input_yields_no_points() {
        assert!(series_points("hpi", &[]).is_empty());
        assert!(series_points("median_list_price", &[]).is_empty());
    }
}
