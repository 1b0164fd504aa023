//! Static side content: market leaderboards and the forecast teaser.
//!
//! Both are embedded TOML files under `content/`, parsed on demand.

use homescope_analytics::ValueFormat;
use homescope_analytics::format::format_percent_change;
use homescope_market_models::{Granularity, ValueType};
use serde::{Deserialize, Serialize};

use crate::DashboardError;

const MARKETS_TOML: &str = include_str!("../content/markets.toml");
const FORECAST_TOML: &str = include_str!("../content/forecast.toml");

/// One row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEntry {
    /// Market name.
    pub name: String,
    /// Market resolution.
    pub granularity: Granularity,
    /// Metric label the ranking is by.
    pub metric: String,
    /// Metric value.
    pub value: f64,
    /// How `value` is rendered.
    pub value_type: Option<ValueType>,
}

impl MarketEntry {
    /// Renders `value` the same way the chart would.
    #[must_use]
    pub fn formatted_value(&self) -> String {
        ValueFormat {
            value_type: self.value_type,
            period_change: false,
        }
        .format(self.value)
    }
}

/// Highest and lowest markets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboards {
    /// Most expensive markets, descending.
    pub highest: Vec<MarketEntry>,
    /// Cheapest markets, ascending.
    pub lowest: Vec<MarketEntry>,
}

/// Loads the embedded leaderboards.
///
/// # Errors
///
/// Returns [`DashboardError::Content`] if the embedded TOML is malformed.
pub fn leaderboards() -> Result<Leaderboards, DashboardError> {
    Ok(toml::de::from_str(MARKETS_TOML)?)
}

/// One forecast row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMarket {
    /// Market name.
    pub name: String,
    /// Forecast change in percent.
    pub change: f64,
}

/// The forecast as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Panel title.
    pub title: String,
    /// Teaser line shown to everyone.
    pub headline: String,
    /// Call to action shown on the lock.
    pub cta: String,
    /// Rows visible without a subscription.
    pub preview_points: usize,
    /// All forecast rows.
    pub markets: Vec<ForecastMarket>,
}

/// What a given viewer gets to see of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastTeaser {
    /// Panel title.
    pub title: String,
    /// Teaser line.
    pub headline: String,
    /// Visible rows as `(name, signed change)`.
    pub rows: Vec<(String, String)>,
    /// Number of rows behind the paywall.
    pub hidden: usize,
    /// Lock call to action, absent for subscribers.
    pub cta: Option<String>,
}

impl Forecast {
    /// Builds the view for a viewer.
    #[must_use]
    pub fn teaser(&self, subscribed: bool) -> ForecastTeaser {
        let visible = if subscribed {
            self.markets.len()
        } else {
            self.preview_points.min(self.markets.len())
        };

        ForecastTeaser {
            title: self.title.clone(),
            headline: self.headline.clone(),
            rows: self.markets[..visible]
                .iter()
                .map(|m| (m.name.clone(), format_percent_change(Some(m.change))))
                .collect(),
            hidden: self.markets.len() - visible,
            cta: (!subscribed).then(|| self.cta.clone()),
        }
    }
}

/// Loads the embedded forecast.
///
/// # Errors
///
/// Returns [`DashboardError::Content`] if the embedded TOML is malformed.
pub fn forecast() -> Result<Forecast, DashboardError> {
    Ok(toml::de::from_str(FORECAST_TOML)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaderboards_parse_and_are_ordered() {
        let boards = leaderboards().unwrap();
        assert!(!boards.highest.is_empty());
        assert!(!boards.lowest.is_empty());
        for w in boards.highest.windows(2) {
            assert!(w[0].value >= w[1].value, "{} < {}", w[0].name, w[1].name);
        }
        for w in boards.lowest.windows(2) {
            assert!(w[0].value <= w[1].value, "{} > {}", w[0].name, w[1].name);
        }
    }

    #[test]
    fn leaderboard_values_format_as_currency() {
        let boards = leaderboards().unwrap();
        assert_eq!(boards.highest[0].formatted_value(), "$1,450,000");
    }

    #[test]
    fn teaser_locks_all_but_preview() {
        let fc = forecast().unwrap();
        let locked = fc.teaser(false);
        assert_eq!(locked.rows.len(), fc.preview_points);
        assert_eq!(locked.hidden, fc.markets.len() - fc.preview_points);
        assert!(locked.cta.is_some());
        assert_eq!(locked.rows[0].1, "-2.40%");

        let open = fc.teaser(true);
        assert_eq!(open.rows.len(), fc.markets.len());
        assert_eq!(open.hidden, 0);
        assert!(open.cta.is_none());
    }
}
