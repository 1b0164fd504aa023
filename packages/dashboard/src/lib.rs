#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location-detail dashboard.
//!
//! Ties the pure crates together around a [`MarketSource`]: a
//! [`Dashboard`] holds the user's selections, runs the fetch-and-reshape
//! step when they change, and derives the windowed, formatted view.
//! [`content`] provides the static leaderboards and forecast teaser.
//!
//! [`MarketSource`]: homescope_database::MarketSource

pub mod content;
pub mod fetch;
pub mod session;

pub use content::{Forecast, ForecastTeaser, Leaderboards, MarketEntry, forecast, leaderboards};
pub use fetch::{COUNTY_HINT, FetchResult, fetch_series, series_label};
pub use session::{Dashboard, DashboardView, LegendEntry, RefreshRequest, RefreshResult};

/// Errors that can occur loading dashboard content.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Embedded content failed to parse.
    #[error("Content error: {0}")]
    Content(#[from] toml::de::Error),
}

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use homescope_database::{DbError, MarketSource};
    use homescope_geography::NameFilter;
    use homescope_market_models::{
        GeoEntity, Granularity, Location, Observation, ValueType, Variable,
    };

    use crate::fetch::{COUNTY_HINT, fetch_series, series_label};

    fn var(id: i64, key: &str, label: &str, value_type: Option<ValueType>) -> Variable {
        Variable {
            id,
            key: key.to_string(),
            label: label.to_string(),
            category: Some("Prices".to_string()),
            description: None,
            value_type,
        }
    }

    pub fn catalog() -> Vec<Variable> {
        vec![
            var(1, "median_list_price", "Median List Price", Some(ValueType::Currency)),
            var(2, "hpi", "Home Price Index", Some(ValueType::Percent)),
            var(3, "active_listings", "Active Listings", Some(ValueType::Number)),
            var(4, "median_list_price_yoy", "Median List Price YoY", Some(ValueType::Percent)),
        ]
    }

    /// In-memory market data.
    pub struct FakeSource {
        fail: bool,
        entities: Vec<GeoEntity>,
        /// `(variable_id, geo_id, observations)`.
        observations: Vec<(i64, i64, Vec<Observation>)>,
    }

    fn obs(month: u32, value: f64, change: Option<f64>) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
            value,
            change,
        }
    }

    impl FakeSource {
        pub fn austin() -> Self {
            Self {
                fail: false,
                entities: vec![
                    GeoEntity {
                        id: 10,
                        name: "Austin-Round Rock-Georgetown, TX".to_string(),
                        geo_type: "msa".to_string(),
                    },
                    GeoEntity {
                        id: 20,
                        name: "Travis County, TX".to_string(),
                        geo_type: "county".to_string(),
                    },
                ],
                observations: vec![
                    (
                        1,
                        10,
                        vec![
                            obs(1, 400_000.0, None),
                            obs(2, 420_000.0, None),
                            obs(3, 460_000.0, None),
                        ],
                    ),
                    (
                        2,
                        10,
                        vec![
                            obs(1, 300.0, Some(0.01)),
                            obs(2, 303.0, Some(0.01)),
                            obs(3, 309.0, Some(0.02)),
                        ],
                    ),
                    (
                        1,
                        20,
                        vec![obs(2, 450_000.0, None), obs(4, 470_000.0, None)],
                    ),
                ],
            }
        }

        pub const fn failing() -> Self {
            Self {
                fail: true,
                entities: Vec::new(),
                observations: Vec::new(),
            }
        }

        fn check(&self) -> Result<(), DbError> {
            if self.fail {
                return Err(DbError::Conversion {
                    message: "connection refused".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl MarketSource for FakeSource {
        async fn variables(&self) -> Result<Vec<Variable>, DbError> {
            self.check()?;
            Ok(catalog())
        }

        async fn candidate_entities(
            &self,
            variable_id: i64,
            granularity: Granularity,
            _filter: &NameFilter,
        ) -> Result<Vec<GeoEntity>, DbError> {
            self.check()?;
            Ok(self
                .entities
                .iter()
                .filter(|e| e.geo_type == granularity.geo_type())
                .filter(|e| {
                    self.observations
                        .iter()
                        .any(|(v, g, _)| *v == variable_id && *g == e.id)
                })
                .cloned()
                .collect())
        }

        async fn observations(
            &self,
            variable_id: i64,
            geo_id: i64,
        ) -> Result<Vec<Observation>, DbError> {
            self.check()?;
            Ok(self
                .observations
                .iter()
                .find(|(v, g, _)| *v == variable_id && *g == geo_id)
                .map(|(_, _, o)| o.clone())
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn fetches_one_series_per_matched_pair() {
        let source = FakeSource::austin();
        let cat = catalog();
        let locations = vec![
            Location::new("Austin, TX", Granularity::Metro),
            Location::new("Travis County, TX", Granularity::County),
        ];
        let result = fetch_series(&source, &cat[..2], &locations).await;

        assert_eq!(
            result.labels(),
            vec![
                "Austin, TX - Median List Price",
                "Travis County, TX - Median List Price",
                "Austin, TX - Home Price Index",
            ]
        );
        assert!(result.hint.is_none());

        let hpi = &result.series[2];
        assert_eq!(hpi.points.len(), 2);
        assert!((hpi.points[1].value - 2.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn merged_rows_are_strictly_increasing() {
        let source = FakeSource::austin();
        let cat = catalog();
        let locations = vec![
            Location::new("Austin, TX", Granularity::Metro),
            Location::new("Travis County, TX", Granularity::County),
        ];
        let result = fetch_series(&source, &cat[..1], &locations).await;
        let rows = result.rows().unwrap();
        assert_eq!(rows.len(), 4);
        for w in rows.windows(2) {
            assert!(w[0].date < w[1].date);
        }
        let labels = result.labels();
        for row in &rows {
            assert!(row.values.keys().all(|k| labels.contains(k)));
        }
    }

    #[tokio::test]
    async fn later_match_clears_county_hint() {
        let source = FakeSource::austin();
        let cat = catalog();

        let miss_last = vec![
            Location::new("Austin, TX", Granularity::Metro),
            Location::new("Nowhere, ZZ", Granularity::Metro),
        ];
        let result = fetch_series(&source, &cat[..1], &miss_last).await;
        assert_eq!(result.hint.as_deref(), Some(COUNTY_HINT));
        assert_eq!(result.series.len(), 1);

        let miss_first = vec![
            Location::new("Nowhere, ZZ", Granularity::Metro),
            Location::new("Austin, TX", Granularity::Metro),
        ];
        let result = fetch_series(&source, &cat[..1], &miss_first).await;
        assert!(result.hint.is_none());
    }

    #[tokio::test]
    async fn unmatched_county_gives_no_hint() {
        let source = FakeSource::austin();
        let cat = catalog();
        let locations = vec![Location::new("Nowhere County, ZZ", Granularity::County)];
        let result = fetch_series(&source, &cat[..1], &locations).await;
        assert!(result.series.is_empty());
        assert!(result.hint.is_none());
        assert!(result.rows().is_none());
    }

    #[tokio::test]
    async fn source_errors_degrade_to_empty() {
        let source = FakeSource::failing();
        let cat = catalog();
        let locations = vec![Location::new("Austin, TX", Granularity::Metro)];
        let result = fetch_series(&source, &cat[..1], &locations).await;
        assert!(result.series.is_empty());
        assert!(result.hint.is_none());
    }

    #[test]
    fn single_variable_labels_by_location() {
        let cat = catalog();
        let loc = Location::new("Austin, TX", Granularity::Metro);
        assert_eq!(series_label(&loc, &cat[0], 1), "Austin, TX");
        assert_eq!(series_label(&loc, &cat[0], 2), "Austin, TX - Median List Price");
    }
}
