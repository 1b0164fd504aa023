#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Market database access for homescope.
//!
//! Uses `switchy_database` raw SQL against a hosted Postgres instance that
//! stores the metric catalog, geo-entities, and observations. The
//! [`MarketSource`] trait is the seam the dashboard fetches through, so
//! the reshaping logic can run against any source of rows.

pub mod db;
pub mod queries;

use std::sync::Arc;

use async_trait::async_trait;
use homescope_geography::NameFilter;
use homescope_market_models::{GeoEntity, Granularity, Observation, Variable};
use switchy_database::Database;

pub use queries::{CANDIDATE_LIMIT, OBSERVATION_LIMIT};

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Where market rows come from.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Fetches the full metric catalog.
    async fn variables(&self) -> Result<Vec<Variable>, DbError>;

    /// Fetches up to [`CANDIDATE_LIMIT`] geo-entities of `granularity`
    /// with data for `variable_id`, loosely filtered by name.
    async fn candidate_entities(
        &self,
        variable_id: i64,
        granularity: Granularity,
        filter: &NameFilter,
    ) -> Result<Vec<GeoEntity>, DbError>;

    /// Fetches up to [`OBSERVATION_LIMIT`] observations, ascending by date.
    async fn observations(&self, variable_id: i64, geo_id: i64)
    -> Result<Vec<Observation>, DbError>;
}

/// [`MarketSource`] backed by the Postgres market database.
#[derive(Clone)]
pub struct PgMarketSource {
    db: Arc<dyn Database>,
}

impl PgMarketSource {
    /// Wraps an open database connection.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Connects using `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let db = db::connect_from_env().await?;
        Ok(Self::new(Arc::from(db)))
    }
}

#[async_trait]
impl MarketSource for PgMarketSource {
    async fn variables(&self) -> Result<Vec<Variable>, DbError> {
        queries::get_variables(self.db.as_ref()).await
    }

    async fn candidate_entities(
        &self,
        variable_id: i64,
        granularity: Granularity,
        filter: &NameFilter,
    ) -> Result<Vec<GeoEntity>, DbError> {
        queries::get_candidate_entities(self.db.as_ref(), variable_id, granularity, filter).await
    }

    async fn observations(
        &self,
        variable_id: i64,
        geo_id: i64,
    ) -> Result<Vec<Observation>, DbError> {
        queries::get_observations(self.db.as_ref(), variable_id, geo_id).await
    }
}
