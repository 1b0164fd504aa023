//! Market database queries.
//!
//! Everything goes through `query_raw_params()`; the schema is small and
//! read-only from this side:
//!
//! - `variables(id, key, label, category, value_type, description)`
//! - `geo_entities(id, name, geo_type)`
//! - `observations(variable_id, geo_id, date, value, change)`

use homescope_geography::NameFilter;
use homescope_market_models::{GeoEntity, Granularity, Observation, ValueType, Variable};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Maximum candidate geo-entities fetched per (variable, location) pair.
pub const CANDIDATE_LIMIT: i64 = 100;

/// Maximum observations fetched per (variable, geo-entity) pair.
pub const OBSERVATION_LIMIT: i64 = 5000;

/// Fetches the full metric catalog.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_variables(db: &dyn Database) -> Result<Vec<Variable>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id::bigint AS id, key, label, category, value_type, description
             FROM variables
             ORDER BY id",
            &[],
        )
        .await?;

    let mut variables = Vec::with_capacity(rows.len());

    for row in &rows {
        let key: String = row.to_value("key").unwrap_or_default();
        if key.is_empty() {
            log::warn!("Skipping catalog row without a key");
            continue;
        }

        let value_type: Option<String> = row.to_value("value_type").unwrap_or(None);
        let value_type = value_type.and_then(|t| {
            t.parse::<ValueType>()
                .inspect_err(|_| log::debug!("Unknown value_type '{t}' on {key}"))
                .ok()
        });

        let label: String = row.to_value("label").unwrap_or_default();

        variables.push(Variable {
            id: row.to_value("id").unwrap_or(0),
            label: if label.is_empty() { key.clone() } else { label },
            key,
            category: row.to_value("category").unwrap_or(None),
            description: row.to_value("description").unwrap_or(None),
            value_type,
        });
    }

    Ok(variables)
}

/// Builds the candidate query. `$1` is the geo type, `$2` the variable id,
/// and `$3` the `ILIKE` pattern when `with_name_filter` is set.
fn candidate_sql(with_name_filter: bool) -> String {
    let mut sql = String::from(
        "SELECT g.id::bigint AS id, g.name, g.geo_type
         FROM geo_entities g
         WHERE g.geo_type = $1
           AND EXISTS (
               SELECT 1 FROM observations o
               WHERE o.geo_id = g.id AND o.variable_id = $2
           )",
    );
    if with_name_filter {
        sql.push_str(" AND g.name ILIKE $3");
    }
    sql.push_str(&format!(
        " ORDER BY length(g.name), g.name LIMIT {CANDIDATE_LIMIT}"
    ));
    sql
}

/// Builds the observation query. Rows with a null `value` are kept so a
/// period-change series drops its true first observation.
fn observations_sql() -> String {
    format!(
        "SELECT date::timestamp AS date, value::float8 AS value, change::float8 AS change
         FROM observations
         WHERE variable_id = $1 AND geo_id = $2
         ORDER BY date ASC
         LIMIT {OBSERVATION_LIMIT}"
    )
}

/// Fetches candidate geo-entities of `granularity` that have data for
/// `variable_id`, loosely filtered by name. Shorter names come first.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_candidate_entities(
    db: &dyn Database,
    variable_id: i64,
    granularity: Granularity,
    filter: &NameFilter,
) -> Result<Vec<GeoEntity>, DbError> {
    let pattern = filter.like_pattern();

    let mut params = vec![
        DatabaseValue::String(granularity.geo_type().to_string()),
        DatabaseValue::Int64(variable_id),
    ];
    if let Some(pattern) = &pattern {
        params.push(DatabaseValue::String(pattern.clone()));
    }

    let rows = db
        .query_raw_params(&candidate_sql(pattern.is_some()), &params)
        .await?;

    Ok(rows
        .iter()
        .map(|row| GeoEntity {
            id: row.to_value("id").unwrap_or(0),
            name: row.to_value("name").unwrap_or_default(),
            geo_type: row.to_value("geo_type").unwrap_or_default(),
        })
        .collect())
}

/// Fetches observations for one (variable, geo-entity) pair in ascending
/// date order.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_observations(
    db: &dyn Database,
    variable_id: i64,
    geo_id: i64,
) -> Result<Vec<Observation>, DbError> {
    let rows = db
        .query_raw_params(
            &observations_sql(),
            &[DatabaseValue::Int64(variable_id), DatabaseValue::Int64(geo_id)],
        )
        .await?;

    let mut observations = Vec::with_capacity(rows.len());

    for row in &rows {
        let date: chrono::NaiveDateTime = row.to_value("date").map_err(|e| DbError::Conversion {
            message: format!("Failed to parse observation date: {e}"),
        })?;

        observations.push(Observation {
            date: date.date(),
            value: row
                .to_value::<Option<f64>>("value")
                .ok()
                .flatten()
                .unwrap_or(f64::NAN),
            change: row.to_value("change").unwrap_or(None),
        });
    }

    Ok(observations)
}
