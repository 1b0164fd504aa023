#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Places autocomplete client.
//!
//! Backs the location search box. Suggestions are restricted to one
//! country and to region-level place types (states, counties, cities,
//! postal codes), so street addresses never show up. Picking a suggestion
//! fetches its address-component breakdown, which
//! [`homescope_geography::resolve_place`] turns into a location.
//!
//! See <https://developers.google.com/maps/documentation/places/web-service/autocomplete>

use homescope_geography::{AddressComponent, resolve_place};
use homescope_market_models::Location;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Errors from places operations.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-OK status.
    #[error("Places API returned {status}: {message}")]
    Status {
        /// Status string (e.g. `REQUEST_DENIED`).
        status: String,
        /// Error message from the service, if any.
        message: String,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// No API key configured.
    #[error("PLACES_API_KEY is not set")]
    MissingApiKey,
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct PlacesConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    /// API key.
    pub api_key: String,
    /// ISO country code suggestions are restricted to.
    pub country: String,
}

impl PlacesConfig {
    /// Reads `PLACES_API_KEY` and optional `PLACES_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::MissingApiKey`] if no key is configured.
    pub fn from_env() -> Result<Self, PlacesError> {
        let api_key = std::env::var("PLACES_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(PlacesError::MissingApiKey)?;
        let base_url = std::env::var("PLACES_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            base_url,
            api_key,
            country: "us".to_string(),
        })
    }
}

/// One dropdown suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Opaque id used to fetch details.
    pub place_id: String,
    /// Display text.
    pub description: String,
    /// Place types.
    pub types: Vec<String>,
}

/// Address breakdown for a picked suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetails {
    /// Address components.
    pub address_components: Vec<AddressComponent>,
    /// Full formatted label.
    pub formatted_address: Option<String>,
}

impl PlaceDetails {
    /// Resolves these details into a [`Location`].
    #[must_use]
    pub fn to_location(&self) -> Option<Location> {
        resolve_place(&self.address_components, self.formatted_address.as_deref())
    }
}

/// Places API client.
#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: reqwest::Client,
    config: PlacesConfig,
}

impl PlacesClient {
    /// Creates a client.
    #[must_use]
    pub fn new(client: reqwest::Client, config: PlacesConfig) -> Self {
        Self { client, config }
    }

    /// Fetches suggestions for partially typed `input`.
    ///
    /// Blank input returns no suggestions without a request.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError`] if the HTTP request or response parsing fails.
    pub async fn autocomplete(&self, input: &str) -> Result<Vec<Suggestion>, PlacesError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let components = format!("country:{}", self.config.country);
        let body: serde_json::Value = self
            .client
            .get(format!("{}/autocomplete/json", self.config.base_url))
            .query(&[
                ("input", input),
                ("types", "(regions)"),
                ("components", components.as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        parse_predictions(&body)
    }

    /// Fetches the address breakdown for a suggestion.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError`] if the HTTP request or response parsing fails.
    pub async fn details(&self, place_id: &str) -> Result<Option<PlaceDetails>, PlacesError> {
        let body: serde_json::Value = self
            .client
            .get(format!("{}/details/json", self.config.base_url))
            .query(&[
                ("place_id", place_id),
                ("fields", "address_component,formatted_address"),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        parse_details(&body)
    }

    /// Fetches details for a suggestion and resolves them to a location.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError`] if the HTTP request or response parsing fails.
    pub async fn resolve(&self, place_id: &str) -> Result<Option<Location>, PlacesError> {
        Ok(self
            .details(place_id)
            .await?
            .and_then(|d| d.to_location()))
    }
}

/// Checks the `status` field. `ZERO_RESULTS` is a successful empty answer.
fn check_status(body: &serde_json::Value) -> Result<bool, PlacesError> {
    let status = body["status"].as_str().unwrap_or("OK");
    match status {
        "OK" => Ok(true),
        "ZERO_RESULTS" | "NOT_FOUND" => Ok(false),
        other => {
            let message = body["error_message"].as_str().unwrap_or_default().to_string();
            log::error!("Places API error {other}: {message}");
            Err(PlacesError::Status {
                status: other.to_string(),
                message,
            })
        }
    }
}

/// Parses an autocomplete response.
fn parse_predictions(body: &serde_json::Value) -> Result<Vec<Suggestion>, PlacesError> {
    if !check_status(body)? {
        return Ok(Vec::new());
    }

    let predictions = body["predictions"]
        .as_array()
        .ok_or_else(|| PlacesError::Parse {
            message: "Autocomplete response has no predictions array".to_string(),
        })?;

    Ok(predictions
        .iter()
        .filter_map(|p| {
            let place_id = p["place_id"].as_str()?.to_string();
            let description = p["description"].as_str().unwrap_or_default().to_string();
            let types = p["types"]
                .as_array()
                .map(|ts| {
                    ts.iter()
                        .filter_map(|t| t.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default();
            Some(Suggestion {
                place_id,
                description,
                types,
            })
        })
        .collect())
}

/// Parses a place details response.
fn parse_details(body: &serde_json::Value) -> Result<Option<PlaceDetails>, PlacesError> {
    if !check_status(body)? {
        return Ok(None);
    }

    let result = &body["result"];
    if result.is_null() {
        return Ok(None);
    }

    let address_components: Vec<AddressComponent> = match result.get("address_components") {
        Some(components) => {
            serde_json::from_value(components.clone()).map_err(|e| PlacesError::Parse {
                message: format!("Invalid address_components: {e}"),
            })?
        }
        None => Vec::new(),
    };

    Ok(Some(PlaceDetails {
        address_components,
        formatted_address: result["formatted_address"].as_str().map(String::from),
    }))
}
