#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the homescope dashboard.
//!
//! Serves the JSON API the browser front end drives: the metric catalog,
//! location autocomplete, chart series for a selection, the static
//! leaderboards and forecast teaser, and account sign-up. Market data
//! comes from the hosted Postgres database; places and auth are optional
//! and answer `503` when not configured.

mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, Scope, middleware, web};
use homescope_auth::{AuthClient, AuthConfig};
use homescope_database::{MarketSource, PgMarketSource};
use homescope_places::{PlacesClient, PlacesConfig};

/// Shared application state.
pub struct AppState {
    /// Market data source.
    pub source: Arc<dyn MarketSource>,
    /// Places autocomplete client, if configured.
    pub places: Option<PlacesClient>,
    /// Auth provider client, if configured.
    pub auth: Option<AuthClient>,
}

/// Builds the `/api` scope.
#[must_use]
pub fn api_scope() -> Scope {
    web::scope("/api")
        .route("/health", web::get().to(handlers::health))
        .route("/variables", web::get().to(handlers::variables))
        .route("/places", web::get().to(handlers::places))
        .route("/places/{place_id}", web::get().to(handlers::place))
        .route("/series", web::post().to(handlers::series))
        .route("/markets", web::get().to(handlers::markets))
        .route("/forecast", web::get().to(handlers::forecast))
        .route("/auth/signup", web::post().to(handlers::sign_up))
        .route("/auth/oauth/{provider}", web::get().to(handlers::oauth))
}

/// Connects to the market database and builds the optional clients.
///
/// # Errors
///
/// Returns an error if the database connection fails.
#[allow(clippy::future_not_send)]
pub async fn build_state() -> Result<AppState, Box<dyn std::error::Error>> {
    log::info!("Connecting to database...");
    let source = PgMarketSource::from_env().await?;

    let http = reqwest::Client::new();

    let places = match PlacesConfig::from_env() {
        Ok(config) => Some(PlacesClient::new(http.clone(), config)),
        Err(e) => {
            log::warn!("Location search disabled: {e}");
            None
        }
    };

    let auth = match AuthConfig::from_env() {
        Ok(config) => Some(AuthClient::new(http, config)),
        Err(e) => {
            log::warn!("Sign-up disabled: {e}");
            None
        }
    };

    Ok(AppState {
        source: Arc::new(source),
        places,
        auth,
    })
}

/// Starts the homescope API server.
///
/// Connects to the market database, configures the places and auth
/// clients from the environment, and starts the Actix-Web HTTP server on
/// `BIND_ADDR:PORT`. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the database connection fails,
/// or if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let state = build_state()
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to database: {e}")))?;
    let state = web::Data::new(state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(api_scope())
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
