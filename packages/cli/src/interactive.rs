//! Interactive menu for the homescope CLI.
//!
//! Mirrors the location-detail screen: search and add up to three
//! locations, pick up to two metrics, then view the chart window and
//! legend. Location search goes through the places autocomplete when
//! `PLACES_API_KEY` is set, and falls back to typing a name and picking
//! a granularity otherwise.

use std::sync::Arc;

use dialoguer::{Confirm, Input, Password, Select};
use homescope_analytics::RangePercent;
use homescope_auth::{AuthClient, AuthConfig, SignUpForm};
use homescope_dashboard::Dashboard;
use homescope_database::{MarketSource, PgMarketSource};
use homescope_market_models::{AddOutcome, Granularity, Location};
use homescope_places::{PlacesClient, PlacesConfig};

use crate::render;

/// Top-level actions in the interactive menu.
enum Action {
    Chart,
    Variables,
    Markets,
    Forecast,
    SignUp,
    Server,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Chart,
        Self::Variables,
        Self::Markets,
        Self::Forecast,
        Self::SignUp,
        Self::Server,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Chart => "Compare markets",
            Self::Variables => "Browse metrics",
            Self::Markets => "Highest and lowest markets",
            Self::Forecast => "Price forecast",
            Self::SignUp => "Create an account",
            Self::Server => "Start server",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails, the database connection fails, or
/// the server fails to start.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Homescope");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Chart => {
            let mut dash = Dashboard::new(Arc::new(PgMarketSource::from_env().await?));
            dash.load_catalog().await;
            compare(&mut dash).await?;
        }
        Action::Variables => {
            let mut dash = Dashboard::new(Arc::new(PgMarketSource::from_env().await?));
            dash.load_catalog().await;
            let query: String = Input::new()
                .with_prompt("Filter (empty for all)")
                .allow_empty(true)
                .interact_text()?;
            print!("{}", render::catalog(&dash.catalog_groups(&query)));
        }
        Action::Markets => {
            print!("{}", render::leaderboards(&homescope_dashboard::leaderboards()?));
        }
        Action::Forecast => {
            let teaser = homescope_dashboard::forecast()?.teaser(false);
            print!("{}", render::forecast(&teaser));
        }
        Action::SignUp => sign_up().await?,
        Action::Server => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(homescope_server::interactive::run())
            })
            .await??;
        }
    }

    Ok(())
}

/// Prompts for one location, via autocomplete when available.
async fn prompt_location(
    places: Option<&PlacesClient>,
) -> Result<Option<Location>, Box<dyn std::error::Error>> {
    let text: String = Input::new().with_prompt("Search location").interact_text()?;

    if let Some(client) = places {
        let suggestions = match client.autocomplete(&text).await {
            Ok(s) => s,
            Err(e) => {
                log::error!("Location search failed: {e}");
                Vec::new()
            }
        };
        if suggestions.is_empty() {
            println!("No matching places.");
            return Ok(None);
        }

        let items: Vec<&str> = suggestions.iter().map(|s| s.description.as_str()).collect();
        let idx = Select::new()
            .with_prompt("Pick a place")
            .items(&items)
            .default(0)
            .interact()?;

        return match client.resolve(&suggestions[idx].place_id).await {
            Ok(location) => Ok(location),
            Err(e) => {
                log::error!("Place details failed: {e}");
                Ok(None)
            }
        };
    }

    let granularities = Granularity::all();
    let items: Vec<String> = granularities.iter().map(ToString::to_string).collect();
    let idx = Select::new()
        .with_prompt("Granularity")
        .items(&items)
        .default(2)
        .interact()?;

    Ok(Some(Location::new(text.trim(), granularities[idx])))
}

async fn compare<S: MarketSource + ?Sized>(
    dash: &mut Dashboard<S>,
) -> Result<(), Box<dyn std::error::Error>> {
    let places = PlacesConfig::from_env()
        .inspect_err(|e| log::info!("Autocomplete off: {e}"))
        .ok()
        .map(|config| PlacesClient::new(reqwest::Client::new(), config));

    while !dash.locations().is_full() {
        if let Some(location) = prompt_location(places.as_ref()).await? {
            match dash.add_location(location) {
                AddOutcome::Added => {}
                AddOutcome::Duplicate => println!("Already selected."),
                AddOutcome::Full => break,
            }
        }

        if dash.locations().is_full()
            || !Confirm::new()
                .with_prompt("Add another location?")
                .default(false)
                .interact()?
        {
            break;
        }
    }

    if dash.locations().is_empty() {
        println!("No locations selected.");
        return Ok(());
    }

    let groups = dash.catalog_groups("");
    let options: Vec<(String, String)> = groups
        .iter()
        .flat_map(|(category, vars)| {
            vars.iter()
                .map(move |v| (v.key.clone(), format!("[{category}] {}", v.label)))
        })
        .collect();

    if options.is_empty() {
        println!("No metrics available.");
        return Ok(());
    }

    let items: Vec<&str> = options.iter().map(|(_, label)| label.as_str()).collect();
    loop {
        let idx = Select::new()
            .with_prompt("Metric")
            .items(&items)
            .default(0)
            .interact()?;
        if dash.select_variable(&options[idx].0) == Some(AddOutcome::Duplicate) {
            println!("Already selected.");
        }

        if dash.variables().len() >= homescope_market_models::MAX_VARIABLES
            || !Confirm::new()
                .with_prompt("Add another metric?")
                .default(false)
                .interact()?
        {
            break;
        }
    }

    dash.refresh().await;
    print!("{}", render::chart(&dash.view()));

    while Confirm::new()
        .with_prompt("Adjust range?")
        .default(false)
        .interact()?
    {
        let from: f64 = Input::new()
            .with_prompt("From %")
            .default(0.0)
            .interact_text()?;
        let to: f64 = Input::new()
            .with_prompt("To %")
            .default(100.0)
            .interact_text()?;
        dash.set_range(RangePercent::new(from, to));
        print!("{}", render::chart(&dash.view()));
    }

    Ok(())
}

async fn sign_up() -> Result<(), Box<dyn std::error::Error>> {
    let client = AuthClient::new(reqwest::Client::new(), AuthConfig::from_env()?);

    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let mut form = SignUpForm::new(email, password);
    match form.submit(&client).await {
        Some(target) => println!("Signed in. Continue at {target}"),
        None => {
            if let Some(notice) = &form.notice {
                println!("{notice}");
            }
            if let Some(error) = &form.error {
                println!("Sign-up failed: {error}");
            }
        }
    }

    Ok(())
}
