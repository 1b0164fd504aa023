#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for the homescope market dashboard.
//!
//! With a subcommand it runs one action and exits. Without one it opens a
//! `dialoguer` menu that walks through picking locations and metrics.

mod interactive;
mod render;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use homescope_analytics::RangePercent;
use homescope_dashboard::Dashboard;
use homescope_database::{MarketSource, PgMarketSource};
use homescope_market_models::{AddOutcome, Granularity, Location};

#[derive(Parser)]
#[command(name = "homescope", about = "Real-estate market dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List pickable metrics grouped by category
    Variables {
        /// Case-insensitive filter on label or key
        #[arg(long)]
        query: Option<String>,
    },
    /// Chart up to three locations and two metrics
    Chart {
        /// Location as `NAME:GRANULARITY` (e.g. "Austin, TX:metro", "90210:zip")
        #[arg(long = "location", required = true, value_parser = parse_location)]
        locations: Vec<Location>,
        /// Metric key (e.g. `median_list_price`)
        #[arg(long = "variable", required = true)]
        variables: Vec<String>,
        /// Range start in percent
        #[arg(long, default_value = "0")]
        from: f64,
        /// Range end in percent
        #[arg(long, default_value = "100")]
        to: f64,
    },
    /// Show the highest and lowest market leaderboards
    Markets,
    /// Show the forecast teaser
    Forecast {
        /// Show the full forecast
        #[arg(long)]
        subscribed: bool,
    },
    /// Start the API server
    Serve,
}

/// Parses `NAME:GRANULARITY`, splitting on the last colon.
fn parse_location(s: &str) -> Result<Location, String> {
    let (name, granularity) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NAME:GRANULARITY, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty location name in '{s}'"));
    }
    let granularity: Granularity = granularity.trim().parse().map_err(|_| {
        let valid: Vec<&str> = Granularity::all().iter().map(AsRef::as_ref).collect();
        format!(
            "unknown granularity '{granularity}' (expected one of: {})",
            valid.join(", ")
        )
    })?;
    Ok(Location::new(name, granularity))
}

async fn chart<S: MarketSource + ?Sized>(
    dash: &mut Dashboard<S>,
    locations: Vec<Location>,
    variables: &[String],
    range: RangePercent,
) {
    for location in locations {
        let name = location.name.clone();
        match dash.add_location(location) {
            AddOutcome::Added => {}
            AddOutcome::Duplicate => log::warn!("Skipping duplicate location {name}"),
            AddOutcome::Full => log::warn!("Location limit reached, skipping {name}"),
        }
    }

    for key in variables {
        match dash.select_variable(key) {
            Some(AddOutcome::Added) => {}
            Some(AddOutcome::Duplicate) => log::warn!("Skipping duplicate metric {key}"),
            Some(AddOutcome::Full) => log::warn!("Metric limit reached, skipping {key}"),
            None => log::warn!("Unknown metric {key}"),
        }
    }

    dash.set_range(range);
    dash.refresh().await;
    print!("{}", render::chart(&dash.view()));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run().await;
    };

    match command {
        Commands::Variables { query } => {
            let mut dash = Dashboard::new(Arc::new(PgMarketSource::from_env().await?));
            dash.load_catalog().await;
            print!(
                "{}",
                render::catalog(&dash.catalog_groups(query.as_deref().unwrap_or_default()))
            );
        }
        Commands::Chart {
            locations,
            variables,
            from,
            to,
        } => {
            let mut dash = Dashboard::new(Arc::new(PgMarketSource::from_env().await?));
            dash.load_catalog().await;
            chart(&mut dash, locations, &variables, RangePercent::new(from, to)).await;
        }
        Commands::Markets => {
            print!("{}", render::leaderboards(&homescope_dashboard::leaderboards()?));
        }
        Commands::Forecast { subscribed } => {
            let teaser = homescope_dashboard::forecast()?.teaser(subscribed);
            print!("{}", render::forecast(&teaser));
        }
        Commands::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(homescope_server::run_server())
            })
            .await??;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_location_arguments() {
        assert_eq!(
            parse_location("Austin, TX:metro").unwrap(),
            Location::new("Austin, TX", Granularity::Metro)
        );
        assert_eq!(
            parse_location("90210:ZIP").unwrap(),
            Location::new("90210", Granularity::Zip)
        );
        assert!(parse_location("Austin, TX").is_err());
        assert!(parse_location(":state").is_err());
        assert!(parse_location("Texas:province").is_err());
    }
}
