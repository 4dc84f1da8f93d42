//! route-stops: generate bus stops between two places from the command line.
//!
//! Reads provider keys from the environment (or a `.env` file) and prints the
//! final stop list as JSON on stdout. Logs go to stderr, filtered by
//! `RUST_LOG` (default `info`).
//!
//! ```text
//! route-stops --origin "10.5061,-66.9146,ChIJ...,Plaza Bolivar" \
//!             --destination "10.4851,-66.8120,ChIJ...,Petare"
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use route_stops::config::{Credentials, OPENAI_API_KEY, PlannerOptions, load_dotenv};
use route_stops::google::{GoogleMapsClient, GoogleMapsConfig};
use route_stops::openai::{OpenAiConfig, OpenAiSelector};
use route_stops::selector::RatedSelector;
use route_stops::traits::StopSelector;
use route_stops::{ConfigError, PipelineError, RouteStopPlanner, Stop};
use tracing_subscriber::EnvFilter;

/// Generate an ordered list of bus stops between an origin and a destination.
#[derive(Parser)]
#[command(name = "route-stops", version)]
struct Cli {
    /// Route start as LAT,LNG,PLACE_ID,NAME.
    #[arg(long, value_parser = parse_stop, allow_hyphen_values = true)]
    origin: Stop,

    /// Route end as LAT,LNG,PLACE_ID,NAME.
    #[arg(long, value_parser = parse_stop, allow_hyphen_values = true)]
    destination: Stop,

    /// How intermediate stops are chosen among the candidates.
    #[arg(long, value_enum, default_value_t = SelectorKind::Ai)]
    selector: SelectorKind,

    /// Minimum spacing between stops in meters.
    #[arg(long)]
    min_separation: Option<f64>,

    /// Sampling interval along the route in meters.
    #[arg(long)]
    sample_interval: Option<f64>,

    /// Nearby search radius in meters.
    #[arg(long)]
    search_radius: Option<f64>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SelectorKind {
    /// Ask the language model.
    Ai,
    /// Take the best-rated candidates.
    Rated,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    load_dotenv();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, AppError> {
    let mut options = PlannerOptions::from_env()?;
    if let Some(value) = cli.min_separation {
        options.min_separation_m = value;
    }
    if let Some(value) = cli.sample_interval {
        options.sample_interval_m = value;
    }
    if let Some(value) = cli.search_radius {
        options.search_radius_m = value;
    }

    let credentials = Credentials::from_env(cli.selector == SelectorKind::Ai)?;
    let gateway = GoogleMapsClient::new(GoogleMapsConfig::new(credentials.google_maps_api_key))?;

    let stops = match cli.selector {
        SelectorKind::Ai => {
            let api_key = credentials
                .openai_api_key
                .ok_or(ConfigError::Missing(OPENAI_API_KEY))?;
            let selector = OpenAiSelector::new(OpenAiConfig {
                min_stops: options.min_stops,
                max_stops: options.max_stops,
                ..OpenAiConfig::new(api_key)
            })?;
            plan(gateway, selector, options, cli)?
        }
        SelectorKind::Rated => {
            let selector = RatedSelector::new(options.max_stops);
            plan(gateway, selector, options, cli)?
        }
    };

    Ok(serde_json::to_string_pretty(&stops)?)
}

fn plan<S: StopSelector>(
    gateway: GoogleMapsClient,
    selector: S,
    options: PlannerOptions,
    cli: &Cli,
) -> Result<Vec<Stop>, AppError> {
    let planner = RouteStopPlanner::new(gateway, selector, options)?;
    Ok(planner.generate(&cli.origin, &cli.destination)?)
}

fn parse_stop(raw: &str) -> Result<Stop, String> {
    let mut parts = raw.splitn(4, ',');
    let (Some(lat), Some(lng), Some(place_id), Some(name)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err("expected LAT,LNG,PLACE_ID,NAME".to_string());
    };

    let lat = lat.trim().parse::<f64>().map_err(|err| format!("latitude {:?}: {}", lat, err))?;
    let lng = lng.trim().parse::<f64>().map_err(|err| format!("longitude {:?}: {}", lng, err))?;
    Stop::new(name.trim(), lat, lng, place_id.trim()).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stop_argument() {
        let stop = parse_stop("10.5061, -66.9146, ChIJbolivar, Plaza Bolivar, Caracas").unwrap();
        assert_eq!(stop.name(), "Plaza Bolivar, Caracas");
        assert_eq!(stop.place_id(), "ChIJbolivar");
        assert_eq!(stop.location().lat, 10.5061);
    }

    #[test]
    fn rejects_bad_stop_arguments() {
        assert!(parse_stop("10.5,-66.9,id").is_err());
        assert!(parse_stop("north,-66.9,id,Name").is_err());
        assert!(parse_stop("10.5,-66.9,,Name").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
