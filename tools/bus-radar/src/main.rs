use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use geo::Point;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bus_radar_core::{ApiClient, ExplorerClient, HttpFetcher, Loaded, RadarConfig, RadarSession};
use bus_radar_transit::{RouteIdentifier, StopIdentifier, TimeOfDay, TripIdentifier, TripTimeline};

mod output;

#[derive(Parser, Debug)]
#[command(
    name = "bus-radar",
    author,
    version,
    about = "Live-ish bus positions from the published schedule",
    long_about = "Queries the Bus Radar REST backend for stops, upcoming buses and trip \
                  schedules. Trip positions are inferred from the schedule alone and \
                  rendered as a rail of stops with the bus card placed where it should be.\n\n\
                  Defaults come from BUS_RADAR_API_URL, BUS_RADAR_EXPLORER_URL and \
                  BUS_RADAR_OFFSET_MINUTES; the flags below override them."
)]
struct Args {
    /// Server root; the REST API is expected under <URL>/api
    #[arg(long)]
    api_url: Option<String>,

    /// Root of the timetable explorer (routes and timetables)
    #[arg(long)]
    explorer_url: Option<String>,

    /// Display zone as minutes east of UTC (330 for IST)
    #[arg(long, allow_hyphen_values = true)]
    offset_minutes: Option<i32>,

    /// Print JSON instead of text where the view supports it
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stops around a position, nearest first
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Search radius in meters
        #[arg(long)]
        dist: Option<f64>,
    },
    /// Stops whose name or id matches the query
    Search { query: String },
    /// Buses due at a stop
    Upcoming { stop_id: String },
    /// A trip's inferred position and stop rail
    Trip {
        trip_id: String,
        /// Highlight this stop and show the ETA to it
        #[arg(long)]
        user_stop: Option<String>,
        /// Evaluate at this display-zone time (HH:MM[:SS]) instead of now
        #[arg(long)]
        at: Option<TimeOfDay>,
    },
    /// Every route the timetable explorer knows
    Routes,
    /// A route's trips as a stop-by-trip grid
    Timetable { route_id: String },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn current<T>(loaded: Loaded<T>) -> Result<T> {
    loaded
        .into_current()
        .context("Request was superseded by a newer one")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = RadarConfig::from_env().context("Invalid environment configuration")?;
    if let Some(url) = args.explorer_url {
        config = config.with_explorer_url(url);
    }
    if let Some(url) = args.api_url {
        config = config.with_api_url(url);
    }
    if let Some(offset) = args.offset_minutes {
        config = config.with_display_offset(offset);
    }
    if let Command::Nearby { dist: Some(dist), .. } = &args.command {
        config.nearby_radius_m = *dist;
    }
    info!(
        api = %config.api_base(),
        explorer = %config.explorer_url,
        offset = config.display_offset_minutes,
        "using backend"
    );

    let fetcher = HttpFetcher::new(config.request_timeout).context("Failed to build HTTP client")?;
    let explorer = ExplorerClient::new(fetcher.clone(), &config.explorer_url)
        .context("Invalid explorer url")?;
    let client = ApiClient::new(fetcher, &config.api_base()).context("Invalid API url")?;
    let session = RadarSession::new(Arc::new(client), &config);

    match args.command {
        Command::Nearby { lat, lon, .. } => {
            let stops = current(
                session
                    .nearby(Point::new(lon, lat))
                    .await
                    .context("Failed to load nearby stops")?,
            )?;
            print!("{}", output::stop_list(&stops));
        }
        Command::Search { query } => {
            let stops = current(
                session
                    .find_stops(&query, None)
                    .await
                    .with_context(|| format!("Failed to search stops for {query:?}"))?,
            )?;
            print!("{}", output::stop_list(&stops));
        }
        Command::Upcoming { stop_id } => {
            let stop_id = StopIdentifier::new(stop_id);
            let arrivals = current(
                session
                    .upcoming_arrivals(&stop_id, Utc::now())
                    .await
                    .with_context(|| format!("Failed to load upcoming buses for stop {stop_id}"))?,
            )?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&arrivals)?);
            } else {
                print!("{}", output::arrival_list(&arrivals));
            }
        }
        Command::Trip {
            trip_id,
            user_stop,
            at,
        } => {
            let trip_id = TripIdentifier::new(trip_id);
            let trip = current(
                session
                    .load_trip(&trip_id)
                    .await
                    .with_context(|| format!("Failed to load trip {trip_id}"))?,
            )?;
            let user_stop = user_stop.map(StopIdentifier::new);
            let timeline = match at {
                Some(at) => TripTimeline::evaluate(&trip, at.minutes(), user_stop.as_ref()),
                None => session.evaluate_trip(&trip, Utc::now(), user_stop.as_ref()),
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&timeline)?);
            } else {
                print!("{}", output::trip_view(&trip, &timeline));
            }
        }
        Command::Routes => {
            let routes = explorer.routes().await.context("Failed to load routes")?;
            print!("{}", output::route_list(&routes));
        }
        Command::Timetable { route_id } => {
            let route_id = RouteIdentifier::new(route_id);
            let timetable = explorer
                .timetable(&route_id)
                .await
                .with_context(|| format!("Failed to load timetable for route {route_id}"))?;
            print!("{}", output::timetable_grid(&timetable));
        }
    }

    Ok(())
}
