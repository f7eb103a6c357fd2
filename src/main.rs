use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::{Parser, Subcommand};
use itertools::Itertools;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    api::AppState,
    config::{ApiConfig, PlanSettings},
    geocode::GoogleGeocoder,
    lookup::build_lookup,
    planner::{FuelPlanner, PlanResult},
    route::{
        directions::{DirectionsClient, RouteSource},
        Route,
    },
    station::StationStore,
};

mod api;
mod config;
mod error;
mod geocode;
mod lookup;
mod planner;
mod route;
mod station;
#[cfg(test)]
mod test_server;

#[derive(Parser)]
#[command(about = "Plan fuel stops and fuel cost along a driving route")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the route fuel stop API
    Serve {
        /// Address to listen on
        #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
        bind: String,
        #[command(flatten)]
        settings: PlanSettings,
        #[command(flatten)]
        api: ApiConfig,
    },
    /// Fetch a route and print its fuel stops
    Plan {
        /// Start address
        start: String,
        /// Finish address
        finish: String,
        /// Print a GeoJSON FeatureCollection instead of JSON
        #[arg(long)]
        geojson: bool,
        #[command(flatten)]
        settings: PlanSettings,
        #[command(flatten)]
        api: ApiConfig,
    },
    /// Plan fuel stops for a saved Directions API response
    PlanFile {
        /// Path to the Directions JSON
        route_path: PathBuf,
        /// Print a GeoJSON FeatureCollection instead of JSON
        #[arg(long)]
        geojson: bool,
        #[command(flatten)]
        settings: PlanSettings,
        #[command(flatten)]
        api: ApiConfig,
    },
    /// Load and check the fuel price dataset
    Load {
        /// Path to the fuel price CSV
        #[arg(long, env = "FUEL_DATASET")]
        dataset: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fuel_route_planner=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Serve {
            bind,
            settings,
            api,
        } => serve(bind, &settings, &api),
        Command::Plan {
            start,
            finish,
            geojson,
            settings,
            api,
        } => {
            let planner = build_planner(&settings, &api)?;
            let route = DirectionsClient::new(&api)?
                .fetch_route(&start, &finish)
                .context("Failed to fetch route")?;
            print_plan(&planner.plan(&route)?, geojson)
        }
        Command::PlanFile {
            route_path,
            geojson,
            settings,
            api,
        } => {
            let planner = build_planner(&settings, &api)?;
            let route = Route::read(&route_path)
                .with_context(|| format!("Failed to read route {}", route_path.display()))?;
            print_plan(&planner.plan(&route)?, geojson)
        }
        Command::Load { dataset } => {
            let store = load_stations(&dataset)?;
            print_summary(&store);
            Ok(())
        }
    }
}

fn load_stations(path: &Path) -> anyhow::Result<StationStore> {
    let now = Instant::now();
    let store = station::io::load_csv(path)
        .with_context(|| format!("Failed to load fuel prices from {}", path.display()))?;
    info!("Read fuel prices in {:?}", now.elapsed());
    if store.is_empty() {
        warn!(path = %path.display(), "fuel price dataset has no stations");
    }
    Ok(store)
}

fn build_planner(settings: &PlanSettings, api: &ApiConfig) -> anyhow::Result<FuelPlanner> {
    let store = Arc::new(load_stations(&settings.dataset)?);
    let lookup = build_lookup(settings.lookup, store, || GoogleGeocoder::new(api))?;
    Ok(FuelPlanner::new(settings.planner_config(), lookup)?)
}

fn print_plan(plan: &PlanResult, geojson: bool) -> anyhow::Result<()> {
    if geojson {
        println!("{}", plan.to_geojson()?);
    } else {
        println!("{}", serde_json::to_string_pretty(plan)?);
    }
    Ok(())
}

fn print_summary(store: &StationStore) {
    println!("Loaded {} stations", store.len());

    store
        .iter()
        .counts_by(|s| s.state.to_uppercase())
        .into_iter()
        .sorted()
        .for_each(|(state, n)| println!("{state}: {n}"));

    if let Some(s) = store.cheapest() {
        println!(
            "Cheapest: {} #{} ({}, {}) at {}",
            s.name,
            s.id.get(),
            s.city,
            s.state,
            s.price
        );
    }
}

fn serve(bind: String, settings: &PlanSettings, api_config: &ApiConfig) -> anyhow::Result<()> {
    let planner = Arc::new(build_planner(settings, api_config)?);
    let routes: Arc<dyn RouteSource> = Arc::new(DirectionsClient::new(api_config)?);

    info!(
        %bind,
        lookup = ?settings.lookup,
        max_range = planner.config().max_range,
        miles_per_unit = planner.config().miles_per_unit,
        "starting server"
    );
    let state = web::Data::new(AppState { routes, planner });

    // Blocking HTTP clients are built and dropped outside the async runtime.
    let app_state = state.clone();
    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(app_state.clone())
                .configure(api::configure)
        })
        .bind(&bind)
        .with_context(|| format!("Failed to bind {bind}"))?
        .run()
        .await
        .context("Server error")
    })?;

    drop(state);
    Ok(())
}
