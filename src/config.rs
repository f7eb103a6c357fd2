use std::{path::PathBuf, time::Duration};

use clap::Args;
use reqwest::blocking::Client;

use crate::{
    error::{Error, Result},
    lookup::LookupPolicy,
    planner::PlannerConfig,
};

/// Settings shared by the third-party API clients.
#[derive(Clone, Args)]
pub struct ApiConfig {
    /// Google Maps API key
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directions endpoint
    #[arg(
        long,
        env = "DIRECTIONS_URL",
        default_value = "https://maps.googleapis.com/maps/api/directions/json"
    )]
    pub directions_url: String,

    /// Reverse geocoding endpoint
    #[arg(
        long,
        env = "GEOCODE_URL",
        default_value = "https://maps.googleapis.com/maps/api/geocode/json"
    )]
    pub geocode_url: String,

    /// Per-request timeout in seconds
    #[arg(long = "http-timeout-secs", env = "HTTP_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::InvalidConfig("GOOGLE_MAPS_API_KEY is not set".to_owned()))
    }

    pub fn http_client(&self) -> Result<Client> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?;
        Ok(client)
    }
}

/// Dataset location and planner tuning.
#[derive(Debug, Clone, Args)]
pub struct PlanSettings {
    /// Path to the fuel price CSV
    #[arg(long, env = "FUEL_DATASET")]
    pub dataset: PathBuf,

    /// Miles the vehicle can travel before it must refuel
    #[arg(long, env = "MAX_RANGE", default_value_t = 500.0)]
    pub max_range: f64,

    /// Miles per unit of fuel
    #[arg(long, env = "MILES_PER_UNIT", default_value_t = 10.0)]
    pub miles_per_unit: f64,

    /// How stations are matched to a stop location
    #[arg(long, env = "LOOKUP_POLICY", value_enum, default_value_t = LookupPolicy::Place)]
    pub lookup: LookupPolicy,

    /// Fail the whole plan when a station lookup fails instead of returning the stops found so far
    #[arg(long, env = "ABORT_ON_LOOKUP_ERROR")]
    pub abort_on_lookup_error: bool,
}

impl PlanSettings {
    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            max_range: self.max_range,
            miles_per_unit: self.miles_per_unit,
            abort_on_lookup_error: self.abort_on_lookup_error,
        }
    }
}
