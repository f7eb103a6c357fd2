use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::ApiConfig,
    error::{Error, Result},
    route::{Coordinate, Route, RouteLeg, RouteStep},
};

/// Anything that can turn a pair of addresses into a drivable route.
pub trait RouteSource: Send + Sync {
    fn fetch_route(&self, start: &str, finish: &str) -> Result<Route>;
}

/// Google Directions API client.
pub struct DirectionsClient {
    client: Client,
    url: String,
    api_key: String,
}

impl DirectionsClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            url: config.directions_url.clone(),
            api_key: config.api_key()?.to_owned(),
        })
    }
}

impl RouteSource for DirectionsClient {
    fn fetch_route(&self, start: &str, finish: &str) -> Result<Route> {
        debug!(start, finish, "requesting directions");

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("origin", start),
                ("destination", finish),
                ("key", self.api_key.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                service: "directions",
                status,
            });
        }

        let body: DirectionsResponse = response.json()?;
        body.into_route()
    }
}

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<WireRoute>,
}

#[derive(Debug, Deserialize)]
struct WireRoute {
    #[serde(default)]
    legs: Vec<WireLeg>,
}

#[derive(Debug, Deserialize)]
struct WireLeg {
    #[serde(default)]
    steps: Vec<WireStep>,
}

#[derive(Debug, Deserialize)]
struct WireStep {
    distance: WireDistance,
    end_location: LatLng,
}

#[derive(Debug, Deserialize)]
struct WireDistance {
    /// Meters.
    value: f64,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl DirectionsResponse {
    /// Takes the first route the provider returned.
    pub fn into_route(self) -> Result<Route> {
        let Some(route) = self.routes.into_iter().next() else {
            return Err(Error::NoRoute {
                status: self.status,
                message: self.error_message,
            });
        };

        let legs = route
            .legs
            .into_iter()
            .map(|leg| {
                RouteLeg::new(
                    leg.steps
                        .into_iter()
                        .map(|s| {
                            RouteStep::from_meters(
                                s.distance.value,
                                Coordinate::new(s.end_location.lat, s.end_location.lng),
                            )
                        })
                        .collect(),
                )
            })
            .collect();

        Ok(Route::new(legs))
    }
}
