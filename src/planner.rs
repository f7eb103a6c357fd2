use std::sync::Arc;

use anyhow::Context;
use geo_types::Point;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    lookup::PriceLookup,
    route::{Coordinate, Route},
    station::FuelStation,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    /// Miles that may be covered between stops.
    pub max_range: f64,
    /// Miles per unit of fuel.
    pub miles_per_unit: f64,
    /// Return the lookup error instead of the stops found before it.
    pub abort_on_lookup_error: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_range: 500.0,
            miles_per_unit: 10.0,
            abort_on_lookup_error: false,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.max_range.is_finite() || self.max_range <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max range must be a positive number, got {}",
                self.max_range
            )));
        }
        if !self.miles_per_unit.is_finite() || self.miles_per_unit <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "miles per unit must be a positive number, got {}",
                self.miles_per_unit
            )));
        }
        Ok(())
    }

    /// Fuel bought at every stop.
    pub fn units_per_fill(&self) -> f64 {
        self.max_range / self.miles_per_unit
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelStop {
    #[serde(rename = "truckstop_name")]
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "retail_price")]
    pub price: f64,
    pub cost: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl FuelStop {
    fn new(station: &FuelStation, price: f64, cost: f64, coordinate: Coordinate) -> Self {
        Self {
            name: station.name.clone(),
            address: station.address.clone(),
            city: station.city.clone(),
            state: station.state.clone(),
            price,
            cost,
            latitude: coordinate.lat(),
            longitude: coordinate.lng(),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanResult {
    #[serde(rename = "fuel_stops")]
    pub stops: Vec<FuelStop>,
    pub total_cost: f64,
    /// Set when the traversal stopped early on a lookup failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Serialize)]
struct StopFeature<'a> {
    name: &'a str,
    city: &'a str,
    state: &'a str,
    retail_price: f64,
    cost: f64,
    #[serde(serialize_with = "geojson::ser::serialize_geometry")]
    geometry: Point,
}

impl PlanResult {
    /// Stops as a GeoJSON FeatureCollection of points.
    pub fn to_geojson(&self) -> anyhow::Result<String> {
        let features: Vec<StopFeature> = self
            .stops
            .iter()
            .map(|s| StopFeature {
                name: &s.name,
                city: &s.city,
                state: &s.state,
                retail_price: s.price,
                cost: s.cost,
                geometry: s.coordinate().point(),
            })
            .collect();

        geojson::ser::to_feature_collection_string(&features).context("Failed to serialize")
    }
}

pub struct FuelPlanner {
    config: PlannerConfig,
    lookup: Arc<dyn PriceLookup>,
}

impl FuelPlanner {
    pub fn new(config: PlannerConfig, lookup: Arc<dyn PriceLookup>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, lookup })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Walks the route and refuels whenever the distance since the last stop
    /// reaches the vehicle range.
    ///
    /// A crossing with no matching station does not reset the counter, so the
    /// next step tries again. A failed lookup ends the walk.
    pub fn plan(&self, route: &Route) -> Result<PlanResult> {
        debug!(miles = route.total_miles(), "planning fuel stops");

        let mut distance_since_stop = 0.0;
        let mut result = PlanResult::default();

        for step in route.steps() {
            distance_since_stop += step.miles;

            if distance_since_stop < self.config.max_range {
                continue;
            }

            let station = match self.lookup.find_station(step.end) {
                Ok(station) => station,
                Err(e) if self.config.abort_on_lookup_error => return Err(e),
                Err(e) => {
                    warn!(
                        error = %e,
                        stops = result.stops.len(),
                        "station lookup failed, returning partial plan"
                    );
                    result.warning = Some(format!("Fuel stop lookup failed: {e}"));
                    break;
                }
            };

            let Some(station) = station else {
                continue;
            };

            let price = station
                .price
                .to_f64()
                .ok_or(Error::InvalidPrice(station.price))?;
            let cost = self.config.units_per_fill() * price;
            info!(
                station = %station.name,
                city = %station.city,
                state = %station.state,
                cost,
                "fuel stop"
            );

            result
                .stops
                .push(FuelStop::new(&station, price, cost, step.end));
            result.total_cost += cost;
            distance_since_stop = 0.0;
        }

        Ok(result)
    }
}
