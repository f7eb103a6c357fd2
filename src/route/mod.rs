pub mod coordinate;
pub mod directions;

use std::{fs::File, io::BufReader, path::Path};

use crate::error::Result;

pub use coordinate::Coordinate;

pub const METERS_PER_MILE: f64 = 1609.34;

#[derive(Debug, Clone, PartialEq)]
pub struct RouteStep {
    pub miles: f64,
    pub end: Coordinate,
}

impl RouteStep {
    pub fn new(miles: f64, end: Coordinate) -> Self {
        Self { miles, end }
    }

    pub fn from_meters(meters: f64, end: Coordinate) -> Self {
        Self::new(meters / METERS_PER_MILE, end)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteLeg {
    pub steps: Vec<RouteStep>,
}

impl RouteLeg {
    pub fn new(steps: Vec<RouteStep>) -> Self {
        Self { steps }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    pub legs: Vec<RouteLeg>,
}

impl Route {
    pub fn new(legs: Vec<RouteLeg>) -> Self {
        Self { legs }
    }

    /// Reads a saved Directions API response from disk.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path)?;
        let body: directions::DirectionsResponse = serde_json::from_reader(BufReader::new(f))?;
        body.into_route()
    }

    /// Steps of every leg, in traversal order.
    pub fn steps(&self) -> impl Iterator<Item = &RouteStep> {
        self.legs.iter().flat_map(|leg| leg.steps.iter())
    }

    pub fn total_miles(&self) -> f64 {
        self.steps().map(|s| s.miles).sum()
    }
}
