use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::ApiConfig,
    error::{Error, Result},
    route::Coordinate,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub city: String,
    pub state: String,
}

pub trait Geocoder: Send + Sync {
    /// City and state for a position, or `None` when the provider cannot name both.
    fn reverse(&self, at: Coordinate) -> Result<Option<Place>>;
}

pub struct GoogleGeocoder {
    client: Client,
    url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            url: config.geocode_url.clone(),
            api_key: config.api_key()?.to_owned(),
        })
    }
}

impl Geocoder for GoogleGeocoder {
    fn reverse(&self, at: Coordinate) -> Result<Option<Place>> {
        let latlng = format!("{},{}", at.lat(), at.lng());
        debug!(%latlng, "reverse geocoding");

        let response = self
            .client
            .get(&self.url)
            .query(&[("latlng", latlng.as_str()), ("key", self.api_key.as_str())])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                service: "geocode",
                status,
            });
        }

        let body: GeocodeResponse = response.json()?;
        body.into_place()
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl AddressComponent {
    fn is(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }
}

impl GeocodeResponse {
    /// `ZERO_RESULTS` is an ordinary miss. Any other status besides `OK` is a provider failure.
    fn into_place(self) -> Result<Option<Place>> {
        match self.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(self.place()),
            _ => Err(Error::Provider {
                service: "geocode",
                status: self.status,
                message: self.error_message,
            }),
        }
    }

    fn place(&self) -> Option<Place> {
        let components = &self.results.first()?.address_components;

        let city = components
            .iter()
            .rfind(|c| c.is("locality"))
            .map(|c| c.long_name.clone());
        let state = components
            .iter()
            .rfind(|c| c.is("administrative_area_level_1"))
            .map(|c| c.short_name.clone());

        Some(Place {
            city: city?,
            state: state?,
        })
    }
}
