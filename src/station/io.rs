use std::{fs::File, io::Read, path::Path, str::FromStr};

use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::{
    error::{Error, Result},
    route::Coordinate,
    station::{FuelStation, StationId, StationStore},
};

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(rename = "OPIS Truckstop ID")]
    id: u64,
    #[serde(rename = "Truckstop Name")]
    name: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Rack ID")]
    rack_id: u32,
    // Parsed by hand so the feed's decimal digits survive.
    #[serde(rename = "Retail Price")]
    price: String,
    #[serde(rename = "Latitude", default)]
    lat: Option<f64>,
    #[serde(rename = "Longitude", default)]
    lng: Option<f64>,
}

impl PriceRow {
    fn into_station(self) -> std::result::Result<FuelStation, String> {
        let price = Decimal::from_str(&self.price)
            .map_err(|e| format!("retail price {:?}: {e}", self.price))?;

        let coordinate = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        };

        let station = FuelStation {
            id: StationId::new(self.id),
            name: self.name,
            address: self.address,
            city: self.city,
            state: self.state,
            rack_id: self.rack_id,
            price,
            coordinate,
        };
        station.validate()?;
        Ok(station)
    }
}

/// Loads the fuel price CSV into a fresh store.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<StationStore> {
    let f = File::open(path.as_ref())?;
    let store = from_reader(f)?;
    info!(
        path = %path.as_ref().display(),
        stations = store.len(),
        "loaded fuel prices"
    );
    Ok(store)
}

pub fn from_reader<R: Read>(reader: R) -> Result<StationStore> {
    let mut store = StationStore::new();
    load_into(&mut store, reader)?;
    Ok(store)
}

/// Upserts every row into `store`. Rows repeating an id replace the earlier one.
pub fn load_into<R: Read>(store: &mut StationStore, reader: R) -> Result<usize> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut rows = 0;
    for result in rdr.records() {
        let record = result?;
        let row = record.position().map(|p| p.line() as usize).unwrap_or(rows + 2);

        let parsed: PriceRow = record.deserialize(Some(&headers)).map_err(|e| {
            Error::InvalidStation {
                row,
                message: e.to_string(),
            }
        })?;
        let station = parsed
            .into_station()
            .map_err(|message| Error::InvalidStation { row, message })?;

        store.upsert(station);
        rows += 1;
    }

    Ok(rows)
}
