pub mod io;
pub mod store;

use rust_decimal::Decimal;

use crate::route::Coordinate;

pub use store::StationStore;

/// External truck stop identifier from the price feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StationId(u64);

impl StationId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuelStation {
    pub id: StationId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub rack_id: u32,
    pub price: Decimal,
    pub coordinate: Option<Coordinate>,
}

impl FuelStation {
    /// Checks the fields every lookup result must carry.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is empty".to_owned());
        }
        if self.city.trim().is_empty() {
            return Err("city is empty".to_owned());
        }
        if self.state.trim().is_empty() {
            return Err("state is empty".to_owned());
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(format!("price {} is negative", self.price));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rust_decimal::Decimal;

    use super::{FuelStation, StationId};
    use crate::route::Coordinate;

    pub fn station(id: u64, city: &str, state: &str, price: Decimal) -> FuelStation {
        FuelStation {
            id: StationId::new(id),
            name: format!("Truck Stop {id}"),
            address: format!("{id} Main St"),
            city: city.to_owned(),
            state: state.to_owned(),
            rack_id: 100 + id as u32,
            price,
            coordinate: None,
        }
    }

    pub fn station_at(id: u64, lat: f64, lng: f64, price: Decimal) -> FuelStation {
        FuelStation {
            coordinate: Some(Coordinate::new(lat, lng)),
            ..station(id, "Anywhere", "TX", price)
        }
    }
}
