use std::sync::Arc;

use clap::ValueEnum;
use tracing::debug;

use crate::{
    error::Result,
    geocode::Geocoder,
    route::Coordinate,
    station::{FuelStation, StationStore},
};

/// Finds the station to refuel at for a position along the route.
///
/// `Ok(None)` means no station matched and the planner keeps driving;
/// `Err` is reserved for failures talking to a collaborator.
pub trait PriceLookup: Send + Sync {
    fn find_station(&self, at: Coordinate) -> Result<Option<FuelStation>>;
}

impl<F> PriceLookup for F
where
    F: Fn(Coordinate) -> Result<Option<FuelStation>> + Send + Sync,
{
    fn find_station(&self, at: Coordinate) -> Result<Option<FuelStation>> {
        self(at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LookupPolicy {
    /// Cheapest station in the reverse-geocoded city and state
    Place,
    /// Nearest station by position, cheapest on ties
    Coordinate,
}

pub struct ByPlace<G> {
    store: Arc<StationStore>,
    geocoder: G,
}

impl<G: Geocoder> ByPlace<G> {
    pub fn new(store: Arc<StationStore>, geocoder: G) -> Self {
        Self { store, geocoder }
    }
}

impl<G: Geocoder> PriceLookup for ByPlace<G> {
    fn find_station(&self, at: Coordinate) -> Result<Option<FuelStation>> {
        let Some(place) = self.geocoder.reverse(at)? else {
            debug!(lat = at.lat(), lng = at.lng(), "no city/state for position");
            return Ok(None);
        };

        Ok(self.store.cheapest_in(&place.city, &place.state).cloned())
    }
}

pub struct ByCoordinate {
    store: Arc<StationStore>,
}

impl ByCoordinate {
    pub fn new(store: Arc<StationStore>) -> Self {
        Self { store }
    }
}

impl PriceLookup for ByCoordinate {
    fn find_station(&self, at: Coordinate) -> Result<Option<FuelStation>> {
        Ok(self.store.nearest_to(at).cloned())
    }
}

pub fn build_lookup<G>(
    policy: LookupPolicy,
    store: Arc<StationStore>,
    geocoder: impl FnOnce() -> Result<G>,
) -> Result<Arc<dyn PriceLookup>>
where
    G: Geocoder + 'static,
{
    let lookup: Arc<dyn PriceLookup> = match policy {
        LookupPolicy::Place => Arc::new(ByPlace::new(store, geocoder()?)),
        LookupPolicy::Coordinate => Arc::new(ByCoordinate::new(store)),
    };
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        error::Error,
        geocode::Place,
        station::{
            fixtures::{station, station_at},
            StationId,
        },
    };

    struct FixedGeocoder(Option<Place>);

    impl Geocoder for FixedGeocoder {
        fn reverse(&self, _at: Coordinate) -> Result<Option<Place>> {
            Ok(self.0.clone())
        }
    }

    struct FailingGeocoder;

    impl Geocoder for FailingGeocoder {
        fn reverse(&self, _at: Coordinate) -> Result<Option<Place>> {
            Err(Error::Blocking("connection reset".to_owned()))
        }
    }

    fn store() -> Arc<StationStore> {
        Arc::new(
            [
                station(1, "Houston", "TX", dec!(3.49)),
                station(2, "Houston", "TX", dec!(3.19)),
                station_at(3, 29.7, -95.3, dec!(3.99)),
            ]
            .into_iter()
            .collect(),
        )
    }

    fn houston() -> Option<Place> {
        Some(Place {
            city: "houston".to_owned(),
            state: "tx".to_owned(),
        })
    }

    #[test]
    fn by_place_returns_cheapest_in_city() {
        let lookup = ByPlace::new(store(), FixedGeocoder(houston()));
        let s = lookup.find_station(Coordinate::default()).unwrap().unwrap();
        assert_eq!(s.id, StationId::new(2));
    }

    #[test]
    fn by_place_geocoder_miss_is_none() {
        let lookup = ByPlace::new(store(), FixedGeocoder(None));
        assert!(lookup.find_station(Coordinate::default()).unwrap().is_none());
    }

    #[test]
    fn by_place_propagates_geocoder_errors() {
        let lookup = ByPlace::new(store(), FailingGeocoder);
        assert!(lookup.find_station(Coordinate::default()).is_err());
    }

    #[test]
    fn by_coordinate_uses_positioned_stations_only() {
        let lookup = ByCoordinate::new(store());
        let s = lookup
            .find_station(Coordinate::new(0.0, 0.0))
            .unwrap()
            .unwrap();
        assert_eq!(s.id, StationId::new(3));
    }

    #[test]
    fn build_lookup_only_creates_geocoder_for_place_policy() {
        let calls = AtomicUsize::new(0);
        let make = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(FixedGeocoder(houston()))
        };

        let lookup = build_lookup(LookupPolicy::Coordinate, store(), make).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            lookup
                .find_station(Coordinate::new(29.7, -95.3))
                .unwrap()
                .map(|s| s.id),
            Some(StationId::new(3))
        );

        let lookup = build_lookup(LookupPolicy::Place, store(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(FixedGeocoder(houston()))
        })
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            lookup
                .find_station(Coordinate::default())
                .unwrap()
                .map(|s| s.id),
            Some(StationId::new(2))
        );
    }

    #[test]
    fn closures_are_lookups() {
        let lookup = |_at: Coordinate| -> Result<Option<FuelStation>> {
            Ok(Some(station(8, "Tomah", "WI", dec!(3.299))))
        };
        let s = lookup.find_station(Coordinate::default()).unwrap().unwrap();
        assert_eq!(s.id, StationId::new(8));
    }
}
