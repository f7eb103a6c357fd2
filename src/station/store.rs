use std::collections::HashMap;

use crate::{
    route::Coordinate,
    station::{FuelStation, StationId},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PlaceKey {
    city: String,
    state: String,
}

impl PlaceKey {
    fn new(city: &str, state: &str) -> Self {
        Self {
            city: city.trim().to_lowercase(),
            state: state.trim().to_lowercase(),
        }
    }
}

/// In-memory station table keyed by external id, indexed by city/state.
#[derive(Debug, Default)]
pub struct StationStore {
    stations: HashMap<StationId, FuelStation>,
    by_place: HashMap<PlaceKey, Vec<StationId>>,
}

impl StationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the station with the same id.
    pub fn upsert(&mut self, station: FuelStation) {
        let id = station.id;
        let key = PlaceKey::new(&station.city, &station.state);

        if let Some(previous) = self.stations.insert(id, station) {
            let old_key = PlaceKey::new(&previous.city, &previous.state);
            if let Some(ids) = self.by_place.get_mut(&old_key) {
                ids.retain(|i| *i != id);
                if ids.is_empty() {
                    self.by_place.remove(&old_key);
                }
            }
        }

        self.by_place.entry(key).or_default().push(id);
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FuelStation> {
        self.stations.values()
    }

    /// Lowest priced station in the city, matched case-insensitively.
    pub fn cheapest_in(&self, city: &str, state: &str) -> Option<&FuelStation> {
        self.by_place
            .get(&PlaceKey::new(city, state))?
            .iter()
            .filter_map(|id| self.stations.get(id))
            .min_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id)))
    }

    /// Closest station that has a known position; ties go to the lower price.
    pub fn nearest_to(&self, at: Coordinate) -> Option<&FuelStation> {
        self.stations
            .values()
            .filter_map(|s| s.coordinate.map(|c| (c.squared_distance(&at), s)))
            .min_by(|(da, a), (db, b)| {
                da.total_cmp(db)
                    .then(a.price.cmp(&b.price))
                    .then(a.id.cmp(&b.id))
            })
            .map(|(_, s)| s)
    }

    /// Cheapest station overall.
    pub fn cheapest(&self) -> Option<&FuelStation> {
        self.stations
            .values()
            .min_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id)))
    }
}

impl FromIterator<FuelStation> for StationStore {
    fn from_iter<T: IntoIterator<Item = FuelStation>>(iter: T) -> Self {
        let mut store = Self::new();
        for station in iter {
            store.upsert(station);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::station::fixtures::{station, station_at};

    #[test]
    fn upsert_is_idempotent() {
        let mut store = StationStore::new();
        store.upsert(station(1, "Houston", "TX", dec!(3.49)));
        store.upsert(station(1, "Houston", "TX", dec!(3.49)));

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.cheapest_in("Houston", "TX").map(|s| s.id),
            Some(StationId::new(1))
        );
    }

    #[test]
    fn upsert_moves_station_to_new_place() {
        let mut store = StationStore::new();
        store.upsert(station(1, "Houston", "TX", dec!(3.49)));
        store.upsert(station(1, "Dallas", "TX", dec!(3.29)));

        assert_eq!(store.len(), 1);
        assert!(store.cheapest_in("Houston", "TX").is_none());
        assert_eq!(
            store.cheapest_in("Dallas", "TX").map(|s| s.price),
            Some(dec!(3.29))
        );
    }

    #[test]
    fn cheapest_in_ignores_case_and_picks_lowest_price() {
        let store: StationStore = [
            station(1, "Los Angeles", "CA", dec!(4.25)),
            station(2, "LOS ANGELES", "ca", dec!(4.05)),
            station(3, "Los Angeles", "CA", dec!(4.10)),
            station(4, "Chicago", "IL", dec!(3.75)),
        ]
        .into_iter()
        .collect();

        let s = store.cheapest_in("los angeles", "CA").unwrap();
        assert_eq!(s.id, StationId::new(2));
        assert!(store.cheapest_in("Springfield", "IL").is_none());
    }

    #[test]
    fn cheapest_in_breaks_ties_by_id() {
        let store: StationStore = [
            station(9, "Reno", "NV", dec!(3.10)),
            station(5, "Reno", "NV", dec!(3.10)),
        ]
        .into_iter()
        .collect();

        assert_eq!(store.cheapest_in("Reno", "NV").unwrap().id, StationId::new(5));
    }

    #[test]
    fn nearest_to_skips_stations_without_position() {
        let store: StationStore = [
            station(1, "Houston", "TX", dec!(1.00)),
            station_at(2, 30.0, -95.0, dec!(3.50)),
            station_at(3, 35.0, -100.0, dec!(2.00)),
        ]
        .into_iter()
        .collect();

        let s = store.nearest_to(Coordinate::new(30.1, -95.1)).unwrap();
        assert_eq!(s.id, StationId::new(2));
    }

    #[test]
    fn nearest_to_prefers_cheaper_on_equal_distance() {
        let store: StationStore = [
            station_at(1, 1.0, 0.0, dec!(3.50)),
            station_at(2, -1.0, 0.0, dec!(3.20)),
        ]
        .into_iter()
        .collect();

        let s = store.nearest_to(Coordinate::new(0.0, 0.0)).unwrap();
        assert_eq!(s.id, StationId::new(2));
    }

    #[test]
    fn empty_store_finds_nothing() {
        let store = StationStore::new();
        assert!(store.is_empty());
        assert!(store.nearest_to(Coordinate::default()).is_none());
        assert!(store.cheapest_in("Houston", "TX").is_none());
        assert!(store.cheapest().is_none());
    }
}
