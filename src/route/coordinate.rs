use geo_types::Point;

/// A WGS84 position. Longitude is stored as x and latitude as y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate(Point<f64>);

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self(Point::new(lng, lat))
    }

    pub fn lat(&self) -> f64 {
        self.0.y()
    }

    pub fn lng(&self) -> f64 {
        self.0.x()
    }

    pub fn point(&self) -> Point<f64> {
        self.0
    }

    /// Squared Euclidean distance in lat/lng space. Only meaningful for ranking.
    pub fn squared_distance(&self, other: &Coordinate) -> f64 {
        let dlat = self.lat() - other.lat();
        let dlng = self.lng() - other.lng();
        dlat * dlat + dlng * dlng
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Self {
        Self(point)
    }
}
