//! Great-circle distance and bounding-box math.
//!
//! Pure functions, no state. Distances use the Haversine formula with the
//! mean Earth radius; callers compare at full precision and round only for
//! display.

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude bounds of the served region.
pub const REGION_MIN_LAT: f64 = 51.0;
pub const REGION_MAX_LAT: f64 = 56.0;

/// Longitude bounds of the served region.
pub const REGION_MIN_LON: f64 = 23.0;
pub const REGION_MAX_LON: f64 = 33.0;

/// Whether a coordinate pair is finite and inside the served region.
pub fn in_region(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (REGION_MIN_LAT..=REGION_MAX_LAT).contains(&lat)
        && (REGION_MIN_LON..=REGION_MAX_LON).contains(&lon)
}

/// Great-circle distance between two coordinates in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// A latitude/longitude rectangle, inclusive on all edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// The smallest box guaranteed to contain every point within
    /// `radius_km` of the center.
    ///
    /// Near the poles the longitude span degenerates; the box then covers
    /// the full longitude range rather than dividing by a vanishing cosine.
    pub fn around(lat: f64, lon: f64, radius_km: f64) -> Self {
        let dlat = (radius_km / EARTH_RADIUS_KM).to_degrees();

        let cos_lat = lat.to_radians().cos();
        let dlon = if cos_lat.abs() < 1e-6 {
            180.0
        } else {
            (dlat / cos_lat.abs()).min(180.0)
        };

        BoundingBox {
            min_lat: (lat - dlat).max(-90.0),
            max_lat: (lat + dlat).min(90.0),
            min_lon: (lon - dlon).max(-180.0),
            max_lon: (lon + dlon).min(180.0),
        }
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat)
            && (self.min_lon..=self.max_lon).contains(&lon)
    }
}
