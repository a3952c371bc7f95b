//! Spatial math for path length, flight time and template layout.

use crate::flight_plan::FlightPlan;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by every great-circle computation in the crate.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Seconds budgeted per stop for the actions executed at a waypoint.
pub const ACTION_OVERHEAD_SECS: f64 = 10.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and inside [-90,90] x [-180,180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_distance(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Calculate distance between two points in meters using Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in meters
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Distance between two coordinates in meters.
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    a.distance_to(b)
}

/// Sum of consecutive pairwise distances. Fewer than two points yields 0.
pub fn path_length<'a, I>(coordinates: I) -> f64
where
    I: IntoIterator<Item = &'a Coordinate>,
{
    let mut total = 0.0;
    let mut previous: Option<&Coordinate> = None;
    for coordinate in coordinates {
        if let Some(prev) = previous {
            total += prev.distance_to(coordinate);
        }
        previous = Some(coordinate);
    }
    total
}

/// Estimated mission duration in seconds.
///
/// Travel time at the plan's auto speed plus a fixed per-waypoint overhead
/// for the actions performed at each stop. A non-positive auto speed never
/// completes the path, so travel time is infinite.
pub fn estimated_flight_time(plan: &FlightPlan) -> f64 {
    let length_m = path_length(plan.waypoints.iter().map(|wp| &wp.coordinate));
    let travel_s = if length_m <= 0.0 {
        0.0
    } else if plan.auto_speed_mps > 0.0 {
        length_m / plan.auto_speed_mps
    } else {
        f64::INFINITY
    };
    travel_s + plan.waypoints.len() as f64 * ACTION_OVERHEAD_SECS
}

/// Arithmetic mean of the given coordinates, `None` when empty.
pub fn centroid(coordinates: &[Coordinate]) -> Option<Coordinate> {
    if coordinates.is_empty() {
        return None;
    }
    let n = coordinates.len() as f64;
    let lat = coordinates.iter().map(|c| c.lat).sum::<f64>() / n;
    let lon = coordinates.iter().map(|c| c.lon).sum::<f64>() / n;
    Some(Coordinate { lat, lon })
}

/// Wrap any finite angle into [0, 360).
pub fn normalize_heading(heading_deg: f64) -> f64 {
    let wrapped = heading_deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Calculate bearing from point 1 to point 2 in radians.
/// Returns bearing in radians, 0 = north, π/2 = east.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// Initial bearing from `from` to `to` in degrees within [0, 360).
pub fn bearing_deg(from: &Coordinate, to: &Coordinate) -> f64 {
    normalize_heading(bearing(from.lat, from.lon, to.lat, to.lon).to_degrees())
}

/// Offset a position by meters in the north and east directions.
pub fn offset_position(origin: &Coordinate, north_m: f64, east_m: f64) -> Coordinate {
    let distance_m = (north_m * north_m + east_m * east_m).sqrt();
    if distance_m <= f64::EPSILON {
        return *origin;
    }
    let bearing_rad = east_m.atan2(north_m);
    offset_by_bearing(origin, distance_m, bearing_rad)
}

/// Offset a position by distance and bearing.
///
/// # Arguments
/// * `origin` - Starting position
/// * `distance_m` - Distance in meters
/// * `bearing_rad` - Bearing in radians (0 = north, π/2 = east)
pub fn offset_by_bearing(origin: &Coordinate, distance_m: f64, bearing_rad: f64) -> Coordinate {
    if distance_m.abs() <= f64::EPSILON {
        return *origin;
    }

    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    Coordinate {
        lat: lat2.to_degrees(),
        lon: lon2.to_degrees(),
    }
}
