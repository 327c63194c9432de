//! Spatial query utilities for distance calculations.
//!
//! Uses the Haversine formula; distances are "as the crow flies", so the
//! display helpers round them to sensible increments.

use geo::Point;

use crate::models::time::round_half_up;

/// Earth's radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate Haversine distance between two points in meters
///
/// Uses a 6,371 km sphere so distances agree with the ones riders see on the
/// web map; `geo`'s Haversine uses the 6,371.0088 km mean radius instead.
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    let (lat1, lat2) = (p1.y().to_radians(), p2.y().to_radians());
    let d_lat = (p2.y() - p1.y()).to_radians();
    let d_lon = (p2.x() - p1.x()).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Convert meters to degrees at equator (for bounding box queries)
pub fn meters_to_degrees_approx(meters: f64) -> f64 {
    meters / 111_320.0
}

/// `"50m"` below a kilometre, `"1.2km"` above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        return format!("{}m", round_half_up(meters) as i64);
    }
    format!("{:.1}km", meters / 1000.0)
}

/// Like [`format_distance`], but snapped to coarser steps as distance grows.
pub fn format_rounded_distance(meters: f64) -> String {
    let snap = |step: f64| (round_half_up(meters / step) * step) as i64;
    if meters < 50.0 {
        format!("{}m", snap(10.0))
    } else if meters < 100.0 {
        format!("{}m", snap(25.0))
    } else if meters < 500.0 {
        format!("{}m", snap(50.0))
    } else if meters < 1000.0 {
        format!("{}m", snap(100.0))
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}
