//! Great-circle distance and bounding boxes for places.

use super::validation::valid_location;
use geo::{BoundingRect, MultiPoint, Point, Rect};
use geoview_types::Place;

/// Mean Earth radius used by the haversine formula, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance in kilometers.
///
/// ```text
/// a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlng/2)
/// d = 2 · R · atan2(√a, √(1−a))
/// ```
///
/// # Examples
///
/// ```rust
/// use geoview::compute::geo_math::distance_km;
///
/// assert_eq!(distance_km(-23.55, -46.63, -23.55, -46.63), 0.0);
///
/// let one_degree = distance_km(0.0, 0.0, 1.0, 0.0);
/// assert!((one_degree - 111.19).abs() < 0.1);
/// ```
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Haversine distance between two `geo::Point`s (x = longitude, y = latitude).
pub fn distance_between(a: &Point<f64>, b: &Point<f64>) -> f64 {
    distance_km(a.y(), a.x(), b.y(), b.x())
}

/// Bounding box over the places with valid coordinates.
///
/// Returns `None` when no place has a usable location. Used to re-fit the
/// viewport after a search.
pub fn bounding_box<'a, I>(places: I) -> Option<Rect<f64>>
where
    I: IntoIterator<Item = &'a Place>,
{
    let points: Vec<Point<f64>> = places.into_iter().filter_map(valid_location).collect();
    if points.is_empty() {
        return None;
    }

    MultiPoint::new(points).bounding_rect()
}
