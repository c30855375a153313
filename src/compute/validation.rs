//! Validation for place coordinates.
//!
//! Invalid coordinates are never an engine error: callers use
//! [`has_valid_coordinates`] to skip such places. The `Result`-returning
//! variant exists for diagnostics when loading a dataset.

use crate::error::{GeoViewError, Result};
use geo::Point;
use geoview_types::Place;

/// Validates a `(lat, lng)` pair.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use geoview::compute::validation::validate_coordinates;
///
/// assert!(validate_coordinates(-23.55, -46.63).is_ok());
/// assert!(validate_coordinates(95.0, -46.63).is_err());
/// assert!(validate_coordinates(f64::NAN, -46.63).is_err());
/// ```
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<()> {
    if !lat.is_finite() {
        return Err(GeoViewError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            lat
        )));
    }

    if !lng.is_finite() {
        return Err(GeoViewError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            lng
        )));
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(GeoViewError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            lat
        )));
    }

    if !(-180.0..=180.0).contains(&lng) {
        return Err(GeoViewError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            lng
        )));
    }

    Ok(())
}

/// Validates a place's coordinates, naming the place in the error.
pub fn validate_place(place: &Place) -> Result<()> {
    match (place.lat, place.lng) {
        (Some(lat), Some(lng)) => validate_coordinates(lat, lng)
            .map_err(|e| GeoViewError::InvalidInput(format!("Place {}: {}", place.id, e))),
        _ => Err(GeoViewError::InvalidInput(format!(
            "Place {}: missing coordinates",
            place.id
        ))),
    }
}

/// The place's location when its coordinates are present, finite and in range.
pub fn valid_location(place: &Place) -> Option<Point<f64>> {
    place
        .location()
        .filter(|p| validate_coordinates(p.y(), p.x()).is_ok())
}

/// True when the place can take part in spatial operations.
pub fn has_valid_coordinates(place: &Place) -> bool {
    valid_location(place).is_some()
}

/// Number of places that will be skipped by spatial operations.
pub fn count_invalid(places: &[Place]) -> usize {
    places.iter().filter(|p| !has_valid_coordinates(p)).count()
}
