//! Zoom-gated proximity selection.
//!
//! Plain proximity views would otherwise render thousands of unclustered
//! pins at low zoom, so nothing is returned below the configured minimum
//! zoom. At or above it, the nearest places to the viewport center are
//! returned in ascending distance order, truncated to the result cap.

use super::geo_math::distance_between;
use super::validation::valid_location;
use crate::config::Config;
use geo::Point;
use geoview_types::Place;

/// A place paired with its distance to the query center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyPlace<'a> {
    pub place: &'a Place,
    pub distance_km: f64,
}

/// Select the places nearest to `center`.
///
/// Places without valid coordinates are dropped. Ties keep input order.
///
/// # Examples
///
/// ```rust
/// use geoview::{Config, Place};
/// use geoview::compute::distance_filter::nearby;
/// use geo::Point;
///
/// let places = vec![
///     Place::new("far", "Far", -23.60, -46.60),
///     Place::new("near", "Near", -23.55, -46.63),
/// ];
/// let center = Point::new(-46.63, -23.55);
/// let config = Config::default();
///
/// assert!(nearby(&places, &center, 11.0, &config).is_empty());
///
/// let result = nearby(&places, &center, 12.0, &config);
/// assert_eq!(result[0].place.id, "near");
/// ```
pub fn nearby<'a, I>(
    places: I,
    center: &Point<f64>,
    zoom: f64,
    config: &Config,
) -> Vec<NearbyPlace<'a>>
where
    I: IntoIterator<Item = &'a Place>,
{
    if zoom.is_nan() || zoom < config.min_zoom {
        log::trace!(
            "Proximity view gated at zoom {} (minimum {})",
            zoom,
            config.min_zoom
        );
        return Vec::new();
    }

    let mut considered = 0usize;
    let mut candidates: Vec<NearbyPlace<'a>> = places
        .into_iter()
        .inspect(|_| considered += 1)
        .filter_map(|place| {
            valid_location(place).map(|location| NearbyPlace {
                place,
                distance_km: distance_between(center, &location),
            })
        })
        .collect();

    // Vec::sort_by is stable, so equal distances keep dataset order.
    candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    candidates.truncate(config.result_cap);

    log::debug!(
        "Proximity view at zoom {}: {} of {} places",
        zoom,
        candidates.len(),
        considered
    );

    candidates
}
