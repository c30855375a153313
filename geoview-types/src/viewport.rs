use geo::Point;
use serde::{Deserialize, Serialize};

/// The geographic rectangle and zoom level currently visible on the map.
///
/// Supplied by the rendering collaborator on every move or zoom event. When
/// `west > east` the rectangle crosses the antimeridian.
///
/// # Examples
///
/// ```
/// use geoview_types::viewport::ViewportBounds;
/// use geo::Point;
///
/// let bounds = ViewportBounds::new(-23.6, -46.7, -23.5, -46.6, 13.0);
/// assert!(bounds.contains(&Point::new(-46.65, -23.55)));
/// assert!(!bounds.contains(&Point::new(-46.5, -23.55)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub zoom: f64,
}

impl ViewportBounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64, zoom: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
            zoom,
        }
    }

    /// True when the longitude span wraps across ±180°.
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Center of the rectangle as a `geo::Point` (x = longitude, y = latitude).
    pub fn center(&self) -> Point<f64> {
        let lat = (self.south + self.north) / 2.0;
        let lng = if self.crosses_antimeridian() {
            let mid = (self.west + self.east + 360.0) / 2.0;
            if mid > 180.0 { mid - 360.0 } else { mid }
        } else {
            (self.west + self.east) / 2.0
        };
        Point::new(lng, lat)
    }

    /// Inclusive containment test on all four edges.
    pub fn contains(&self, point: &Point<f64>) -> bool {
        let (lng, lat) = (point.x(), point.y());
        if !(self.south..=self.north).contains(&lat) {
            return false;
        }
        if self.crosses_antimeridian() {
            lng >= self.west || lng <= self.east
        } else {
            (self.west..=self.east).contains(&lng)
        }
    }
}
