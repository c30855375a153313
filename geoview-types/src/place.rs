use geo::Point;
use serde::{Deserialize, Serialize};

/// Display color used when a place has no category or its category has no color.
pub const DEFAULT_COLOR: &str = "#3388ff";

/// A geotagged entity shown on the map.
///
/// Coordinates are optional: records coming from the backend may lack them,
/// and such places are skipped by every spatial operation while remaining
/// addressable by `id`.
///
/// # Examples
///
/// ```
/// use geoview_types::place::Place;
///
/// let place = Place::new("42", "Maria Silva", -23.5505, -46.6333)
///     .with_neighborhood("Centro")
///     .with_city("São Paulo");
///
/// assert!(place.location().is_some());
/// assert_eq!(place.neighborhood.as_deref(), Some("Centro"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

impl Place {
    /// Create a place with coordinates and no optional attributes.
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
            ..Self::unlocated(id, name)
        }
    }

    /// Create a place without coordinates.
    pub fn unlocated(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat: None,
            lng: None,
            address: None,
            phone: None,
            category_id: None,
            city: None,
            neighborhood: None,
            postal_code: None,
            gender: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_neighborhood(mut self, neighborhood: impl Into<String>) -> Self {
        self.neighborhood = Some(neighborhood.into());
        self
    }

    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// The place's position as a `geo::Point` (x = longitude, y = latitude).
    ///
    /// Returns `None` unless both coordinates are present and finite. Range
    /// checks are left to the caller.
    pub fn location(&self) -> Option<Point<f64>> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(Point::new(lng, lat))
            }
            _ => None,
        }
    }
}

/// A classification tag attached to places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    /// Grouping key for the type-grouped selection UI.
    #[serde(default)]
    pub type_id: Option<String>,
    #[serde(default)]
    pub type_name: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
            type_id: None,
            type_name: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_type(mut self, type_id: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.type_id = Some(type_id.into());
        self.type_name = Some(type_name.into());
        self
    }

    /// The category's color, or `fallback` when none is set.
    pub fn color_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.color.as_deref().unwrap_or(fallback)
    }
}
