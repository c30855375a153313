//! Geospatial visualization engine for an electoral map: viewport-aware
//! proximity filtering, marker clustering, ranked address search and
//! viewport statistics.
//!
//! ```rust
//! use geoview::{MapEngineBuilder, Place, ViewportBounds};
//!
//! let mut engine = MapEngineBuilder::new()
//!     .places(vec![
//!         Place::new("1", "Maria Silva", -23.5505, -46.6333)
//!             .with_postal_code("01310-100")
//!             .with_neighborhood("Bela Vista"),
//!         Place::new("2", "João Souza", -23.5614, -46.6559)
//!             .with_postal_code("01310-200"),
//!     ])
//!     .build()?;
//!
//! let outcome = engine.search("01310-100");
//! assert_eq!(outcome.ids(), vec!["1", "2"]);
//!
//! let viewport = ViewportBounds::new(-23.6, -46.7, -23.5, -46.6, 17.0);
//! let markers = engine.filtered_points(&viewport);
//! assert_eq!(markers.place_count(), 2);
//! # Ok::<(), geoview::GeoViewError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod selection;

pub use builder::MapEngineBuilder;
pub use config::Config;
pub use engine::{EngineEvent, MapEngine};
pub use error::{GeoViewError, Result};
pub use selection::{CategoryFilterState, CategoryGroup, GroupSelection};

pub use geo::{Point, Rect};
pub use geoview_types::{Category, DEFAULT_COLOR, Place, ViewportBounds};

pub use compute::{
    Cluster, ClusterSettings, IconSize, NearbyPlace, RenderItem, RenderSet, SearchOutcome,
    SearchResult, ViewportStats, bounding_box, distance_km,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Config, GeoViewError, MapEngine, MapEngineBuilder, Result};

    pub use crate::{Category, Place, ViewportBounds};

    pub use crate::{EngineEvent, RenderItem, RenderSet, SearchOutcome, ViewportStats};

    pub use crate::compute::{bounding_box, distance_km};

    pub use geo::{Point, Rect};

    pub use std::time::{Duration, Instant};
}
