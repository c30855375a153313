//! Compute layer: the pure algorithms behind the map engine.
//!
//! Every function here takes its inputs explicitly and keeps no state
//! between calls, apart from the generation counter in [`ClusterEngine`].
//! The [`crate::engine`] module decides when to run them.

pub mod cluster;
pub mod distance_filter;
pub mod geo_math;
#[cfg(feature = "geojson")]
pub mod geojson;
pub mod search;
pub mod stats;
pub mod validation;

pub use cluster::{
    CategoryIndex, Cluster, ClusterEngine, ClusterSettings, IconSize, RenderItem, RenderSet,
};
pub use distance_filter::{NearbyPlace, nearby};
pub use geo_math::{bounding_box, distance_between, distance_km};
pub use search::{MatchField, SearchIndex, SearchOutcome, SearchResult};
pub use stats::{GroupCount, GroupStats, ViewportStats, viewport_stats};
pub use validation::{has_valid_coordinates, validate_coordinates, validate_place};
