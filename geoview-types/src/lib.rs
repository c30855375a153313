//! # geoview-types
//!
//! Core data types for the geoview map engine.
//!
//! - **Places**: `Place`, the geotagged entity under management
//! - **Categories**: `Category`, the classification tag with display color
//! - **Viewports**: `ViewportBounds`, the visible rectangle plus zoom level
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! geometric primitives.
//!
//! ## Examples
//!
//! ```rust
//! use geoview_types::place::Place;
//! use geoview_types::viewport::ViewportBounds;
//!
//! let place = Place::new("1", "Maria Silva", -23.5505, -46.6333);
//! let bounds = ViewportBounds::new(-23.6, -46.7, -23.5, -46.6, 14.0);
//!
//! assert!(bounds.contains(&place.location().unwrap()));
//! ```

pub mod place;
pub mod viewport;

pub use place::{Category, DEFAULT_COLOR, Place};
pub use viewport::ViewportBounds;
