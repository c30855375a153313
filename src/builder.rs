//! Engine builder for flexible configuration
//!
//! Collects the configuration and initial datasets and validates them once
//! in [`MapEngineBuilder::build`].

use crate::config::Config;
use crate::engine::MapEngine;
use crate::error::Result;
use geoview_types::{Category, Place};
use std::path::Path;

/// Builder for a [`MapEngine`] with a custom configuration and preloaded data.
///
/// ```rust
/// use geoview::{Category, Config, MapEngineBuilder, Place};
///
/// let engine = MapEngineBuilder::new()
///     .config(Config::default().with_min_zoom(13.0))
///     .categories(vec![Category::new("c1", "Leaders")])
///     .places(vec![Place::new("1", "Ana", -23.55, -46.63).with_category("c1")])
///     .build()?;
///
/// assert_eq!(engine.config().min_zoom, 13.0);
/// assert!(engine.selection().is_loaded());
/// # Ok::<(), geoview::GeoViewError>(())
/// ```
#[derive(Debug, Default)]
pub struct MapEngineBuilder {
    config: Config,
    places: Vec<Place>,
    categories: Option<Vec<Category>>,
}

impl MapEngineBuilder {
    /// Create a new builder with the default configuration and no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine configuration (zoom gate, clustering, debounce, etc.).
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from a JSON or TOML file.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.config = Config::from_file(path)?;
        Ok(self)
    }

    /// Initial place dataset.
    pub fn places(mut self, places: Vec<Place>) -> Self {
        self.places = places;
        self
    }

    /// Initial category dataset. Without one the engine starts in degraded
    /// mode and renders every place.
    pub fn categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = Some(categories);
        self
    }

    /// Build the engine. Fails only on an invalid configuration.
    pub fn build(self) -> Result<MapEngine> {
        let mut engine = MapEngine::with_config(self.config)?;

        if let Some(categories) = self.categories {
            engine.replace_categories(categories);
        }
        engine.replace_places(self.places);

        log::debug!(
            "Map engine built with {} places and {} categories",
            engine.places().len(),
            engine.categories().len()
        );

        Ok(engine)
    }
}
