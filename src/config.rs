//! Engine configuration.
//!
//! Every threshold the engine uses is carried here with the map feature's
//! defaults, so a deployment can tune them from JSON or TOML without code
//! changes.
//!
//! # Example
//!
//! ```rust
//! use geoview::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.min_zoom, 12.0);
//! assert_eq!(config.result_cap, 300);
//!
//! let json = r#"{ "min_zoom": 14.0, "debounce_ms": 150 }"#;
//! let config = Config::from_json(json).unwrap();
//! assert_eq!(config.result_cap, 300);
//! ```

use crate::error::{GeoViewError, Result};
use geoview_types::DEFAULT_COLOR;
use serde::de::Error;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Below this zoom the proximity view renders nothing.
    #[serde(default = "Config::default_min_zoom")]
    pub min_zoom: f64,

    /// Maximum number of places returned by the proximity view.
    #[serde(default = "Config::default_result_cap")]
    pub result_cap: usize,

    /// Cluster radius in screen pixels while clustering is enabled.
    #[serde(default = "Config::default_cluster_radius_px")]
    pub cluster_radius_px: f64,

    /// Zoom at and above which clustering stops while enabled.
    #[serde(default = "Config::default_cluster_stop_zoom")]
    pub cluster_stop_zoom: f64,

    /// Selection sizes in `[disable_clustering_min, disable_clustering_max]`
    /// turn clustering off.
    #[serde(default = "Config::default_disable_clustering_min")]
    pub disable_clustering_min: usize,

    #[serde(default = "Config::default_disable_clustering_max")]
    pub disable_clustering_max: usize,

    /// Coalescing window for search and marker rebuild triggers.
    #[serde(default = "Config::default_debounce_ms")]
    pub debounce_ms: u64,

    /// Fill color for uncategorized places and clusters.
    #[serde(default = "Config::default_color")]
    pub default_color: String,

    /// Minimum digit count before a search term is tried as a postal code.
    #[serde(default = "Config::default_search_min_postal_digits")]
    pub search_min_postal_digits: usize,
}

impl Config {
    const fn default_min_zoom() -> f64 {
        12.0
    }

    const fn default_result_cap() -> usize {
        300
    }

    const fn default_cluster_radius_px() -> f64 {
        50.0
    }

    const fn default_cluster_stop_zoom() -> f64 {
        16.0
    }

    const fn default_disable_clustering_min() -> usize {
        1
    }

    const fn default_disable_clustering_max() -> usize {
        5
    }

    const fn default_debounce_ms() -> u64 {
        300
    }

    fn default_color() -> String {
        DEFAULT_COLOR.to_string()
    }

    const fn default_search_min_postal_digits() -> usize {
        5
    }

    pub fn with_min_zoom(mut self, zoom: f64) -> Self {
        self.min_zoom = zoom;
        self
    }

    pub fn with_result_cap(mut self, cap: usize) -> Self {
        assert!(cap > 0, "Result cap must be greater than zero");

        if cap > 10_000 {
            log::warn!(
                "Result cap of {} is very large for a proximity view",
                cap
            );
        }

        self.result_cap = cap;
        self
    }

    pub fn with_cluster_radius(mut self, radius_px: f64) -> Self {
        self.cluster_radius_px = radius_px;
        self
    }

    pub fn with_cluster_stop_zoom(mut self, zoom: f64) -> Self {
        self.cluster_stop_zoom = zoom;
        self
    }

    /// Set the inclusive selection-size range that disables clustering.
    pub fn with_disable_clustering_range(mut self, min: usize, max: usize) -> Self {
        assert!(min <= max, "Disable range minimum must not exceed maximum");
        self.disable_clustering_min = min;
        self.disable_clustering_max = max;
        self
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce_ms = window.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = color.into();
        self
    }

    /// Coalescing window as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.min_zoom.is_finite() || self.min_zoom < 0.0 {
            return Err("Minimum zoom must be a finite, non-negative number".to_string());
        }

        if self.result_cap == 0 {
            return Err("Result cap must be greater than zero".to_string());
        }

        if !self.cluster_radius_px.is_finite() || self.cluster_radius_px < 0.0 {
            return Err("Cluster radius must be a finite, non-negative number".to_string());
        }

        if !self.cluster_stop_zoom.is_finite() {
            return Err("Cluster stop zoom must be finite".to_string());
        }

        if self.disable_clustering_min > self.disable_clustering_max {
            return Err(format!(
                "Disable clustering range is empty: {} > {}",
                self.disable_clustering_min, self.disable_clustering_max
            ));
        }

        if self.default_color.trim().is_empty() {
            return Err("Default color cannot be empty".to_string());
        }

        if self.search_min_postal_digits == 0 {
            return Err("Postal code digit threshold must be greater than zero".to_string());
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a `.json` or `.toml` file, chosen by extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::from_json(&contents)?),
            #[cfg(feature = "toml")]
            Some("toml") => Ok(Self::from_toml(&contents)?),
            other => Err(GeoViewError::InvalidConfig(format!(
                "Unsupported configuration format: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_zoom: Self::default_min_zoom(),
            result_cap: Self::default_result_cap(),
            cluster_radius_px: Self::default_cluster_radius_px(),
            cluster_stop_zoom: Self::default_cluster_stop_zoom(),
            disable_clustering_min: Self::default_disable_clustering_min(),
            disable_clustering_max: Self::default_disable_clustering_max(),
            debounce_ms: Self::default_debounce_ms(),
            default_color: Self::default_color(),
            search_min_postal_digits: Self::default_search_min_postal_digits(),
        }
    }
}
