//! The map engine facade.
//!
//! [`MapEngine`] owns the dataset snapshot and the interactive state of the
//! map: category selection, the manual clustering toggle, the last known
//! viewport and the two debounced triggers. Computations run synchronously
//! on request and borrow from the current snapshot, so replacing the dataset
//! between triggers never leaves stale references behind.
//!
//! ```rust
//! use geoview::{Category, MapEngine, Place, ViewportBounds};
//! use geoview::engine::EngineEvent;
//! use std::time::{Duration, Instant};
//!
//! let now = Instant::now();
//! let mut engine = MapEngine::new();
//! engine.load_categories(vec![Category::new("c1", "Leaders")], now);
//! engine.load_places(
//!     vec![
//!         Place::new("1", "Ana", -23.55, -46.63).with_category("c1"),
//!         Place::new("2", "Bia", -23.56, -46.64),
//!     ],
//!     now,
//! );
//!
//! engine.toggle_category("c1", now);
//! assert_eq!(engine.poll(now + Duration::from_millis(300)), vec![EngineEvent::RebuildDue]);
//!
//! let viewport = ViewportBounds::new(-23.6, -46.7, -23.5, -46.6, 14.0);
//! let markers = engine.filtered_points(&viewport);
//! assert_eq!(markers.place_count(), 1);
//! ```

use crate::compute::cluster::{CategoryIndex, ClusterEngine, ClusterSettings, RenderSet};
use crate::compute::distance_filter::{self, NearbyPlace};
use crate::compute::search::{SearchIndex, SearchOutcome};
use crate::compute::stats::{self, ViewportStats};
use crate::compute::validation::{count_invalid, validate_place};
use crate::config::Config;
use crate::debounce::{Debouncer, Ticket};
use crate::error::{GeoViewError, Result};
use crate::selection::{CategoryFilterState, CategoryGroup, group_by_type};
use geoview_types::{Category, Place, ViewportBounds};
use std::time::Instant;

/// A debounced recomputation that became due during [`MapEngine::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The query text settled; run [`MapEngine::search`] with it.
    SearchDue(String),
    /// Selection or clustering changed; redraw with
    /// [`MapEngine::filtered_points`].
    RebuildDue,
}

/// Orchestrates the compute layer over one dataset snapshot.
#[derive(Debug)]
pub struct MapEngine {
    config: Config,
    places: Vec<Place>,
    categories: Vec<Category>,
    category_index: CategoryIndex,
    search_index: SearchIndex,
    selection: CategoryFilterState,
    clustering_disabled: bool,
    viewport: Option<ViewportBounds>,
    clusters: ClusterEngine,
    search_debounce: Debouncer<String>,
    rebuild_debounce: Debouncer<()>,
}

impl MapEngine {
    /// Engine with the default configuration and no data.
    pub fn new() -> Self {
        Self::from_parts(Config::default())
    }

    /// Engine with a validated configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().map_err(GeoViewError::InvalidConfig)?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(config: Config) -> Self {
        let window = config.debounce();
        Self {
            search_index: SearchIndex::new(&[], &config),
            config,
            places: Vec::new(),
            categories: Vec::new(),
            category_index: CategoryIndex::default(),
            selection: CategoryFilterState::new(),
            clustering_disabled: false,
            viewport: None,
            clusters: ClusterEngine::new(),
            search_debounce: Debouncer::new(window),
            rebuild_debounce: Debouncer::new(window),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // Dataset

    /// Replace the place dataset and schedule a rebuild. Places with invalid
    /// coordinates are kept for search but excluded from every spatial
    /// operation.
    pub fn load_places(&mut self, places: Vec<Place>, now: Instant) {
        self.replace_places(places);
        self.rebuild_debounce.schedule((), now);
    }

    pub(crate) fn replace_places(&mut self, places: Vec<Place>) {
        let invalid = count_invalid(&places);
        if invalid > 0 {
            log::debug!(
                "{} of {} places lack valid coordinates",
                invalid,
                places.len()
            );
            for place in &places {
                if let Err(e) = validate_place(place) {
                    log::trace!("{}", e);
                }
            }
        }

        self.search_index = SearchIndex::new(&places, &self.config);
        self.places = places;
        self.clusters.invalidate();
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Install a category dataset, start from an empty selection and
    /// schedule a rebuild.
    pub fn load_categories(&mut self, categories: Vec<Category>, now: Instant) {
        self.replace_categories(categories);
        self.rebuild_debounce.schedule((), now);
    }

    pub(crate) fn replace_categories(&mut self, categories: Vec<Category>) {
        self.category_index = CategoryIndex::new(&categories);
        self.selection.load_categories(&categories);
        self.categories = categories;
        self.clusters.invalidate();
    }

    /// Record that the category dataset could not be loaded. Every place
    /// then renders with the default color.
    pub fn categories_unavailable(&mut self, now: Instant) {
        self.categories.clear();
        self.category_index = CategoryIndex::default();
        self.selection.mark_unavailable();
        self.clusters.invalidate();
        self.rebuild_debounce.schedule((), now);
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Loaded categories grouped by type.
    pub fn category_groups(&self) -> Vec<CategoryGroup> {
        group_by_type(&self.categories)
    }

    // Selection

    pub fn selection(&self) -> &CategoryFilterState {
        &self.selection
    }

    /// Flip one category. Returns whether it is selected afterwards.
    pub fn toggle_category(&mut self, category_id: &str, now: Instant) -> bool {
        let selected = self.selection.toggle(category_id);
        self.selection_changed(now);
        selected
    }

    pub fn select_all_categories(&mut self, now: Instant) {
        self.selection
            .select_all(self.categories.iter().map(|c| c.id.clone()));
        self.selection_changed(now);
    }

    pub fn select_no_categories(&mut self, now: Instant) {
        self.selection.select_none();
        self.selection_changed(now);
    }

    pub fn select_only_category(&mut self, category_id: &str, now: Instant) {
        self.selection.select_only(category_id);
        self.selection_changed(now);
    }

    pub fn select_group(&mut self, group: &CategoryGroup, now: Instant) {
        self.selection
            .select_group(group.category_ids.iter().cloned());
        self.selection_changed(now);
    }

    pub fn deselect_group(&mut self, group: &CategoryGroup, now: Instant) {
        self.selection.deselect_group(&group.category_ids);
        self.selection_changed(now);
    }

    fn selection_changed(&mut self, now: Instant) {
        if !self.selection.is_loaded() {
            return;
        }
        log::debug!(
            "Selection changed: {} categories selected",
            self.selection.len()
        );
        self.clusters.invalidate();
        self.rebuild_debounce.schedule((), now);
    }

    // Clustering

    /// Set the manual clustering toggle. A change schedules a rebuild.
    pub fn set_clustering_disabled(&mut self, disabled: bool, now: Instant) {
        if self.clustering_disabled == disabled {
            return;
        }
        self.clustering_disabled = disabled;
        self.clusters.invalidate();
        self.rebuild_debounce.schedule((), now);
    }

    pub fn clustering_disabled(&self) -> bool {
        self.clustering_disabled
    }

    /// Clustering parameters for the current toggle and selection.
    pub fn cluster_settings(&self) -> ClusterSettings {
        ClusterSettings::resolve(
            self.clustering_disabled,
            self.selection.len(),
            &self.config,
        )
    }

    /// Whether the markers drawn for `viewport` are out of date.
    pub fn needs_rebuild(&self, viewport: &ViewportBounds) -> bool {
        let eligible = self.selection.eligible(&self.places);
        self.clusters
            .is_stale(&eligible, &self.cluster_settings(), viewport.zoom)
    }

    /// Markers for the eligible places at the viewport's zoom.
    ///
    /// Always a full rebuild; a pending debounced rebuild is consumed.
    pub fn filtered_points(&mut self, viewport: &ViewportBounds) -> RenderSet<'_> {
        self.rebuild_debounce.cancel();
        let settings = self.cluster_settings();
        let eligible = self.selection.eligible(&self.places);
        self.clusters.rebuild(
            &eligible,
            &self.category_index,
            settings,
            viewport.zoom,
            &self.config.default_color,
        )
    }

    // Queries

    /// Eligible places nearest the viewport center, gated by zoom.
    pub fn nearby(&self, viewport: &ViewportBounds) -> Vec<NearbyPlace<'_>> {
        distance_filter::nearby(
            self.selection.eligible(&self.places),
            &viewport.center(),
            viewport.zoom,
            &self.config,
        )
    }

    /// Rank the whole dataset against `query`.
    pub fn search(&self, query: &str) -> SearchOutcome<'_> {
        self.search_index.search(&self.places, query)
    }

    pub fn viewport_stats(&self, bounds: &ViewportBounds) -> ViewportStats {
        stats::viewport_stats(bounds, &self.places)
    }

    // Events

    /// Debounce a change of the search text.
    pub fn on_query_changed(&mut self, query: impl Into<String>, now: Instant) -> Ticket {
        self.search_debounce.schedule(query.into(), now)
    }

    /// Record the new viewport and recompute its statistics.
    pub fn on_viewport_changed(&mut self, bounds: ViewportBounds) -> ViewportStats {
        let stats = self.viewport_stats(&bounds);
        self.viewport = Some(bounds);
        stats
    }

    pub fn viewport(&self) -> Option<&ViewportBounds> {
        self.viewport.as_ref()
    }

    /// Deliver the debounced recomputations that are due at `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if let Some(query) = self.search_debounce.poll(now) {
            events.push(EngineEvent::SearchDue(query));
        }
        if self.rebuild_debounce.poll(now).is_some() {
            events.push(EngineEvent::RebuildDue);
        }
        events
    }

    /// Whether a debounced trigger is still waiting.
    pub fn has_pending(&self) -> bool {
        self.search_debounce.is_pending() || self.rebuild_debounce.is_pending()
    }
}

impl Default for MapEngine {
    fn default() -> Self {
        Self::new()
    }
}
