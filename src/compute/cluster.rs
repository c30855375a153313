//! Marker clustering with dominant-category styling.
//!
//! ## Enable/disable rule
//!
//! Clustering is disabled when the manual flag is set or when the number of
//! selected categories falls inside the configured inclusive range (default
//! `[1, 5]`). Disabled clustering resolves to radius 0 and stop zoom 1, so
//! every place renders alone at every zoom. Enabled clustering uses the
//! configured radius (default 50 px) and stop zoom (default 16).
//!
//! ## Grouping
//!
//! Places are projected to Web-Mercator pixel space at the current zoom
//! (`256 · 2^zoom` pixels around the world). A greedy pass in input order
//! seeds a cluster at each unassigned place and absorbs every unassigned
//! place within the radius of the seed, found through an R-tree lookup.
//! Groups of one render as single markers.
//!
//! ## Styling
//!
//! Each cluster tallies members by category; the dominant category is the
//! one with the highest tally, the first seen winning ties. Its color fills
//! the cluster. Places with a missing or dangling category are not tallied.
//! Icon size depends on the member count: 40 px below 10, 45 px below 100,
//! 50 px otherwise.
//!
//! Rebuilds always start from scratch; [`ClusterEngine`] only remembers a
//! fingerprint of its last input so callers can tell when a rebuild is due.

use super::validation::valid_location;
use crate::config::Config;
use geo::Point;
use geoview_types::{Category, Place};
use rstar::RTree;
use rstar::primitives::GeomWithData;
use rustc_hash::{FxHashMap, FxHasher};
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};

/// Tile size of the rendering library's Web-Mercator projection.
const TILE_SIZE: f64 = 256.0;

/// Latitude sine clamp keeping the Mercator projection finite near the poles.
const MAX_SIN_LAT: f64 = 0.9999;

/// Resolved clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterSettings {
    pub radius_px: f64,
    pub stop_zoom: f64,
}

impl ClusterSettings {
    /// Settings used whenever clustering is disabled.
    pub const DISABLED: Self = Self {
        radius_px: 0.0,
        stop_zoom: 1.0,
    };

    /// Resolve settings from the manual flag and the selection size.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geoview::Config;
    /// use geoview::compute::cluster::ClusterSettings;
    ///
    /// let config = Config::default();
    ///
    /// let few = ClusterSettings::resolve(false, 3, &config);
    /// assert_eq!((few.radius_px, few.stop_zoom), (0.0, 1.0));
    ///
    /// let many = ClusterSettings::resolve(false, 6, &config);
    /// assert_eq!((many.radius_px, many.stop_zoom), (50.0, 16.0));
    ///
    /// let manual = ClusterSettings::resolve(true, 0, &config);
    /// assert!(!manual.is_enabled());
    /// ```
    pub fn resolve(manual_disable: bool, selection_len: usize, config: &Config) -> Self {
        let by_selection = (config.disable_clustering_min..=config.disable_clustering_max)
            .contains(&selection_len);

        if manual_disable || by_selection {
            Self::DISABLED
        } else {
            Self {
                radius_px: config.cluster_radius_px,
                stop_zoom: config.cluster_stop_zoom,
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.radius_px > 0.0
    }

    /// Whether places are grouped at `zoom`.
    pub fn clusters_at(&self, zoom: f64) -> bool {
        self.is_enabled() && zoom < self.stop_zoom
    }

    fn hash_into<H: Hasher>(&self, state: &mut H) {
        self.radius_px.to_bits().hash(state);
        self.stop_zoom.to_bits().hash(state);
    }
}

/// Icon size tier of a cluster marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IconSize {
    /// Fewer than 10 members.
    Small,
    /// 10 to 99 members.
    Medium,
    /// 100 members or more.
    Large,
}

impl IconSize {
    pub fn for_count(count: usize) -> Self {
        if count >= 100 {
            Self::Large
        } else if count >= 10 {
            Self::Medium
        } else {
            Self::Small
        }
    }

    /// Icon edge length in pixels.
    pub fn px(self) -> u32 {
        match self {
            Self::Small => 40,
            Self::Medium => 45,
            Self::Large => 50,
        }
    }
}

/// Category lookup by id.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    by_id: FxHashMap<String, Category>,
}

impl CategoryIndex {
    pub fn new(categories: &[Category]) -> Self {
        Self {
            by_id: categories
                .iter()
                .map(|c| (c.id.clone(), c.clone()))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// The place's category, if it references one that exists.
    pub fn category_of(&self, place: &Place) -> Option<&Category> {
        place.category_id.as_deref().and_then(|id| self.get(id))
    }

    /// Display color for a place, falling back to `default_color`.
    pub fn color_of<'a>(&'a self, place: &Place, default_color: &'a str) -> &'a str {
        self.category_of(place)
            .map_or(default_color, |c| c.color_or(default_color))
    }
}

/// Member count for one category inside a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTally {
    pub category_id: String,
    pub count: usize,
}

/// A group of nearby places rendered as one aggregate marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub member_ids: Vec<String>,
    /// Mean position of the members (x = longitude, y = latitude).
    pub center: Point<f64>,
    /// Per-category counts in first-seen order.
    pub tallies: SmallVec<[CategoryTally; 4]>,
    pub dominant_category: Option<String>,
    pub color: String,
    pub icon_size: IconSize,
}

impl Cluster {
    pub fn count(&self) -> usize {
        self.member_ids.len()
    }

    fn from_members(
        members: &[(&Place, Point<f64>)],
        categories: &CategoryIndex,
        default_color: &str,
    ) -> Self {
        let mut tallies: SmallVec<[CategoryTally; 4]> = SmallVec::new();
        let (mut sum_x, mut sum_y) = (0.0, 0.0);

        for (place, location) in members {
            sum_x += location.x();
            sum_y += location.y();

            let Some(category) = categories.category_of(place) else {
                continue;
            };
            match tallies.iter_mut().find(|t| t.category_id == category.id) {
                Some(tally) => tally.count += 1,
                None => tallies.push(CategoryTally {
                    category_id: category.id.clone(),
                    count: 1,
                }),
            }
        }

        let mut dominant: Option<&CategoryTally> = None;
        for tally in &tallies {
            if dominant.is_none_or(|best| tally.count > best.count) {
                dominant = Some(tally);
            }
        }
        let dominant_category = dominant.map(|t| t.category_id.clone());

        let color = dominant_category
            .as_deref()
            .and_then(|id| categories.get(id))
            .map_or(default_color, |c| c.color_or(default_color))
            .to_string();

        let n = members.len() as f64;
        Self {
            member_ids: members.iter().map(|(p, _)| p.id.clone()).collect(),
            center: Point::new(sum_x / n, sum_y / n),
            tallies,
            dominant_category,
            color,
            icon_size: IconSize::for_count(members.len()),
        }
    }
}

/// One drawable element of a render set.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderItem<'a> {
    Single { place: &'a Place, color: String },
    Cluster(Cluster),
}

/// Output of a cluster rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSet<'a> {
    pub items: Vec<RenderItem<'a>>,
    pub settings: ClusterSettings,
    pub zoom: f64,
    /// Incremented on every rebuild; no cluster survives across generations.
    pub generation: u64,
}

impl RenderSet<'_> {
    /// Number of places drawn, counting cluster members.
    pub fn place_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                RenderItem::Single { .. } => 1,
                RenderItem::Cluster(cluster) => cluster.count(),
            })
            .sum()
    }

    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.items.iter().filter_map(|item| match item {
            RenderItem::Cluster(cluster) => Some(cluster),
            RenderItem::Single { .. } => None,
        })
    }

    pub fn singles(&self) -> impl Iterator<Item = &Place> {
        self.items.iter().filter_map(|item| match item {
            RenderItem::Single { place, .. } => Some(*place),
            RenderItem::Cluster(_) => None,
        })
    }
}

/// Project a location to Web-Mercator pixel coordinates at `zoom`.
pub fn project(location: &Point<f64>, zoom: f64) -> [f64; 2] {
    let world = TILE_SIZE * zoom.exp2();
    let x = (location.x() + 180.0) / 360.0 * world;
    let sin_lat = location
        .y()
        .to_radians()
        .sin()
        .clamp(-MAX_SIN_LAT, MAX_SIN_LAT);
    let y = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * std::f64::consts::PI))
        * world;
    [x, y]
}

/// Rebuilds render sets from scratch and tracks when a rebuild is due.
#[derive(Debug, Clone, Default)]
pub struct ClusterEngine {
    generation: u64,
    fingerprint: Option<u64>,
}

impl ClusterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Forget the last input so the next check reports a rebuild as due.
    pub fn invalidate(&mut self) {
        self.fingerprint = None;
    }

    /// Whether the eligible set, settings or zoom differ from the last rebuild.
    pub fn is_stale(&self, eligible: &[&Place], settings: &ClusterSettings, zoom: f64) -> bool {
        self.fingerprint != Some(fingerprint(eligible, settings, zoom))
    }

    /// Discard previous clusters and group `eligible` at `zoom`.
    pub fn rebuild<'a>(
        &mut self,
        eligible: &[&'a Place],
        categories: &CategoryIndex,
        settings: ClusterSettings,
        zoom: f64,
        default_color: &str,
    ) -> RenderSet<'a> {
        self.generation += 1;
        self.fingerprint = Some(fingerprint(eligible, &settings, zoom));

        let located: Vec<(&'a Place, Point<f64>)> = eligible
            .iter()
            .filter_map(|place| valid_location(place).map(|loc| (*place, loc)))
            .collect();

        let items = if settings.clusters_at(zoom) {
            group(&located, categories, settings.radius_px, zoom, default_color)
        } else {
            located
                .iter()
                .map(|(place, _)| single(place, categories, default_color))
                .collect()
        };

        let set = RenderSet {
            items,
            settings,
            zoom,
            generation: self.generation,
        };

        log::debug!(
            "Cluster rebuild #{}: {} places -> {} items ({} clusters) at zoom {}, radius {}px",
            set.generation,
            located.len(),
            set.items.len(),
            set.clusters().count(),
            zoom,
            settings.radius_px
        );

        set
    }
}

fn single<'a>(place: &'a Place, categories: &CategoryIndex, default_color: &str) -> RenderItem<'a> {
    RenderItem::Single {
        place,
        color: categories.color_of(place, default_color).to_string(),
    }
}

fn group<'a>(
    located: &[(&'a Place, Point<f64>)],
    categories: &CategoryIndex,
    radius_px: f64,
    zoom: f64,
    default_color: &str,
) -> Vec<RenderItem<'a>> {
    let pixels: Vec<[f64; 2]> = located.iter().map(|(_, loc)| project(loc, zoom)).collect();
    let tree = RTree::bulk_load(
        pixels
            .iter()
            .enumerate()
            .map(|(idx, px)| GeomWithData::new(*px, idx))
            .collect(),
    );

    let mut assigned = vec![false; located.len()];
    let mut items = Vec::new();
    let radius_2 = radius_px * radius_px;

    for seed in 0..located.len() {
        if assigned[seed] {
            continue;
        }

        let mut members: Vec<usize> = tree
            .locate_within_distance(pixels[seed], radius_2)
            .map(|entry| entry.data)
            .filter(|idx| !assigned[*idx])
            .collect();
        members.sort_unstable();

        for idx in &members {
            assigned[*idx] = true;
        }

        if members.len() == 1 {
            items.push(single(located[seed].0, categories, default_color));
        } else {
            let grouped: Vec<(&Place, Point<f64>)> =
                members.iter().map(|idx| located[*idx]).collect();
            items.push(RenderItem::Cluster(Cluster::from_members(
                &grouped,
                categories,
                default_color,
            )));
        }
    }

    items
}

fn fingerprint(eligible: &[&Place], settings: &ClusterSettings, zoom: f64) -> u64 {
    let mut hasher = FxHasher::default();
    settings.hash_into(&mut hasher);
    zoom.to_bits().hash(&mut hasher);
    eligible.len().hash(&mut hasher);
    for place in eligible {
        place.id.hash(&mut hasher);
        place.category_id.hash(&mut hasher);
        place.lat.map(f64::to_bits).hash(&mut hasher);
        place.lng.map(f64::to_bits).hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> CategoryIndex {
        CategoryIndex::new(&[
            Category::new("red", "Red").with_color("#ff0000"),
            Category::new("blue", "Blue").with_color("#0000ff"),
            Category::new("plain", "Plain"),
        ])
    }

    fn at(id: &str, lat: f64, lng: f64, category: Option<&str>) -> Place {
        let place = Place::new(id, id, lat, lng);
        match category {
            Some(c) => place.with_category(c),
            None => place,
        }
    }

    const ENABLED: ClusterSettings = ClusterSettings {
        radius_px: 50.0,
        stop_zoom: 16.0,
    };

    #[test]
    fn test_disable_rule() {
        let config = Config::default();
        for n in 1..=5 {
            assert_eq!(ClusterSettings::resolve(false, n, &config), ClusterSettings::DISABLED);
        }
        for n in [0, 6, 7, 100] {
            assert_eq!(ClusterSettings::resolve(false, n, &config), ENABLED);
            assert_eq!(ClusterSettings::resolve(true, n, &config), ClusterSettings::DISABLED);
        }
    }

    #[test]
    fn test_icon_size_tiers() {
        assert_eq!(IconSize::for_count(2).px(), 40);
        assert_eq!(IconSize::for_count(9).px(), 40);
        assert_eq!(IconSize::for_count(10).px(), 45);
        assert_eq!(IconSize::for_count(99).px(), 45);
        assert_eq!(IconSize::for_count(100).px(), 50);
        assert_eq!(IconSize::for_count(5000).px(), 50);
    }

    #[test]
    fn test_projection_origin_and_scale() {
        let [x, y] = project(&Point::new(0.0, 0.0), 0.0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);

        let [x1, _] = project(&Point::new(10.0, 0.0), 1.0);
        let [x2, _] = project(&Point::new(10.0, 0.0), 2.0);
        assert!((x2 - 2.0 * x1).abs() < 1e-9);
    }

    #[test]
    fn test_nearby_places_cluster() {
        let places = [
            at("a", -23.5500, -46.6300, Some("red")),
            at("b", -23.5501, -46.6301, Some("blue")),
            at("c", -23.5502, -46.6302, Some("blue")),
            at("far", -22.9000, -43.1700, Some("red")),
        ];
        let eligible: Vec<&Place> = places.iter().collect();
        let mut engine = ClusterEngine::new();

        let set = engine.rebuild(&eligible, &categories(), ENABLED, 12.0, "#3388ff");
        assert_eq!(set.items.len(), 2);
        assert_eq!(set.place_count(), 4);

        let cluster = set.clusters().next().unwrap();
        assert_eq!(cluster.member_ids, vec!["a", "b", "c"]);
        assert_eq!(cluster.dominant_category.as_deref(), Some("blue"));
        assert_eq!(cluster.color, "#0000ff");
        assert_eq!(cluster.icon_size, IconSize::Small);

        let single: Vec<&str> = set.singles().map(|p| p.id.as_str()).collect();
        assert_eq!(single, vec!["far"]);
    }

    #[test]
    fn test_dominant_tie_first_seen_wins() {
        let places = [
            at("a", -23.5500, -46.6300, Some("red")),
            at("b", -23.5500, -46.6300, Some("blue")),
            at("c", -23.5500, -46.6300, Some("blue")),
            at("d", -23.5500, -46.6300, Some("red")),
        ];
        let eligible: Vec<&Place> = places.iter().collect();
        let set = ClusterEngine::new().rebuild(&eligible, &categories(), ENABLED, 10.0, "#3388ff");

        let cluster = set.clusters().next().unwrap();
        assert_eq!(cluster.dominant_category.as_deref(), Some("red"));
        assert_eq!(cluster.tallies.len(), 2);
        assert_eq!(cluster.tallies[0].category_id, "red");
    }

    #[test]
    fn test_dangling_category_uses_default_color() {
        let places = [
            at("a", -23.55, -46.63, Some("gone")),
            at("b", -23.55, -46.63, None),
            at("c", -23.55, -46.63, Some("plain")),
        ];
        let eligible: Vec<&Place> = places.iter().collect();
        let set = ClusterEngine::new().rebuild(&eligible, &categories(), ENABLED, 10.0, "#3388ff");

        let cluster = set.clusters().next().unwrap();
        assert_eq!(cluster.count(), 3);
        assert_eq!(cluster.dominant_category.as_deref(), Some("plain"));
        assert_eq!(cluster.color, "#3388ff");
        assert_eq!(cluster.tallies.iter().map(|t| t.count).sum::<usize>(), 1);

        let only_dangling = [
            at("a", -23.55, -46.63, Some("gone")),
            at("b", -23.55, -46.63, Some("gone")),
        ];
        let eligible: Vec<&Place> = only_dangling.iter().collect();
        let set = ClusterEngine::new().rebuild(&eligible, &categories(), ENABLED, 10.0, "#3388ff");
        let cluster = set.clusters().next().unwrap();
        assert!(cluster.dominant_category.is_none());
        assert_eq!(cluster.color, "#3388ff");
    }

    #[test]
    fn test_disabled_renders_all_singles() {
        let places: Vec<Place> = (0..20)
            .map(|i| at(&i.to_string(), -23.55, -46.63, Some("red")))
            .collect();
        let eligible: Vec<&Place> = places.iter().collect();
        let set = ClusterEngine::new().rebuild(
            &eligible,
            &categories(),
            ClusterSettings::DISABLED,
            3.0,
            "#3388ff",
        );

        assert_eq!(set.items.len(), 20);
        assert_eq!(set.clusters().count(), 0);
        assert!(set.items.iter().all(|item| matches!(
            item,
            RenderItem::Single { color, .. } if color == "#ff0000"
        )));
    }

    #[test]
    fn test_stop_zoom_disables_grouping() {
        let places = [at("a", -23.55, -46.63, None), at("b", -23.55, -46.63, None)];
        let eligible: Vec<&Place> = places.iter().collect();
        let mut engine = ClusterEngine::new();

        let below = engine.rebuild(&eligible, &categories(), ENABLED, 15.0, "#3388ff");
        assert_eq!(below.clusters().count(), 1);
        let at_stop = engine.rebuild(&eligible, &categories(), ENABLED, 16.0, "#3388ff");
        assert_eq!(at_stop.clusters().count(), 0);
    }

    #[test]
    fn test_icon_tier_for_large_cluster() {
        let places: Vec<Place> = (0..150)
            .map(|i| at(&i.to_string(), -23.55 + i as f64 * 1e-6, -46.63, Some("red")))
            .collect();
        let eligible: Vec<&Place> = places.iter().collect();
        let set = ClusterEngine::new().rebuild(&eligible, &categories(), ENABLED, 12.0, "#3388ff");

        let cluster = set.clusters().next().unwrap();
        assert_eq!(cluster.count(), 150);
        assert_eq!(cluster.icon_size.px(), 50);
    }

    #[test]
    fn test_invalid_coordinates_skipped() {
        let places = [
            at("a", -23.55, -46.63, None),
            Place::unlocated("x", "x"),
            at("y", f64::NAN, -46.63, None),
        ];
        let eligible: Vec<&Place> = places.iter().collect();
        let set = ClusterEngine::new().rebuild(&eligible, &categories(), ENABLED, 12.0, "#3388ff");
        assert_eq!(set.place_count(), 1);
    }

    #[test]
    fn test_rebuild_generation_and_staleness() {
        let places = [at("a", -23.55, -46.63, None), at("b", -23.56, -46.64, None)];
        let all: Vec<&Place> = places.iter().collect();
        let mut engine = ClusterEngine::new();

        assert!(engine.is_stale(&all, &ENABLED, 12.0));
        let first = engine.rebuild(&all, &categories(), ENABLED, 12.0, "#3388ff");
        assert_eq!(first.generation, 1);
        assert!(!engine.is_stale(&all, &ENABLED, 12.0));

        assert!(engine.is_stale(&all[..1], &ENABLED, 12.0));
        assert!(engine.is_stale(&all, &ClusterSettings::DISABLED, 12.0));
        assert!(engine.is_stale(&all, &ENABLED, 13.0));

        let second = engine.rebuild(&all[..1], &categories(), ENABLED, 12.0, "#3388ff");
        assert_eq!(second.generation, 2);

        engine.invalidate();
        assert!(engine.is_stale(&all[..1], &ENABLED, 12.0));
    }
}
