//! Viewport-scoped neighborhood and city statistics.
//!
//! Every call recomputes from the full dataset; nothing is carried between
//! viewport changes.

use super::validation::valid_location;
use geoview_types::{Place, ViewportBounds};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Bucket for places with a missing or blank grouping field.
pub const NOT_INFORMED: &str = "not informed";

/// Size of one group among the visible places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    pub name: String,
    pub count: usize,
    /// `count / total_visible × 100`.
    pub pct: f64,
}

/// Aggregate for one grouping key (neighborhood or city).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    /// Number of distinct groups.
    pub count: usize,
    /// Most populous group; the first seen wins ties.
    pub top: Option<GroupCount>,
    /// Every group, in first-seen order.
    pub breakdown: Vec<GroupCount>,
}

/// Statistics for the places inside a viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportStats {
    pub total_visible: usize,
    pub neighborhoods: GroupStats,
    pub cities: GroupStats,
}

fn group_key(field: Option<&str>) -> &str {
    match field.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => NOT_INFORMED,
    }
}

fn group_stats<'a>(keys: impl Iterator<Item = &'a str>, total: usize) -> GroupStats {
    let mut positions: FxHashMap<&str, usize> = FxHashMap::default();
    let mut tallies: Vec<(&str, usize)> = Vec::new();

    for key in keys {
        match positions.get(key) {
            Some(&idx) => tallies[idx].1 += 1,
            None => {
                positions.insert(key, tallies.len());
                tallies.push((key, 1));
            }
        }
    }

    let breakdown: Vec<GroupCount> = tallies
        .into_iter()
        .map(|(name, count)| GroupCount {
            name: name.to_string(),
            count,
            pct: count as f64 / total as f64 * 100.0,
        })
        .collect();

    let mut top: Option<&GroupCount> = None;
    for group in &breakdown {
        if top.is_none_or(|best| group.count > best.count) {
            top = Some(group);
        }
    }

    GroupStats {
        count: breakdown.len(),
        top: top.cloned(),
        breakdown,
    }
}

/// Aggregate the places visible inside `bounds`.
///
/// # Examples
///
/// ```rust
/// use geoview::{Place, ViewportBounds};
/// use geoview::compute::stats::viewport_stats;
///
/// let places = vec![
///     Place::new("1", "a", -23.55, -46.63).with_neighborhood("Centro"),
///     Place::new("2", "b", -23.56, -46.64).with_neighborhood("Centro"),
///     Place::new("3", "c", -23.57, -46.65),
///     Place::new("4", "d", -10.00, -40.00).with_neighborhood("Longe"),
/// ];
/// let bounds = ViewportBounds::new(-23.6, -46.7, -23.5, -46.6, 13.0);
///
/// let stats = viewport_stats(&bounds, &places);
/// assert_eq!(stats.total_visible, 3);
/// assert_eq!(stats.neighborhoods.count, 2);
///
/// let top = stats.neighborhoods.top.unwrap();
/// assert_eq!(top.name, "Centro");
/// assert_eq!(top.count, 2);
/// ```
pub fn viewport_stats(bounds: &ViewportBounds, places: &[Place]) -> ViewportStats {
    let visible: Vec<&Place> = places
        .iter()
        .filter(|place| valid_location(place).is_some_and(|loc| bounds.contains(&loc)))
        .collect();
    let total = visible.len();

    let stats = ViewportStats {
        total_visible: total,
        neighborhoods: group_stats(
            visible.iter().map(|p| group_key(p.neighborhood.as_deref())),
            total,
        ),
        cities: group_stats(visible.iter().map(|p| group_key(p.city.as_deref())), total),
    };

    log::debug!(
        "Viewport stats: {} visible, {} neighborhoods, {} cities",
        stats.total_visible,
        stats.neighborhoods.count,
        stats.cities.count
    );

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ViewportBounds {
        ViewportBounds::new(-24.0, -47.0, -23.0, -46.0, 12.0)
    }

    fn dataset() -> Vec<Place> {
        vec![
            Place::new("1", "a", -23.5, -46.5)
                .with_neighborhood("Centro")
                .with_city("São Paulo"),
            Place::new("2", "b", -23.4, -46.4)
                .with_neighborhood("Sé")
                .with_city("São Paulo"),
            Place::new("3", "c", -23.3, -46.3)
                .with_neighborhood("Sé")
                .with_city("Guarulhos"),
            Place::new("4", "d", -23.2, -46.2).with_neighborhood("   "),
            Place::new("5", "e", -10.0, -40.0).with_neighborhood("Sé"),
            Place::unlocated("6", "f").with_neighborhood("Sé"),
        ]
    }

    #[test]
    fn test_only_visible_counted() {
        let stats = viewport_stats(&bounds(), &dataset());
        assert_eq!(stats.total_visible, 4);
    }

    #[test]
    fn test_neighborhood_grouping() {
        let stats = viewport_stats(&bounds(), &dataset());
        let names: Vec<&str> = stats
            .neighborhoods
            .breakdown
            .iter()
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(names, vec!["Centro", "Sé", NOT_INFORMED]);
        assert_eq!(stats.neighborhoods.count, 3);

        let top = stats.neighborhoods.top.as_ref().unwrap();
        assert_eq!(top.name, "Sé");
        assert_eq!(top.count, 2);
        assert_eq!(top.pct, 50.0);
    }

    #[test]
    fn test_city_grouping_with_fallback() {
        let stats = viewport_stats(&bounds(), &dataset());
        assert_eq!(stats.cities.count, 3);

        let top = stats.cities.top.as_ref().unwrap();
        assert_eq!(top.name, "São Paulo");
        assert_eq!(top.count, 2);

        let missing = stats
            .cities
            .breakdown
            .iter()
            .find(|g| g.name == NOT_INFORMED)
            .unwrap();
        assert_eq!(missing.count, 1);
        assert_eq!(missing.pct, 25.0);
    }

    #[test]
    fn test_counts_and_percentages_are_consistent() {
        let stats = viewport_stats(&bounds(), &dataset());
        for grouping in [&stats.neighborhoods, &stats.cities] {
            let sum: usize = grouping.breakdown.iter().map(|g| g.count).sum();
            assert_eq!(sum, stats.total_visible);

            let pct: f64 = grouping.breakdown.iter().map(|g| g.pct).sum();
            assert!((pct - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_tie_first_seen_wins() {
        let places = vec![
            Place::new("1", "a", -23.5, -46.5).with_neighborhood("Norte"),
            Place::new("2", "b", -23.5, -46.5).with_neighborhood("Sul"),
        ];
        let stats = viewport_stats(&bounds(), &places);
        assert_eq!(stats.neighborhoods.top.unwrap().name, "Norte");
    }

    #[test]
    fn test_empty_viewport() {
        let stats = viewport_stats(&ViewportBounds::new(0.0, 0.0, 1.0, 1.0, 12.0), &dataset());
        assert_eq!(stats.total_visible, 0);
        assert_eq!(stats.neighborhoods.count, 0);
        assert!(stats.neighborhoods.top.is_none());
        assert!(stats.cities.breakdown.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let stats = viewport_stats(&bounds(), &dataset());
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalVisible"], 4);
        assert_eq!(json["neighborhoods"]["top"]["name"], "Sé");
    }
}
