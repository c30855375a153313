use geoview::compute::search::search;
use geoview::compute::stats::{NOT_INFORMED, viewport_stats};
use geoview::{Category, Config, MapEngine, Place, RenderItem, ViewportBounds, bounding_box};
use std::time::Instant;

/// Test 1: Places with missing or impossible coordinates
#[test]
fn test_invalid_coordinates_are_skipped() {
    let mut engine = MapEngine::new();
    engine.load_places(
        vec![
            Place::new("ok", "Valid", -23.55, -46.63),
            Place::new("lat", "Bad latitude", 91.0, -46.63),
            Place::new("lng", "Bad longitude", -23.55, 181.0),
            Place::new("nan", "Not a number", f64::NAN, -46.63),
            Place::new("inf", "Infinite", -23.55, f64::INFINITY),
            Place::unlocated("none", "Missing"),
        ],
        Instant::now(),
    );

    let viewport = ViewportBounds::new(-90.0, -180.0, 90.0, 180.0, 12.0);
    assert_eq!(engine.filtered_points(&viewport).place_count(), 1);
    assert_eq!(engine.nearby(&viewport).len(), 1);
    assert_eq!(engine.viewport_stats(&viewport).total_visible, 1);

    // Search still reaches places without a location.
    let outcome = engine.search("missing");
    assert_eq!(outcome.ids(), vec!["none"]);
    assert!(outcome.bounds.is_none());
}

/// Test 2: Empty dataset
#[test]
fn test_empty_dataset() {
    let mut engine = MapEngine::new();
    let viewport = ViewportBounds::new(-23.6, -46.7, -23.5, -46.6, 14.0);

    assert!(engine.filtered_points(&viewport).items.is_empty());
    assert!(engine.nearby(&viewport).is_empty());
    assert!(engine.search("").is_empty());
    assert!(engine.search("anything").is_empty());
    assert_eq!(engine.viewport_stats(&viewport).total_visible, 0);
    assert!(bounding_box(&Vec::<Place>::new()).is_none());
}

/// Test 3: Blank and whitespace-only queries
#[test]
fn test_blank_query_returns_everything_in_order() {
    let places = vec![
        Place::new("b", "Bia", -23.50, -46.60),
        Place::new("a", "Ana", -23.60, -46.70),
        Place::unlocated("c", "Caio"),
    ];

    for query in ["", "   ", "\t\n"] {
        let outcome = search(&places, query, &Config::default());
        assert_eq!(outcome.ids(), vec!["b", "a", "c"]);
        assert!(outcome.results.iter().all(|r| r.score == 0));

        let bounds = outcome.bounds.unwrap();
        assert_eq!(bounds.min().x, -46.70);
        assert_eq!(bounds.max().y, -23.50);
    }
}

/// Test 4: Diacritics and case are ignored on both sides
#[test]
fn test_accent_insensitive_search() {
    let places = vec![
        Place::new("1", "José Conceição", -23.5, -46.6).with_neighborhood("São Miguel"),
        Place::new("2", "Jose Conceicao", -23.5, -46.6).with_city("SAO PAULO"),
    ];

    assert_eq!(search(&places, "CONCEIÇÃO", &Config::default()).len(), 2);
    assert_eq!(search(&places, "sao", &Config::default()).len(), 2);
    assert_eq!(
        search(&places, "miguel", &Config::default()).ids(),
        vec!["1"]
    );
}

/// Test 5: Short digit strings never score as postal codes
#[test]
fn test_short_numeric_term_matches_house_number() {
    let places = vec![
        Place::new("house", "A", -23.5, -46.6)
            .with_address("Rua Augusta, 1310")
            .with_postal_code("01310-100"),
        Place::new("other", "B", -23.5, -46.6).with_address("Rua Augusta, 500"),
    ];

    let outcome = search(&places, "1310", &Config::default());
    assert_eq!(outcome.ids(), vec!["house"]);
    assert_eq!(outcome.results[0].score, 20);
}

/// Test 6: Dangling category ids
#[test]
fn test_dangling_category_falls_back() {
    let now = Instant::now();
    let mut engine = MapEngine::new();
    engine.load_categories(
        vec![Category::new("c1", "Leaders").with_color("#ff0000")],
        now,
    );
    engine.load_places(
        vec![
            Place::new("1", "Ana", -23.55, -46.63).with_category("c1"),
            Place::new("2", "Bia", -23.56, -46.64).with_category("deleted"),
        ],
        now,
    );

    engine.select_all_categories(now);
    engine.toggle_category("deleted", now);
    assert!(engine.selection().is_selected("deleted"));

    let viewport = ViewportBounds::new(-23.6, -46.7, -23.5, -46.6, 17.0);
    let set = engine.filtered_points(&viewport);
    let colors: Vec<(&str, &str)> = set
        .items
        .iter()
        .filter_map(|item| match item {
            RenderItem::Single { place, color } => Some((place.id.as_str(), color.as_str())),
            RenderItem::Cluster(_) => None,
        })
        .collect();
    assert_eq!(colors, vec![("1", "#ff0000"), ("2", "#3388ff")]);
}

/// Test 7: Viewport spanning the antimeridian
#[test]
fn test_antimeridian_viewport_stats() {
    let places = vec![
        Place::new("fiji", "Suva", -18.14, 178.44).with_city("Suva"),
        Place::new("samoa", "Apia", -13.83, -171.76).with_city("Apia"),
        Place::new("sp", "São Paulo", -23.55, -46.63).with_city("São Paulo"),
    ];
    let bounds = ViewportBounds::new(-25.0, 170.0, -10.0, -165.0, 5.0);
    assert!(bounds.crosses_antimeridian());

    let stats = viewport_stats(&bounds, &places);
    assert_eq!(stats.total_visible, 2);
    assert_eq!(stats.cities.count, 2);
    assert!(stats.neighborhoods.breakdown.iter().all(|g| g.name == NOT_INFORMED));
}

/// Test 8: Identical coordinates collapse into one cluster
#[test]
fn test_coincident_places_cluster_until_stop_zoom() {
    let categories: Vec<Category> = (0..6)
        .map(|i| Category::new(format!("c{}", i), "x"))
        .collect();
    let places: Vec<Place> = (0..120)
        .map(|i| {
            Place::new(format!("{}", i), "same", -23.55, -46.63)
                .with_category(format!("c{}", i % 6))
        })
        .collect();

    let now = Instant::now();
    let mut engine = MapEngine::new();
    engine.load_categories(categories, now);
    engine.load_places(places, now);
    engine.select_all_categories(now);

    let low = ViewportBounds::new(-23.6, -46.7, -23.5, -46.6, 15.0);
    let set = engine.filtered_points(&low);
    let clusters: Vec<_> = set.clusters().collect();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].count(), 120);
    assert_eq!(clusters[0].icon_size.px(), 50);
    assert_eq!(clusters[0].dominant_category.as_deref(), Some("c0"));

    let high = ViewportBounds::new(-23.6, -46.7, -23.5, -46.6, 16.0);
    assert_eq!(engine.filtered_points(&high).items.len(), 120);
}
