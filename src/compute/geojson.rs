//! GeoJSON export of render sets and search outcomes.

use super::cluster::{Cluster, RenderItem, RenderSet};
use super::search::SearchOutcome;
use super::validation::valid_location;
use crate::error::{GeoViewError, Result};
use geo::{Point, Rect};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use geoview_types::Place;
use serde_json::json;

fn point_geometry(point: &Point<f64>) -> Geometry {
    Geometry::new(Value::Point(vec![point.x(), point.y()]))
}

fn rect_bbox(rect: &Rect<f64>) -> Vec<f64> {
    vec![rect.min().x, rect.min().y, rect.max().x, rect.max().y]
}

fn feature(id: String, geometry: Option<Geometry>, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry,
        id: Some(Id::String(id)),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn place_properties(place: &Place) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert("kind".into(), json!("place"));
    props.insert("name".into(), json!(place.name));
    if let Some(category_id) = &place.category_id {
        props.insert("categoryId".into(), json!(category_id));
    }
    if let Some(address) = &place.address {
        props.insert("address".into(), json!(address));
    }
    props
}

fn cluster_feature(cluster: &Cluster, generation: u64, index: usize) -> Feature {
    let tallies: serde_json::Map<String, serde_json::Value> = cluster
        .tallies
        .iter()
        .map(|t| (t.category_id.clone(), json!(t.count)))
        .collect();

    let mut props = JsonObject::new();
    props.insert("kind".into(), json!("cluster"));
    props.insert("count".into(), json!(cluster.count()));
    props.insert("color".into(), json!(cluster.color));
    props.insert("iconSize".into(), json!(cluster.icon_size.px()));
    props.insert("dominantCategory".into(), json!(cluster.dominant_category));
    props.insert("tallies".into(), serde_json::Value::Object(tallies));
    props.insert("members".into(), json!(cluster.member_ids));

    feature(
        format!("cluster-{}-{}", generation, index),
        Some(point_geometry(&cluster.center)),
        props,
    )
}

/// Convert a render set to a `FeatureCollection`, one feature per item.
///
/// Cluster ids embed the rebuild generation, so a consumer can never match a
/// cluster against one from an earlier rebuild.
pub fn render_set_to_feature_collection(set: &RenderSet<'_>) -> FeatureCollection {
    let features = set
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            RenderItem::Single { place, color } => {
                let mut props = place_properties(place);
                props.insert("color".into(), json!(color));
                feature(
                    place.id.clone(),
                    valid_location(place).as_ref().map(point_geometry),
                    props,
                )
            }
            RenderItem::Cluster(cluster) => cluster_feature(cluster, set.generation, index),
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Convert a search outcome to a `FeatureCollection` in rank order.
///
/// Results without valid coordinates are kept with a null geometry. The
/// collection's `bbox` is the re-fit box.
pub fn search_outcome_to_feature_collection(outcome: &SearchOutcome<'_>) -> FeatureCollection {
    let features = outcome
        .results
        .iter()
        .enumerate()
        .map(|(rank, result)| {
            let mut props = place_properties(result.place);
            props.insert("score".into(), json!(result.score));
            props.insert("rank".into(), json!(rank + 1));
            feature(
                result.place.id.clone(),
                valid_location(result.place).as_ref().map(point_geometry),
                props,
            )
        })
        .collect();

    FeatureCollection {
        bbox: outcome.bounds.as_ref().map(rect_bbox),
        features,
        foreign_members: None,
    }
}

/// Serialize a collection to a GeoJSON string.
pub fn to_geojson_string(collection: &FeatureCollection) -> Result<String> {
    serde_json::to_string(collection).map_err(|e| {
        GeoViewError::Serialization(format!("Failed to serialize feature collection: {}", e))
    })
}
