//! GeoJSON export of the feature collection.

use crate::feature::Feature;
use crate::geometry::Geometry;
use geojson::{FeatureCollection, GeoJson, JsonObject, JsonValue};

fn to_geojson_geometry(geometry: &Geometry) -> geojson::Geometry {
    let value = match geometry {
        Geometry::Point(p) => geojson::Value::Point(p.to_vec()),
        Geometry::LineString(line) => {
            geojson::Value::LineString(line.iter().map(|p| p.to_vec()).collect())
        }
        Geometry::Polygon(rings) => geojson::Value::Polygon(
            rings
                .iter()
                .map(|ring| ring.iter().map(|p| p.to_vec()).collect())
                .collect(),
        ),
    };
    geojson::Geometry::new(value)
}

/// Convert one feature. Its own properties are kept; `label`, `type` and
/// `createdAt` are added on top.
pub fn to_geojson_feature(feature: &Feature) -> geojson::Feature {
    let mut properties: JsonObject = feature.properties.clone();
    properties.insert("label".into(), JsonValue::from(feature.label.clone()));
    properties.insert("type".into(), JsonValue::from(feature.kind().as_str()));
    properties.insert(
        "createdAt".into(),
        JsonValue::from(feature.created_at().to_rfc3339()),
    );

    geojson::Feature {
        bbox: None,
        geometry: Some(to_geojson_geometry(feature.geometry())),
        id: Some(geojson::feature::Id::String(feature.id().to_string())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// All features as a `FeatureCollection`, in store order.
pub fn to_geojson(features: &[Feature]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: features.iter().map(to_geojson_feature).collect(),
        foreign_members: None,
    }
}

/// Serialized `FeatureCollection`.
pub fn to_geojson_string(features: &[Feature]) -> String {
    GeoJson::from(to_geojson(features)).to_string()
}
