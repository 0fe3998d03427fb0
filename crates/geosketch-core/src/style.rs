//! Style descriptors handed to the map widget with each shape.

use crate::feature::FeatureKind;
use serde::Serialize;

/// Stroke/fill description of a rendered shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    pub color: &'static str,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<&'static str>,
    /// Marker radius in pixels (points only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<&'static str>,
}

/// Style for a stored feature, brighter when it is the active selection.
pub fn style_for(kind: FeatureKind, active: bool) -> FeatureStyle {
    match kind {
        FeatureKind::Polygon => FeatureStyle {
            color: if active { "#2c3e50" } else { "#3498db" },
            weight: 3.0,
            opacity: if active { 1.0 } else { 0.7 },
            fill_opacity: if active { 0.3 } else { 0.2 },
            fill_color: Some("#3498db"),
            radius: None,
            dash_array: None,
        },
        FeatureKind::Line => FeatureStyle {
            color: if active { "#8e44ad" } else { "#9b59b6" },
            weight: if active { 4.0 } else { 3.0 },
            opacity: if active { 1.0 } else { 0.7 },
            fill_opacity: if active { 0.3 } else { 0.2 },
            fill_color: None,
            radius: None,
            dash_array: None,
        },
        FeatureKind::Point => FeatureStyle {
            color: "#c0392b",
            weight: 2.0,
            opacity: 1.0,
            fill_opacity: 0.8,
            fill_color: Some("#e74c3c"),
            radius: Some(if active { 8.0 } else { 6.0 }),
            dash_array: None,
        },
    }
}

/// Dashed segment from the last committed vertex to the pointer.
pub fn preview_style(kind: FeatureKind) -> FeatureStyle {
    let base = style_for(kind, true);
    FeatureStyle {
        weight: 2.0,
        opacity: if kind == FeatureKind::Line { 0.7 } else { 0.6 },
        dash_array: Some("5, 10"),
        fill_color: None,
        ..base
    }
}
