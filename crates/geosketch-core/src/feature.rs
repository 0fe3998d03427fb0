//! Feature records: the persisted unit of the editor.

use crate::geometry::{Geometry, GeometryError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Free-form attribute data attached to a feature.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// The three shapes a user can sketch. Doubles as the drawing tool identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Polygon,
    Line,
    Point,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 3] = [FeatureKind::Polygon, FeatureKind::Line, FeatureKind::Point];

    /// Capitalised name used in default labels.
    pub fn display_name(self) -> &'static str {
        match self {
            FeatureKind::Polygon => "Polygon",
            FeatureKind::Line => "Line",
            FeatureKind::Point => "Point",
        }
    }

    /// Identifier used on the wire and by the tool palette.
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKind::Polygon => "polygon",
            FeatureKind::Line => "line",
            FeatureKind::Point => "point",
        }
    }

    /// Whether drawing accumulates several clicks before finishing.
    pub fn is_multi_point(self) -> bool {
        !matches!(self, FeatureKind::Point)
    }

    /// Clicks needed before a drawing can be finished.
    pub fn min_points(self) -> usize {
        if self.is_multi_point() { 2 } else { 1 }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeatureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown drawing tool: {s}"))
    }
}

/// Opaque, unique feature identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(String);

impl FeatureId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(format!("feature-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default label for a new feature of `kind`.
///
/// Numbering follows the count of live features of the same kind, so
/// deleting one can make the next label repeat an existing one.
pub fn default_label(kind: FeatureKind, existing: &[Feature]) -> String {
    let count = existing.iter().filter(|f| f.kind == kind).count() + 1;
    format!("{} {}", kind.display_name(), count)
}

/// A feature that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDraft {
    pub label: String,
    pub geometry: Geometry,
    pub properties: Properties,
}

impl FeatureDraft {
    pub fn new(label: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            label: label.into(),
            geometry,
            properties: Properties::new(),
        }
    }

    pub fn kind(&self) -> FeatureKind {
        self.geometry.kind()
    }
}

/// A stored geographic feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub(crate) id: FeatureId,
    #[serde(rename = "type")]
    pub(crate) kind: FeatureKind,
    /// Human-readable name.
    pub label: String,
    pub(crate) geometry: Geometry,
    /// Attribute data, carried through untouched.
    #[serde(default)]
    pub properties: Properties,
    pub(crate) created_at: DateTime<Utc>,
}

impl Feature {
    /// Stamp a draft with a fresh id and creation time.
    pub(crate) fn from_draft(draft: FeatureDraft) -> Self {
        Self {
            id: FeatureId::generate(),
            kind: draft.geometry.kind(),
            label: draft.label,
            geometry: draft.geometry,
            properties: draft.properties,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Check that the declared kind matches the geometry.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let actual = self.geometry.kind();
        if actual == self.kind {
            Ok(())
        } else {
            Err(GeometryError::KindMismatch {
                expected: self.kind,
                actual,
            })
        }
    }
}

/// Partial update merged into an existing feature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureUpdate {
    pub label: Option<String>,
    pub properties: Option<Properties>,
}

impl FeatureUpdate {
    /// An update that only renames.
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, feature: &mut Feature) {
        if let Some(label) = self.label {
            feature.label = label;
        }
        if let Some(properties) = self.properties {
            feature.properties = properties;
        }
    }
}
