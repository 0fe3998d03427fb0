//! Geographic coordinates and GeoJSON-shaped geometry.
//!
//! The map widget speaks `[lat, lng]`; GeoJSON positions are `[lng, lat]`.
//! Every conversion between the two goes through [`LatLng`] so the axis swap
//! happens in exactly one place.

use crate::feature::FeatureKind;
use kurbo::{Point, Rect};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A GeoJSON position: `[longitude, latitude]`.
pub type Position = [f64; 2];

/// A latitude/longitude pair in the map widget's convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Convert to a GeoJSON position (`[lng, lat]`).
    pub fn to_position(self) -> Position {
        [self.lng, self.lat]
    }

    /// Build from a GeoJSON position (`[lng, lat]`).
    pub fn from_position(position: Position) -> Self {
        Self::new(position[1], position[0])
    }

    /// Planar point with `x = lng`, `y = lat`, used for bounding boxes.
    pub fn to_point(self) -> Point {
        Point::new(self.lng, self.lat)
    }

    pub fn from_point(point: Point) -> Self {
        Self::new(point.y, point.x)
    }
}

/// Errors raised when building or decoding a geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("{kind} needs at least {required} positions, got {actual}")]
    TooFewPositions {
        kind: FeatureKind,
        required: usize,
        actual: usize,
    },
    #[error("polygon ring is not closed")]
    UnclosedRing,
    #[error("polygon must have exactly one ring, got {0}")]
    RingCount(usize),
    #[error("geometry is a {actual} but the feature is a {expected}")]
    KindMismatch {
        expected: FeatureKind,
        actual: FeatureKind,
    },
}

/// Minimum positions in a line string.
pub const MIN_LINE_POSITIONS: usize = 2;

/// Minimum entries in a closed polygon ring (two vertices plus the closing duplicate).
pub const MIN_RING_POSITIONS: usize = 3;

/// GeoJSON geometry restricted to the shapes the editor can draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
}

/// Unchecked wire form; validated into [`Geometry`].
#[derive(Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum RawGeometry {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawGeometry::deserialize(deserializer)?
            .try_into()
            .map_err(serde::de::Error::custom)
    }
}

impl TryFrom<RawGeometry> for Geometry {
    type Error = GeometryError;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        match raw {
            RawGeometry::Point(position) => Ok(Geometry::Point(position)),
            RawGeometry::LineString(positions) => {
                check_count(FeatureKind::Line, MIN_LINE_POSITIONS, positions.len())?;
                Ok(Geometry::LineString(positions))
            }
            RawGeometry::Polygon(rings) => {
                if rings.len() != 1 {
                    return Err(GeometryError::RingCount(rings.len()));
                }
                let ring = &rings[0];
                check_count(FeatureKind::Polygon, MIN_RING_POSITIONS, ring.len())?;
                if ring.first() != ring.last() {
                    return Err(GeometryError::UnclosedRing);
                }
                Ok(Geometry::Polygon(rings))
            }
        }
    }
}

fn check_count(kind: FeatureKind, required: usize, actual: usize) -> Result<(), GeometryError> {
    if actual < required {
        Err(GeometryError::TooFewPositions {
            kind,
            required,
            actual,
        })
    } else {
        Ok(())
    }
}

impl Geometry {
    /// A point geometry.
    pub fn point(at: LatLng) -> Self {
        Geometry::Point(at.to_position())
    }

    /// An open path through the given vertices, in order.
    pub fn line_string(vertices: &[LatLng]) -> Result<Self, GeometryError> {
        check_count(FeatureKind::Line, MIN_LINE_POSITIONS, vertices.len())?;
        Ok(Geometry::LineString(
            vertices.iter().map(|v| v.to_position()).collect(),
        ))
    }

    /// A single closed ring through the given vertices.
    ///
    /// The first vertex is repeated at the end; `vertices` itself must not
    /// already be closed.
    pub fn polygon(vertices: &[LatLng]) -> Result<Self, GeometryError> {
        check_count(FeatureKind::Polygon, MIN_LINE_POSITIONS, vertices.len())?;
        let mut ring: Vec<Position> = vertices.iter().map(|v| v.to_position()).collect();
        ring.push(ring[0]);
        Ok(Geometry::Polygon(vec![ring]))
    }

    /// Build the geometry a finished drawing of `kind` produces.
    pub fn from_vertices(kind: FeatureKind, vertices: &[LatLng]) -> Result<Self, GeometryError> {
        match kind {
            FeatureKind::Polygon => Self::polygon(vertices),
            FeatureKind::Line => Self::line_string(vertices),
            FeatureKind::Point => match vertices {
                [at] => Ok(Self::point(*at)),
                _ => Err(GeometryError::TooFewPositions {
                    kind,
                    required: 1,
                    actual: vertices.len(),
                }),
            },
        }
    }

    /// The feature kind this geometry belongs to.
    pub fn kind(&self) -> FeatureKind {
        match self {
            Geometry::Point(_) => FeatureKind::Point,
            Geometry::LineString(_) => FeatureKind::Line,
            Geometry::Polygon(_) => FeatureKind::Polygon,
        }
    }

    /// All positions as lat/lng pairs, in stored order.
    ///
    /// For polygons this is the outer ring including the closing duplicate.
    pub fn lat_lngs(&self) -> Vec<LatLng> {
        match self {
            Geometry::Point(p) => vec![LatLng::from_position(*p)],
            Geometry::LineString(line) => line.iter().copied().map(LatLng::from_position).collect(),
            Geometry::Polygon(rings) => rings
                .first()
                .map(|ring| ring.iter().copied().map(LatLng::from_position).collect())
                .unwrap_or_default(),
        }
    }

    /// Bounding box in lng/lat space (`x = lng`, `y = lat`).
    pub fn bounds(&self) -> Rect {
        let mut points = self.lat_lngs().into_iter().map(LatLng::to_point);
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p))
    }

    /// Centre of the bounding box.
    pub fn center(&self) -> LatLng {
        LatLng::from_point(self.bounds().center())
    }

    /// Number of stored positions (ring entries for polygons).
    pub fn position_count(&self) -> usize {
        match self {
            Geometry::Point(_) => 1,
            Geometry::LineString(line) => line.len(),
            Geometry::Polygon(rings) => rings.first().map_or(0, Vec::len),
        }
    }
}
