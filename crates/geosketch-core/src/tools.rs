//! Drawing session: turns a sequence of map clicks into one geometry.

use crate::feature::FeatureKind;
use crate::geometry::{Geometry, LatLng};
use crate::input::MapEvent;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cursor shown over the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CursorMode {
    /// Not drawing; the map can be panned.
    #[default]
    Grab,
    Polygon,
    Line,
    Point,
}

impl CursorMode {
    pub fn for_tool(tool: FeatureKind) -> Self {
        match tool {
            FeatureKind::Polygon => CursorMode::Polygon,
            FeatureKind::Line => CursorMode::Line,
            FeatureKind::Point => CursorMode::Point,
        }
    }
}

/// Recoverable drawing failures. None of them end the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("Please add at least {required} points to create a feature")]
    InsufficientPoints { required: usize, actual: usize },
    #[error("No drawing in progress")]
    NotDrawing,
    #[error("The {0} tool places a feature with a single click")]
    SingleClickTool(FeatureKind),
}

/// State of the drawing session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Waiting for a tool to be dropped on the map.
    #[default]
    Idle,
    /// A tool is active and collecting clicks.
    Active {
        tool: FeatureKind,
        /// Committed vertices, in click order.
        points: Vec<LatLng>,
        /// Last pointer position seen while at least one vertex exists.
        pointer: Option<LatLng>,
    },
}

/// Where the rename prompt for a finished shape should appear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Geographic position; the viewport projects it to the screen.
    Geographic(LatLng),
    /// Already in container pixels.
    Screen(Point),
}

/// A finished geometry that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub kind: FeatureKind,
    pub geometry: Geometry,
    pub anchor: Anchor,
}

/// Transient layers shown while drawing. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawPreview {
    pub tool: FeatureKind,
    /// The shape built so far.
    pub vertices: Vec<LatLng>,
    /// Dashed segment from the last vertex to the pointer.
    pub segment: Option<(LatLng, LatLng)>,
}

/// Interaction state machine for one tool at a time.
#[derive(Debug, Clone, Default)]
pub struct DrawingSession {
    state: SessionState,
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin drawing with `tool`, discarding anything left from a previous session.
    pub fn start(&mut self, tool: FeatureKind) -> CursorMode {
        if self.is_active() {
            log::debug!("Discarding unfinished drawing");
        }
        log::debug!("Drawing session started with {tool} tool");
        self.state = SessionState::Active {
            tool,
            points: Vec::new(),
            pointer: None,
        };
        CursorMode::for_tool(tool)
    }

    /// Commit a vertex (polygon and line tools).
    pub fn add_point(&mut self, at: LatLng) -> Result<(), DrawError> {
        match &mut self.state {
            SessionState::Idle => Err(DrawError::NotDrawing),
            SessionState::Active { tool, .. } if !tool.is_multi_point() => {
                Err(DrawError::SingleClickTool(*tool))
            }
            SessionState::Active { points, pointer, .. } => {
                points.push(at);
                *pointer = Some(at);
                Ok(())
            }
        }
    }

    /// Track the pointer for the preview segment.
    ///
    /// Returns true if the preview changed. Committed vertices are untouched.
    pub fn preview_move(&mut self, at: LatLng) -> bool {
        match &mut self.state {
            SessionState::Active { tool, points, pointer }
                if tool.is_multi_point() && !points.is_empty() =>
            {
                *pointer = Some(at);
                true
            }
            _ => false,
        }
    }

    /// Finish a polygon or line.
    ///
    /// With too few vertices the session stays active and an error is returned.
    /// The point tool has nothing to finish; it commits on its single click.
    pub fn finish(&mut self) -> Result<Candidate, DrawError> {
        let SessionState::Active { tool, points, .. } = &self.state else {
            return Err(DrawError::NotDrawing);
        };
        let tool = *tool;
        if !tool.is_multi_point() {
            return Err(DrawError::SingleClickTool(tool));
        }
        let required = tool.min_points();
        if points.len() < required {
            return Err(DrawError::InsufficientPoints {
                required,
                actual: points.len(),
            });
        }

        let geometry = Geometry::from_vertices(tool, points).map_err(|_| {
            DrawError::InsufficientPoints {
                required,
                actual: points.len(),
            }
        })?;
        let anchor = Anchor::Geographic(LatLng::from_point(geometry.bounds().center()));
        log::debug!("Finished {tool} with {} vertices", points.len());
        self.state = SessionState::Idle;
        Ok(Candidate {
            kind: tool,
            geometry,
            anchor,
        })
    }

    /// Abandon the drawing. Nothing is emitted.
    pub fn cancel(&mut self) {
        if self.is_active() {
            log::debug!("Drawing session cancelled");
        }
        self.state = SessionState::Idle;
    }

    /// Route a map click.
    ///
    /// Point tool: places the point and finishes. Line tool: every click
    /// adds a vertex, and the second click of a double-click then finishes
    /// the line. Polygon tool: adds a vertex. Idle: ignored.
    pub fn on_click(&mut self, event: &MapEvent) -> Result<Option<Candidate>, DrawError> {
        let tool = match &self.state {
            SessionState::Active { tool, .. } => *tool,
            SessionState::Idle => return Ok(None),
        };
        match tool {
            FeatureKind::Point => {
                let candidate = Candidate {
                    kind: FeatureKind::Point,
                    geometry: Geometry::point(event.lat_lng),
                    anchor: Anchor::Screen(event.screen),
                };
                log::debug!("Placed point");
                self.state = SessionState::Idle;
                Ok(Some(candidate))
            }
            FeatureKind::Line if event.is_double_click() => {
                self.add_point(event.lat_lng)?;
                self.finish().map(Some)
            }
            FeatureKind::Polygon | FeatureKind::Line => {
                self.add_point(event.lat_lng)?;
                Ok(None)
            }
        }
    }

    /// A dedicated double-click event: finishes a line.
    pub fn on_double_click(&mut self) -> Result<Option<Candidate>, DrawError> {
        match self.tool() {
            Some(FeatureKind::Line) => self.finish().map(Some),
            _ => Ok(None),
        }
    }

    /// Right-click: finishes a polygon or line once it has enough vertices,
    /// otherwise does nothing.
    pub fn on_context_menu(&mut self) -> Option<Candidate> {
        let ready = matches!(
            &self.state,
            SessionState::Active { tool, points, .. }
                if tool.is_multi_point() && points.len() >= tool.min_points()
        );
        if ready { self.finish().ok() } else { None }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    pub fn tool(&self) -> Option<FeatureKind> {
        match &self.state {
            SessionState::Active { tool, .. } => Some(*tool),
            SessionState::Idle => None,
        }
    }

    /// Committed vertices (empty when idle).
    pub fn points(&self) -> &[LatLng] {
        match &self.state {
            SessionState::Active { points, .. } => points,
            SessionState::Idle => &[],
        }
    }

    /// Preview layers for the current drawing, if any.
    pub fn preview(&self) -> Option<DrawPreview> {
        let SessionState::Active { tool, points, pointer } = &self.state else {
            return None;
        };
        if !tool.is_multi_point() {
            return None;
        }
        let segment = match (points.last(), pointer) {
            (Some(last), Some(pointer)) if last != pointer => Some((*last, *pointer)),
            _ => None,
        };
        Some(DrawPreview {
            tool: *tool,
            vertices: points.clone(),
            segment,
        })
    }
}
