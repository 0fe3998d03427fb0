//! GeoSketch Core Library
//!
//! Platform-agnostic core of the GeoSketch map editor: the drawing session
//! that turns map clicks into shapes, the persisted feature store, and the
//! editor that ties them to an external map widget.

pub mod config;
pub mod editor;
pub mod export;
pub mod feature;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod storage;
pub mod store;
pub mod style;
pub mod tools;
pub mod viewport;

pub use config::EditorConfig;
pub use editor::{Editor, RenamePrompt};
pub use export::{to_geojson, to_geojson_string};
pub use feature::{Feature, FeatureDraft, FeatureId, FeatureKind, FeatureUpdate, Properties};
pub use geometry::{Geometry, GeometryError, LatLng, Position};
pub use input::MapEvent;
pub use storage::{Storage, StorageError, StorageResult, STORAGE_KEY};
pub use store::{FeatureStore, PersistedState};
pub use style::{FeatureStyle, preview_style, style_for};
pub use tools::{Anchor, Candidate, CursorMode, DrawError, DrawPreview, DrawingSession, SessionState};
pub use viewport::ViewportController;
