//! Boundary to the external map widget.

use crate::feature::{Feature, FeatureId};
use crate::geometry::LatLng;
use crate::tools::{CursorMode, DrawPreview};
use kurbo::Point;

/// Commands the editor issues to the map widget.
///
/// The editor never touches widget internals; a host (a JS bridge on the
/// web, a native map view elsewhere) implements this trait.
pub trait ViewportController {
    /// Change the cursor shown over the map.
    fn set_cursor_mode(&mut self, mode: CursorMode);

    /// Draw every stored feature; `active` gets the highlighted style
    /// from [`crate::style::style_for`].
    fn render(&mut self, features: &[Feature], active: Option<&FeatureId>);

    /// Show, update, or (with `None`) remove the in-progress drawing layers.
    fn render_preview(&mut self, preview: Option<&DrawPreview>);

    /// Move the view to `at` at the given zoom level.
    fn center_on(&mut self, at: LatLng, zoom: f64);

    /// Fit the view to the given positions with `padding` pixels on each side.
    fn fit_bounds(&mut self, positions: &[LatLng], padding: f64);

    /// Project a geographic position to map-container pixels.
    fn project(&self, at: LatLng) -> Point;
}
