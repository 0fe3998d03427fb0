//! Map editor: routes widget events through the drawing session and store.

use crate::config::EditorConfig;
use crate::feature::{Feature, FeatureDraft, FeatureId, FeatureKind, FeatureUpdate};
use crate::input::MapEvent;
use crate::storage::Storage;
use crate::store::FeatureStore;
use crate::tools::{Anchor, Candidate, CursorMode, DrawError, DrawingSession};
use crate::viewport::ViewportController;
use kurbo::{Point, Size};
use std::sync::Arc;

/// The inline label editor.
#[derive(Debug, Clone, PartialEq)]
pub struct RenamePrompt {
    pub feature_id: FeatureId,
    /// Label the form opens with.
    pub label: String,
    /// Top-left corner in map-container pixels.
    pub position: Point,
    /// The feature was created by the drawing that opened this prompt;
    /// cancelling deletes it.
    pub is_new: bool,
}

/// Owns the store and the drawing session and keeps the viewport in sync.
pub struct Editor<V: ViewportController> {
    config: EditorConfig,
    store: FeatureStore,
    session: DrawingSession,
    viewport: V,
    rename: Option<RenamePrompt>,
    /// Map container size, for keeping the rename form on screen.
    container: Size,
    /// Last user-facing message (e.g. a rejected finish).
    notice: Option<String>,
}

impl<V: ViewportController> Editor<V> {
    /// Create an editor, centre the map and draw the stored features.
    pub fn new(config: EditorConfig, store: FeatureStore, mut viewport: V) -> Self {
        viewport.center_on(config.map_center, config.default_zoom);
        viewport.set_cursor_mode(CursorMode::Grab);
        let mut editor = Self {
            config,
            store,
            session: DrawingSession::new(),
            viewport,
            rename: None,
            container: Size::ZERO,
            notice: None,
        };
        editor.render();
        editor
    }

    /// Build an editor over the collection persisted under `config.storage_key`.
    pub fn open(config: EditorConfig, storage: Arc<dyn Storage>, viewport: V) -> Self {
        let store = FeatureStore::open_with_key(storage, &config.storage_key);
        Self::new(config, store, viewport)
    }

    fn render(&mut self) {
        self.viewport
            .render(self.store.list(), self.store.active_id());
    }

    fn render_preview(&mut self) {
        let preview = self.session.preview();
        self.viewport.render_preview(preview.as_ref());
    }

    /// Report the map container's current size.
    pub fn set_container_size(&mut self, size: Size) {
        self.container = size;
    }

    /// A tool was dropped on the map: start drawing with it.
    pub fn drop_tool(&mut self, tool: FeatureKind) {
        let cursor = self.session.start(tool);
        self.notice = None;
        self.viewport.set_cursor_mode(cursor);
        self.render_preview();
    }

    /// A click on empty map.
    ///
    /// While drawing it feeds the session and returns the id of a feature
    /// created by this click. While idle it clears the selection.
    pub fn pointer_click(&mut self, event: &MapEvent) -> Option<FeatureId> {
        if !self.session.is_active() {
            if self.store.active_id().is_some() {
                self.store.clear_active();
                self.render();
            }
            return None;
        }
        let result = self.session.on_click(event);
        self.handle_finish(result.transpose())
    }

    pub fn pointer_move(&mut self, event: &MapEvent) {
        if self.session.preview_move(event.lat_lng) {
            self.render_preview();
        }
    }

    pub fn double_click(&mut self, _event: &MapEvent) -> Option<FeatureId> {
        let result = self.session.on_double_click();
        self.handle_finish(result.transpose())
    }

    /// Right-click finishes a line or polygon that has enough vertices.
    pub fn context_menu(&mut self, _event: &MapEvent) -> Option<FeatureId> {
        let candidate = self.session.on_context_menu()?;
        Some(self.commit(candidate))
    }

    /// The explicit "finish" action.
    ///
    /// Too few vertices is reported back and recorded as the current notice;
    /// the session stays active.
    pub fn finish_drawing(&mut self) -> Result<FeatureId, DrawError> {
        let result = self.session.finish();
        match result {
            Ok(candidate) => Ok(self.commit(candidate)),
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    pub fn cancel_drawing(&mut self) {
        self.session.cancel();
        self.notice = None;
        self.viewport.set_cursor_mode(CursorMode::Grab);
        self.viewport.render_preview(None);
    }

    fn handle_finish(&mut self, result: Option<Result<Candidate, DrawError>>) -> Option<FeatureId> {
        match result? {
            Ok(candidate) => Some(self.commit(candidate)),
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }

    fn report(&mut self, error: &DrawError) {
        log::debug!("Drawing rejected: {error}");
        self.notice = Some(error.to_string());
        self.render_preview();
    }

    /// Store a finished drawing and open the rename prompt for it.
    fn commit(&mut self, candidate: Candidate) -> FeatureId {
        let label = self.store.default_label(candidate.kind);
        let feature = self.store.add(FeatureDraft::new(label, candidate.geometry));
        let id = feature.id().clone();
        let label = feature.label.clone();

        let position = match candidate.anchor {
            Anchor::Geographic(at) => self.viewport.project(at),
            Anchor::Screen(point) => point,
        };
        self.rename = Some(RenamePrompt {
            feature_id: id.clone(),
            label,
            position,
            is_new: true,
        });

        self.notice = None;
        self.viewport.set_cursor_mode(CursorMode::Grab);
        self.viewport.render_preview(None);
        self.render();
        id
    }

    /// Open the rename prompt for an existing feature clicked at `screen`.
    ///
    /// The form is shifted back inside the container when it would overflow
    /// the right or bottom edge.
    pub fn open_rename(&mut self, id: &FeatureId, screen: Point) -> bool {
        let Some(feature) = self.store.get(id) else {
            return false;
        };
        let position = self.clamp_to_container(screen);
        self.rename = Some(RenamePrompt {
            feature_id: id.clone(),
            label: feature.label.clone(),
            position,
            is_new: false,
        });
        true
    }

    fn clamp_to_container(&self, screen: Point) -> Point {
        let form = self.config.rename_form_size;
        let margin = self.config.rename_form_margin;
        let mut position = screen;
        if position.x + form.width > self.container.width {
            position.x = margin.max(position.x - form.width);
        }
        if position.y + form.height > self.container.height {
            position.y = margin.max(position.y - form.height);
        }
        position
    }

    /// Save the label typed into the prompt and close it.
    pub fn confirm_rename(&mut self, label: &str) -> bool {
        let Some(prompt) = self.rename.take() else {
            return false;
        };
        let updated = self
            .store
            .update(&prompt.feature_id, FeatureUpdate::label(label));
        self.render();
        updated
    }

    /// Close the prompt. A feature created by the drawing that opened it is
    /// deleted; an existing feature is left alone.
    pub fn cancel_rename(&mut self) {
        let Some(prompt) = self.rename.take() else {
            return;
        };
        if prompt.is_new {
            log::debug!("Rolling back new feature {}", prompt.feature_id);
            self.store.remove(&prompt.feature_id);
            self.render();
        }
    }

    /// Select a feature and bring it into view.
    ///
    /// Points are centred at the focus zoom; lines and polygons are fitted.
    pub fn select_feature(&mut self, id: &FeatureId) -> bool {
        if !self.store.set_active(id) {
            return false;
        }
        if let Some(feature) = self.store.active() {
            let geometry = feature.geometry();
            match feature.kind() {
                FeatureKind::Point => {
                    let at = geometry.center();
                    self.viewport.center_on(at, self.config.focus_zoom);
                }
                FeatureKind::Line | FeatureKind::Polygon => {
                    let positions = geometry.lat_lngs();
                    self.viewport
                        .fit_bounds(&positions, self.config.fit_padding);
                }
            }
        }
        self.render();
        true
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_active();
        self.render();
    }

    /// Delete a feature once `confirm` agrees. Declining changes nothing.
    pub fn delete_feature(&mut self, id: &FeatureId, confirm: impl FnOnce(&Feature) -> bool) -> bool {
        let Some(feature) = self.store.get(id) else {
            return false;
        };
        if !confirm(feature) {
            return false;
        }
        self.store.remove(id);
        if self.rename.as_ref().is_some_and(|p| &p.feature_id == id) {
            self.rename = None;
        }
        self.render();
        true
    }

    /// Instructional text for the map overlay.
    pub fn overlay_hint(&self) -> &'static str {
        match self.session.tool() {
            Some(FeatureKind::Polygon) => "Click to add polygon points, right-click to finish",
            Some(FeatureKind::Line) => {
                "Click to add line points, double-click or right-click to finish"
            }
            Some(FeatureKind::Point) => "Click on map to place a point",
            None => "Drag a tool onto the map to start drawing",
        }
    }

    /// Take the pending user-facing message, if any.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn rename_prompt(&self) -> Option<&RenamePrompt> {
        self.rename.as_ref()
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_drawing(&self) -> bool {
        self.session.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, LatLng};
    use crate::storage::{MemoryStorage, STORAGE_KEY, Storage};
    use crate::viewport::testing::{RecordingViewport, ViewportCall};

    fn editor() -> Editor<RecordingViewport> {
        let mut editor = Editor::new(
            EditorConfig::default(),
            FeatureStore::new(),
            RecordingViewport::default(),
        );
        editor.set_container_size(Size::new(800.0, 600.0));
        editor
    }

    fn click(lat: f64, lng: f64) -> MapEvent {
        MapEvent::new(lat, lng, lng * 10.0, lat * 10.0)
    }

    fn draw_line(editor: &mut Editor<RecordingViewport>) -> FeatureId {
        editor.drop_tool(FeatureKind::Line);
        editor.pointer_click(&click(1.0, 2.0));
        editor.pointer_click(&click(3.0, 4.0));
        editor.finish_drawing().unwrap()
    }

    #[test]
    fn test_initial_view() {
        let editor = editor();
        assert_eq!(
            editor.viewport().calls[0],
            ViewportCall::CenterOn(LatLng::new(20.5937, 78.9629), 6.0)
        );
        assert_eq!(editor.overlay_hint(), "Drag a tool onto the map to start drawing");
    }

    #[test]
    fn test_drop_tool_sets_cursor() {
        let mut editor = editor();
        editor.drop_tool(FeatureKind::Polygon);
        assert!(editor.is_drawing());
        assert_eq!(editor.viewport().last_cursor(), Some(CursorMode::Polygon));
        assert!(editor.overlay_hint().contains("polygon"));
    }

    #[test]
    fn test_line_creates_feature_and_opens_prompt() {
        let mut editor = editor();
        let id = draw_line(&mut editor);

        let feature = editor.store().get(&id).unwrap();
        assert_eq!(feature.label, "Line 1");
        assert_eq!(
            *feature.geometry(),
            Geometry::LineString(vec![[2.0, 1.0], [4.0, 3.0]])
        );

        let prompt = editor.rename_prompt().unwrap();
        assert_eq!(prompt.feature_id, id);
        assert!(prompt.is_new);
        // Bounding-box centre (2, 3) projected by the test viewport
        assert_eq!(prompt.position, Point::new(30.0, 20.0));

        assert!(!editor.is_drawing());
        assert_eq!(editor.viewport().last_cursor(), Some(CursorMode::Grab));
        assert_eq!(editor.viewport().last_preview(), Some(None));
        assert_eq!(editor.viewport().last_render(), Some((1, None)));
    }

    #[test]
    fn test_point_click_creates_feature_at_click() {
        let mut editor = editor();
        editor.drop_tool(FeatureKind::Point);
        let id = editor
            .pointer_click(&MapEvent::new(5.0, 6.0, 120.0, 80.0))
            .unwrap();

        let feature = editor.store().get(&id).unwrap();
        assert_eq!(*feature.geometry(), Geometry::Point([6.0, 5.0]));
        assert_eq!(feature.label, "Point 1");
        assert_eq!(editor.rename_prompt().unwrap().position, Point::new(120.0, 80.0));
        assert!(!editor.is_drawing());
    }

    #[test]
    fn test_finish_with_one_point_is_reported() {
        let mut editor = editor();
        editor.drop_tool(FeatureKind::Polygon);
        editor.pointer_click(&click(1.0, 1.0));

        let err = editor.finish_drawing().unwrap_err();
        assert_eq!(err, DrawError::InsufficientPoints { required: 2, actual: 1 });
        assert!(editor.is_drawing());
        assert!(editor.store().is_empty());
        assert_eq!(
            editor.take_notice().as_deref(),
            Some("Please add at least 2 points to create a feature")
        );
        assert!(editor.take_notice().is_none());
    }

    #[test]
    fn test_double_click_finishes_line() {
        let mut editor = editor();
        editor.drop_tool(FeatureKind::Line);
        editor.pointer_click(&click(1.0, 1.0));
        editor.pointer_click(&click(2.0, 2.0));
        let id = editor
            .pointer_click(&click(2.0, 2.0).with_click_count(2))
            .unwrap();

        assert_eq!(editor.store().len(), 1);
        assert_eq!(editor.store().get(&id).unwrap().geometry().position_count(), 3);
        // The widget's separate dblclick event arrives after the session is idle
        assert!(editor.double_click(&click(2.0, 2.0)).is_none());
        assert_eq!(editor.store().len(), 1);
    }

    #[test]
    fn test_context_menu_finishes_polygon() {
        let mut editor = editor();
        editor.drop_tool(FeatureKind::Polygon);
        editor.pointer_click(&click(0.0, 0.0));
        assert!(editor.context_menu(&click(0.0, 0.0)).is_none());

        editor.pointer_click(&click(1.0, 1.0));
        editor.pointer_click(&click(0.0, 2.0));
        let id = editor.context_menu(&click(0.0, 2.0)).unwrap();
        let Geometry::Polygon(rings) = editor.store().get(&id).unwrap().geometry() else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0].len(), 4);
    }

    #[test]
    fn test_pointer_move_updates_preview() {
        let mut editor = editor();
        editor.drop_tool(FeatureKind::Line);
        editor.pointer_click(&click(1.0, 1.0));
        editor.pointer_move(&click(5.0, 5.0));

        let preview = editor.viewport().last_preview().unwrap().unwrap();
        assert_eq!(
            preview.segment,
            Some((LatLng::new(1.0, 1.0), LatLng::new(5.0, 5.0)))
        );
        assert_eq!(editor.session().points().len(), 1);
    }

    #[test]
    fn test_cancel_drawing_emits_nothing() {
        let mut editor = editor();
        editor.drop_tool(FeatureKind::Line);
        editor.pointer_click(&click(1.0, 1.0));
        editor.pointer_click(&click(2.0, 2.0));
        editor.cancel_drawing();

        assert!(!editor.is_drawing());
        assert!(editor.store().is_empty());
        assert_eq!(editor.viewport().last_preview(), Some(None));
    }

    #[test]
    fn test_confirm_rename_updates_label() {
        let mut editor = editor();
        let id = draw_line(&mut editor);

        assert!(editor.confirm_rename("Highway 7"));
        assert_eq!(editor.store().get(&id).unwrap().label, "Highway 7");
        assert!(editor.rename_prompt().is_none());
    }

    #[test]
    fn test_cancel_rename_rolls_back_new_feature() {
        let mut editor = editor();
        draw_line(&mut editor);
        editor.cancel_rename();

        assert!(editor.store().is_empty());
        assert!(editor.rename_prompt().is_none());
    }

    #[test]
    fn test_cancel_rename_keeps_existing_feature() {
        let mut editor = editor();
        let first = draw_line(&mut editor);
        editor.confirm_rename("Kept");
        let second = draw_line(&mut editor);
        editor.confirm_rename("Other");
        editor.select_feature(&second);
        let before = editor.store().list().to_vec();

        assert!(editor.open_rename(&first, Point::new(10.0, 10.0)));
        assert!(!editor.rename_prompt().unwrap().is_new);
        editor.cancel_rename();

        assert_eq!(editor.store().list(), before.as_slice());
        assert_eq!(editor.store().active_id(), Some(&second));
    }

    #[test]
    fn test_rename_position_is_clamped() {
        let mut editor = editor();
        let id = draw_line(&mut editor);
        editor.confirm_rename("x");

        editor.open_rename(&id, Point::new(700.0, 550.0));
        assert_eq!(editor.rename_prompt().unwrap().position, Point::new(420.0, 400.0));

        editor.open_rename(&id, Point::new(100.0, 100.0));
        assert_eq!(editor.rename_prompt().unwrap().position, Point::new(100.0, 100.0));

        editor.set_container_size(Size::new(200.0, 100.0));
        editor.open_rename(&id, Point::new(150.0, 90.0));
        assert_eq!(editor.rename_prompt().unwrap().position, Point::new(20.0, 20.0));

        assert!(!editor.open_rename(&FeatureId::from("missing"), Point::ZERO));
    }

    #[test]
    fn test_select_point_centers_view() {
        let mut editor = editor();
        editor.drop_tool(FeatureKind::Point);
        let id = editor.pointer_click(&click(5.0, 6.0)).unwrap();
        editor.confirm_rename("Well");

        assert!(editor.select_feature(&id));
        assert!(editor
            .viewport()
            .calls
            .contains(&ViewportCall::CenterOn(LatLng::new(5.0, 6.0), 12.0)));
        assert_eq!(editor.viewport().last_render(), Some((1, Some(id))));
    }

    #[test]
    fn test_select_line_fits_bounds() {
        let mut editor = editor();
        let id = draw_line(&mut editor);
        editor.select_feature(&id);

        assert_eq!(
            editor.viewport().calls.last().cloned(),
            Some(ViewportCall::Render { count: 1, active: Some(id) })
        );
        assert!(editor.viewport().calls.contains(&ViewportCall::FitBounds(
            vec![LatLng::new(1.0, 2.0), LatLng::new(3.0, 4.0)],
            50.0
        )));
    }

    #[test]
    fn test_idle_click_clears_selection() {
        let mut editor = editor();
        let id = draw_line(&mut editor);
        editor.select_feature(&id);

        assert!(editor.pointer_click(&click(9.0, 9.0)).is_none());
        assert!(editor.store().active_id().is_none());
        assert_eq!(editor.store().len(), 1);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut editor = editor();
        let id = draw_line(&mut editor);
        editor.confirm_rename("Road");

        assert!(!editor.delete_feature(&id, |_| false));
        assert_eq!(editor.store().len(), 1);

        assert!(editor.delete_feature(&id, |f| f.label == "Road"));
        assert!(editor.store().is_empty());
        assert!(!editor.delete_feature(&id, |_| true));
    }

    #[test]
    fn test_delete_closes_prompt_for_that_feature() {
        let mut editor = editor();
        let id = draw_line(&mut editor);
        editor.delete_feature(&id, |_| true);
        assert!(editor.rename_prompt().is_none());
    }

    #[test]
    fn test_labels_follow_live_count() {
        let mut editor = editor();
        let ids: Vec<_> = (0..3)
            .map(|_| {
                editor.drop_tool(FeatureKind::Polygon);
                for (lat, lng) in [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
                    editor.pointer_click(&click(lat, lng));
                }
                let id = editor.finish_drawing().unwrap();
                let label = editor.rename_prompt().unwrap().label.clone();
                editor.confirm_rename(&label);
                id
            })
            .collect();
        let labels: Vec<_> = editor.store().list().iter().map(|f| f.label.clone()).collect();
        assert_eq!(labels, ["Polygon 1", "Polygon 2", "Polygon 3"]);

        editor.delete_feature(&ids[1], |_| true);
        editor.drop_tool(FeatureKind::Polygon);
        editor.pointer_click(&click(0.0, 0.0));
        editor.pointer_click(&click(1.0, 0.0));
        let id = editor.finish_drawing().unwrap();
        assert_eq!(editor.store().get(&id).unwrap().label, "Polygon 3");
    }

    #[test]
    fn test_editor_persists_through_store() {
        let storage = Arc::new(MemoryStorage::new());
        let mut editor = Editor::new(
            EditorConfig::default(),
            FeatureStore::open(storage.clone()),
            RecordingViewport::default(),
        );
        let id = draw_line(&mut editor);
        editor.confirm_rename("Saved road");

        let saved = storage.load(STORAGE_KEY).unwrap();
        assert_eq!(saved.features.len(), 1);
        assert_eq!(saved.features[0].label, "Saved road");

        let reopened = Editor::new(
            EditorConfig::default(),
            FeatureStore::open(storage),
            RecordingViewport::default(),
        );
        assert_eq!(reopened.store().get(&id).unwrap().label, "Saved road");
        assert_eq!(reopened.viewport().last_render(), Some((1, None)));
    }

    #[test]
    fn test_open_uses_configured_storage_key() {
        let storage = Arc::new(MemoryStorage::new());
        let config = EditorConfig {
            storage_key: "survey-2024".to_string(),
            ..EditorConfig::default()
        };
        let mut editor = Editor::open(config.clone(), storage.clone(), RecordingViewport::default());
        let id = draw_line(&mut editor);
        editor.confirm_rename("Ridge path");

        assert!(storage.raw(STORAGE_KEY).is_none());
        let saved = storage.load("survey-2024").unwrap();
        assert_eq!(saved.features[0].label, "Ridge path");

        let reopened = Editor::open(config, storage, RecordingViewport::default());
        assert_eq!(reopened.store().get(&id).unwrap().label, "Ridge path");
    }
}
