//! Editing session: document, view state and history behind an event API
//!
//! The session is the single writer of all editor state. Backends translate
//! raw input into the calls below and render from the read accessors; they
//! never mutate the document directly.

use std::time::Duration;

use crate::color::HexColor;
use crate::debounce::Debouncer;
use crate::document::MapDocument;
use crate::frame::{FrameOptions, FramePlan};
use crate::history::{CommitOutcome, StrokeHistory};
use crate::layer::VALID_TILE_COUNT;
use crate::projection::{IsoCamera, ScreenPos, TilePos, Viewport, DEFAULT_ZOOM};
use crate::snapshot::{parse_json, validate, MapSnapshot, SnapshotError, ValidatedSnapshot};
use crate::status::{StatusLine, StatusMessage};
use crate::storage::{KeyValueStore, MemoryStore, StorageError};

/// Delay between the last edit and the automatic save
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(250);

/// Storage key of the persisted document
pub const STORAGE_KEY: &str = "iso_map_editor_save_v1";

/// Pointer button that started a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Paints the selected tile
    Primary,
    /// Erases
    Secondary,
    /// Pans the camera
    Middle,
}

/// Buttons held during a pointer move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldButtons {
    pub primary: bool,
    pub secondary: bool,
    pub middle: bool,
}

impl HeldButtons {
    /// Moves erase only while the secondary button is held on its own
    pub fn erases(&self) -> bool {
        self.secondary && !self.primary && !self.middle
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Painting,
    Panning {
        pointer_start: ScreenPos,
        camera_start: ScreenPos,
    },
}

#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
pub struct EditorSession {
    document: MapDocument,
    history: StrokeHistory,
    camera: IsoCamera,
    viewport: Viewport,
    hover: Option<TilePos>,
    pointer: Option<ScreenPos>,
    isolate: bool,
    hide_isolated: bool,
    selected_tile: u32,
    gesture: Gesture,
    autosave: Debouncer,
    status: StatusLine,
    store: Box<dyn KeyValueStore>,
    now: Duration,
    revision: u64,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("layers", &self.document.layer_count())
            .field("active_layer", &self.document.active_layer())
            .field("camera", &self.camera)
            .field("viewport", &self.viewport)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        let viewport = Viewport::default();
        let mut camera = IsoCamera::default();
        camera.center_on_grid(viewport);
        Self {
            document: MapDocument::new(),
            history: StrokeHistory::new(),
            camera,
            viewport,
            hover: None,
            pointer: None,
            isolate: false,
            hide_isolated: false,
            selected_tile: 0,
            gesture: Gesture::Idle,
            autosave: Debouncer::new(SAVE_DEBOUNCE),
            status: StatusLine::default(),
            store,
            now: Duration::ZERO,
            revision: 0,
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.resize(viewport);
        self
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn document(&self) -> &MapDocument {
        &self.document
    }

    pub fn history(&self) -> &StrokeHistory {
        &self.history
    }

    pub fn camera(&self) -> &IsoCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn hover(&self) -> Option<TilePos> {
        self.hover
    }

    pub fn pointer(&self) -> Option<ScreenPos> {
        self.pointer
    }

    pub fn is_isolating(&self) -> bool {
        self.isolate
    }

    pub fn hides_isolated(&self) -> bool {
        self.hide_isolated
    }

    pub fn selected_tile(&self) -> u32 {
        self.selected_tile
    }

    pub fn is_painting(&self) -> bool {
        self.gesture == Gesture::Painting
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Gesture::Panning { .. })
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Current status message, if it has not expired
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.current(self.now)
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Bumped whenever something that affects tile rendering changes
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// "Current N of M" style label for the layer controls
    pub fn layer_label(&self) -> String {
        format!(
            "Current {} of {}",
            self.document.active_layer() + 1,
            self.document.layer_count()
        )
    }

    pub fn zoom_label(&self) -> String {
        format!("{}%", self.camera.zoom_label_percent())
    }

    pub fn hover_label(&self) -> String {
        match self.hover {
            Some(tile) => format!("x: {}, y: {}", tile.x, tile.y),
            None => "x: -, y: -".to_string(),
        }
    }

    pub fn frame_plan(&self, options: FrameOptions) -> FramePlan {
        FramePlan::build(self, options)
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Show a transient status message
    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status.set(text, is_error, self.now);
    }

    // ------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------

    /// Advance the session clock and run the autosave if it is due
    pub fn tick(&mut self, now: Duration) {
        self.now = now;
        if self.autosave.poll(now) {
            self.persist(true);
        }
    }

    pub fn is_autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    fn queue_autosave(&mut self) {
        self.autosave.request(self.now);
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, button: PointerButton, pos: ScreenPos) {
        self.pointer = Some(pos);
        match button {
            PointerButton::Middle => {
                self.gesture = Gesture::Panning {
                    pointer_start: pos,
                    camera_start: self.camera.offset,
                };
            }
            PointerButton::Primary | PointerButton::Secondary => {
                self.gesture = Gesture::Painting;
                self.history.begin_stroke();
                let tile = self
                    .camera
                    .screen_to_grid(pos, self.document.active_layer());
                self.paint_at(tile, button == PointerButton::Secondary);
            }
        }
    }

    pub fn pointer_move(&mut self, pos: ScreenPos, held: HeldButtons) {
        self.pointer = Some(pos);
        self.hover = self
            .camera
            .screen_to_grid(pos, self.document.active_layer());
        match self.gesture {
            Gesture::Panning {
                pointer_start,
                camera_start,
            } => {
                self.camera.offset.x = camera_start.x + (pos.x - pointer_start.x) / self.camera.zoom;
                self.camera.offset.y = camera_start.y + (pos.y - pointer_start.y) / self.camera.zoom;
            }
            Gesture::Painting => self.paint_at(self.hover, held.erases()),
            Gesture::Idle => {}
        }
    }

    pub fn pointer_up(&mut self) {
        self.end_gesture();
    }

    pub fn pointer_leave(&mut self) {
        self.end_gesture();
        self.hover = None;
        self.pointer = None;
    }

    fn end_gesture(&mut self) {
        if self.gesture == Gesture::Painting {
            self.commit_stroke();
        }
        self.gesture = Gesture::Idle;
    }

    fn paint_at(&mut self, tile: Option<TilePos>, erase: bool) {
        let Some(tile) = tile else {
            return;
        };
        let value = if erase {
            None
        } else {
            Some(self.selected_tile)
        };
        let layer = self.document.active_layer();
        if self
            .history
            .paint(&mut self.document, layer, tile.x, tile.y, value)
        {
            self.touch();
        }
    }

    fn commit_stroke(&mut self) {
        if let CommitOutcome::Committed(_) = self.history.commit_stroke() {
            self.queue_autosave();
        }
    }

    /// Zoom one step per wheel notch around the cursor. Positive zooms in.
    ///
    /// Zero steps are ignored, so horizontal-only scroll events (no vertical
    /// delta) never change the zoom.
    pub fn wheel(&mut self, steps: i32, pos: ScreenPos) {
        if steps == 0 {
            return;
        }
        self.camera.zoom_by_steps(steps.signum(), pos);
    }

    pub fn zoom_in(&mut self) {
        self.camera.zoom_by_steps(1, self.viewport.center());
    }

    pub fn zoom_out(&mut self) {
        self.camera.zoom_by_steps(-1, self.viewport.center());
    }

    /// Track a new drawing surface size and recenter on the grid
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.center_on_grid(viewport);
    }

    // ------------------------------------------------------------------
    // Undo / redo
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.document) {
            self.set_status("Nothing to undo.", false);
            return false;
        }
        self.touch();
        self.queue_autosave();
        self.set_status("Undo applied.", false);
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.document) {
            self.set_status("Nothing to redo.", false);
            return false;
        }
        self.touch();
        self.queue_autosave();
        self.set_status("Redo applied.", false);
        true
    }

    // ------------------------------------------------------------------
    // Layer, palette and view commands
    // ------------------------------------------------------------------

    pub fn previous_layer(&mut self) {
        self.document.select_previous_layer();
        self.touch();
    }

    pub fn next_layer(&mut self) {
        self.document.select_next_layer();
        self.touch();
    }

    pub fn add_layer(&mut self) -> bool {
        if !self.document.add_layer() {
            return false;
        }
        self.touch();
        self.queue_autosave();
        true
    }

    /// Remove the active layer. Callers confirm with the user first.
    pub fn remove_active_layer(&mut self) -> bool {
        if !self.document.remove_layer(self.document.active_layer()) {
            return false;
        }
        self.touch();
        self.queue_autosave();
        true
    }

    pub fn toggle_isolate(&mut self) {
        self.isolate = !self.isolate;
        if !self.isolate {
            self.hide_isolated = false;
        }
        self.touch();
    }

    /// Only meaningful while isolating; ignored otherwise
    pub fn toggle_hide_isolated(&mut self) {
        if !self.isolate {
            return;
        }
        self.hide_isolated = !self.hide_isolated;
        self.touch();
    }

    pub fn select_tile(&mut self, index: u32) {
        self.selected_tile = index.min(VALID_TILE_COUNT - 1);
    }

    /// Change the background; malformed colors are ignored
    pub fn set_background(&mut self, value: &str) -> bool {
        let Some(color) = HexColor::parse(value) else {
            return false;
        };
        if color != self.document.background {
            self.document.background = color;
            self.touch();
            self.queue_autosave();
        }
        true
    }

    // ------------------------------------------------------------------
    // Persistence and files
    // ------------------------------------------------------------------

    fn write_snapshot(&self) -> Result<(), StorageError> {
        let json = MapSnapshot::from_document(&self.document)
            .to_json()
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.store.set(STORAGE_KEY, &json)
    }

    fn persist(&mut self, is_auto: bool) -> bool {
        match self.write_snapshot() {
            Ok(()) => {
                let text = if is_auto {
                    "Autosaved."
                } else {
                    "Saved locally."
                };
                self.set_status(text, false);
                true
            }
            Err(_) => {
                self.set_status("Save failed (storage unavailable).", true);
                false
            }
        }
    }

    /// Save the document to the store now
    pub fn save_local(&mut self) -> bool {
        self.persist(false)
    }

    /// Load the stored document, if any.
    ///
    /// Invalid stored data leaves the current document untouched.
    pub fn load_local(&mut self, startup: bool) -> bool {
        let raw = match self.store.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                let text = if startup {
                    "No local save found. Start building."
                } else {
                    "No local save found."
                };
                self.set_status(text, false);
                return false;
            }
            Err(_) => {
                self.set_status("Could not load save (data is invalid).", true);
                return false;
            }
        };
        match parse_json(&raw) {
            Ok(snapshot) => {
                self.apply_validated(snapshot);
                self.set_status("Loaded local save.", false);
                true
            }
            Err(_) => {
                self.set_status("Could not load save (data is invalid).", true);
                false
            }
        }
    }

    /// Startup sequence: restore the stored document and center the camera
    pub fn startup(&mut self, viewport: Viewport) {
        self.load_local(true);
        self.resize(viewport);
    }

    /// Replace the document from an untrusted value.
    ///
    /// On error nothing changes. On success history is cleared; loading is
    /// not itself undoable.
    pub fn apply_snapshot(&mut self, value: &serde_json::Value) -> Result<(), SnapshotError> {
        let snapshot = validate(value)?;
        self.apply_validated(snapshot);
        Ok(())
    }

    fn apply_validated(&mut self, snapshot: ValidatedSnapshot) {
        self.document = snapshot.into_document();
        self.history.clear();
        self.gesture = Gesture::Idle;
        self.touch();
    }

    /// Import a JSON document and persist it
    pub fn import_json(&mut self, text: &str) -> Result<(), SnapshotError> {
        match parse_json(text) {
            Ok(snapshot) => {
                self.apply_validated(snapshot);
                if self.persist(false) {
                    self.set_status("Imported map and saved locally.", false);
                }
                Ok(())
            }
            Err(e) => {
                self.set_status("Import failed (invalid JSON map file).", true);
                Err(e)
            }
        }
    }

    /// The document as pretty-printed JSON
    pub fn export_json(&self) -> Result<String, SnapshotError> {
        MapSnapshot::from_document(&self.document).to_json_pretty()
    }

    /// Reset document, view, tools and history, then save the empty map.
    /// Callers confirm with the user first.
    pub fn new_map(&mut self) {
        self.autosave.cancel();
        self.reset_editor_state();
        // A failed remove is fine; the save below overwrites the key
        let _ = self.store.remove(STORAGE_KEY);
        if self.persist(false) {
            self.set_status("Started a new map, reset view/tools, and saved it.", false);
        }
    }

    fn reset_editor_state(&mut self) {
        self.document = MapDocument::new();
        self.selected_tile = 0;
        self.isolate = false;
        self.hide_isolated = false;
        self.hover = None;
        self.pointer = None;
        self.gesture = Gesture::Idle;
        self.camera.zoom = DEFAULT_ZOOM;
        self.history.clear();
        self.camera.center_on_grid(self.viewport);
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{GRID_HEIGHT, GRID_WIDTH};
    use crate::projection::{grid_to_screen, LAYER_HEIGHT_PX};

    fn session() -> EditorSession {
        EditorSession::default().with_viewport(Viewport::new(1024.0, 768.0))
    }

    /// Screen position of the center of a cell on the active layer
    fn cell(session: &EditorSession, x: u32, y: u32) -> ScreenPos {
        let mut world = grid_to_screen(x as f64 + 0.5, y as f64 + 0.5);
        world.y -= session.document().active_layer() as f64 * LAYER_HEIGHT_PX as f64;
        session.camera().world_to_screen(world)
    }

    fn primary() -> HeldButtons {
        HeldButtons {
            primary: true,
            ..Default::default()
        }
    }

    fn secondary() -> HeldButtons {
        HeldButtons {
            secondary: true,
            ..Default::default()
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_paint_export_reload() {
        let mut s = session();
        s.select_tile(4);
        let pos = cell(&s, 10, 10);
        s.pointer_down(PointerButton::Primary, pos);
        s.pointer_up();
        assert_eq!(s.document().get_tile(0, 10, 10), Some(4));

        let exported = s.export_json().unwrap();
        let mut reloaded = session();
        reloaded.import_json(&exported).unwrap();

        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                let expected = if (x, y) == (10, 10) { Some(4) } else { None };
                assert_eq!(reloaded.document().get_tile(0, x, y), expected);
            }
        }
        assert!(!reloaded.can_undo());
    }

    #[test]
    fn test_stroke_and_undo() {
        let mut s = session();
        s.select_tile(7);
        let before = s.document().clone();

        s.pointer_down(PointerButton::Primary, cell(&s, 3, 5));
        for x in 4..8 {
            let pos = cell(&s, x, 5);
            s.pointer_move(pos, primary());
        }
        s.pointer_up();
        assert_eq!(s.history().undo_len(), 1);
        assert_eq!(s.history().last_stroke().map(<[_]>::len), Some(5));

        assert!(s.undo());
        assert_eq!(s.document(), &before);
        assert_eq!(s.status().unwrap().text, "Undo applied.");

        assert!(s.redo());
        assert_eq!(s.document().get_tile(0, 7, 5), Some(7));
    }

    #[test]
    fn test_paint_then_erase_same_cell_is_no_op() {
        let mut s = session();
        let pos = cell(&s, 2, 2);
        s.pointer_down(PointerButton::Primary, pos);
        s.pointer_move(pos, secondary());
        s.pointer_up();
        assert_eq!(s.document().get_tile(0, 2, 2), None);
        assert!(!s.can_undo());
        assert!(!s.is_autosave_pending());
    }

    #[test]
    fn test_erase_only_with_secondary_alone() {
        let mut s = session();
        s.select_tile(1);
        s.pointer_down(PointerButton::Secondary, cell(&s, 0, 0));
        let pos = cell(&s, 1, 0);
        s.pointer_move(
            pos,
            HeldButtons {
                primary: true,
                secondary: true,
                middle: false,
            },
        );
        assert_eq!(s.document().get_tile(0, 1, 0), Some(1));
        let pos = cell(&s, 2, 0);
        s.pointer_move(pos, secondary());
        assert_eq!(s.document().get_tile(0, 2, 0), None);
        s.pointer_up();
    }

    #[test]
    fn test_undo_when_empty() {
        let mut s = session();
        assert!(!s.undo());
        assert_eq!(s.status().unwrap().text, "Nothing to undo.");
        assert!(!s.redo());
        assert_eq!(s.status().unwrap().text, "Nothing to redo.");
    }

    #[test]
    fn test_middle_drag_pans() {
        let mut s = session();
        let start = s.camera().offset;
        let zoom = s.camera().zoom;
        s.pointer_down(PointerButton::Middle, ScreenPos::new(100.0, 100.0));
        s.pointer_move(ScreenPos::new(130.0, 87.0), HeldButtons::default());
        let offset = s.camera().offset;
        assert!((offset.x - (start.x + 30.0 / zoom)).abs() < 1e-9);
        assert!((offset.y - (start.y - 13.0 / zoom)).abs() < 1e-9);
        assert!(s.document().layers()[0].is_empty());
        s.pointer_up();
        assert!(!s.is_panning());
    }

    #[test]
    fn test_pointer_leave_commits_and_clears_hover() {
        let mut s = session();
        let pos = cell(&s, 4, 4);
        s.pointer_move(pos, HeldButtons::default());
        assert_eq!(s.hover(), Some(TilePos::new(4, 4)));
        assert_eq!(s.hover_label(), "x: 4, y: 4");

        s.pointer_down(PointerButton::Primary, pos);
        s.pointer_leave();
        assert!(s.can_undo());
        assert_eq!(s.hover(), None);
        assert_eq!(s.pointer(), None);
        assert!(!s.is_painting());
    }

    #[test]
    fn test_paints_on_active_layer() {
        let mut s = session();
        s.add_layer();
        s.select_tile(9);
        let pos = cell(&s, 6, 6);
        s.pointer_down(PointerButton::Primary, pos);
        s.pointer_up();
        assert_eq!(s.document().get_tile(1, 6, 6), Some(9));
        assert_eq!(s.document().get_tile(0, 6, 6), None);
    }

    #[test]
    fn test_autosave_debounced() {
        let mut s = session();
        for x in 0..5 {
            s.tick(ms(x * 50));
            let pos = cell(&s, x as u32, 0);
            s.pointer_down(PointerButton::Primary, pos);
            s.pointer_up();
        }
        assert!(s.store().get(STORAGE_KEY).unwrap().is_none());

        s.tick(ms(400));
        assert!(s.store().get(STORAGE_KEY).unwrap().is_none());
        s.tick(ms(450));
        let saved = s.store().get(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(s.status().unwrap().text, "Autosaved.");

        let restored = parse_json(&saved).unwrap().into_document();
        assert_eq!(&restored, s.document());
        assert!(!s.is_autosave_pending());
    }

    #[test]
    fn test_save_failure_reports_status() {
        let mut s = EditorSession::new(Box::new(MemoryStore::read_only()));
        assert!(!s.save_local());
        let status = s.status().unwrap();
        assert!(status.is_error);
        assert_eq!(status.text, "Save failed (storage unavailable).");
    }

    #[test]
    fn test_startup_read_failure_reports_status() {
        let mut s = EditorSession::new(Box::new(MemoryStore::unavailable()));
        s.startup(Viewport::new(1024.0, 768.0));
        let status = s.status().unwrap();
        assert!(status.is_error);
        assert_eq!(status.text, "Could not load save (data is invalid).");
        assert_eq!(s.document(), &MapDocument::new());
        assert_eq!(s.viewport(), Viewport::new(1024.0, 768.0));
    }

    #[test]
    fn test_load_read_failure_keeps_document() {
        let mut s = EditorSession::new(Box::new(MemoryStore::unavailable()));
        s.add_layer();
        s.set_background("#405060");
        let before = s.document().clone();

        assert!(!s.load_local(false));
        assert_eq!(s.document(), &before);
        assert!(s.status().unwrap().is_error);
    }

    #[test]
    fn test_new_map_with_failing_store() {
        let mut s = EditorSession::new(Box::new(MemoryStore::unavailable()))
            .with_viewport(Viewport::new(1024.0, 768.0));
        s.add_layer();
        s.zoom_in();

        s.new_map();
        assert_eq!(s.document().layer_count(), 1);
        assert_eq!(s.camera().zoom, DEFAULT_ZOOM);
        assert!(!s.can_undo());
        let status = s.status().unwrap();
        assert!(status.is_error);
        assert_eq!(status.text, "Save failed (storage unavailable).");
    }

    #[test]
    fn test_load_local_messages() {
        let mut s = session();
        assert!(!s.load_local(true));
        assert_eq!(s.status().unwrap().text, "No local save found. Start building.");
        assert!(!s.load_local(false));
        assert_eq!(s.status().unwrap().text, "No local save found.");

        let mut s = EditorSession::new(Box::new(MemoryStore::with_entry(STORAGE_KEY, "{\"layers\": 3}")));
        assert!(!s.load_local(false));
        assert!(s.status().unwrap().is_error);
    }

    #[test]
    fn test_save_then_load() {
        let mut s = session();
        s.set_background("#203040");
        s.add_layer();
        assert!(s.save_local());
        assert_eq!(s.status().unwrap().text, "Saved locally.");

        s.previous_layer();
        s.remove_active_layer();
        assert_eq!(s.document().layer_count(), 1);

        assert!(s.load_local(false));
        assert_eq!(s.document().layer_count(), 2);
        assert_eq!(s.document().active_layer(), 1);
        assert_eq!(s.document().background.as_str(), "#203040");
    }

    #[test]
    fn test_invalid_import_leaves_state() {
        let mut s = session();
        s.select_tile(3);
        let pos = cell(&s, 1, 1);
        s.pointer_down(PointerButton::Primary, pos);
        s.pointer_up();
        let document = s.document().clone();
        let revision = s.revision();

        assert!(s.import_json("{\"layers\": [[[200]]]}").is_err());
        assert!(s.import_json("not json").is_err());
        assert_eq!(s.document(), &document);
        assert!(s.can_undo());
        assert_eq!(s.revision(), revision);
        let status = s.status().unwrap();
        assert!(status.is_error);
        assert_eq!(status.text, "Import failed (invalid JSON map file).");
    }

    #[test]
    fn test_import_saves() {
        let mut s = session();
        s.import_json("{\"layers\": [[[null, 5]]], \"canvasBgColor\": \"#010203\"}")
            .unwrap();
        assert_eq!(s.document().get_tile(0, 1, 0), Some(5));
        assert_eq!(s.status().unwrap().text, "Imported map and saved locally.");
        assert!(s.store().get(STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_new_map_resets() {
        let mut s = session();
        s.select_tile(12);
        s.add_layer();
        s.toggle_isolate();
        s.zoom_in();
        s.zoom_in();
        let pos = cell(&s, 8, 8);
        s.pointer_down(PointerButton::Primary, pos);
        s.pointer_up();
        s.set_background("#ffffff");

        s.new_map();
        assert_eq!(s.document(), &MapDocument::new());
        assert_eq!(s.camera().zoom, DEFAULT_ZOOM);
        assert_eq!(s.selected_tile(), 0);
        assert!(!s.is_isolating());
        assert!(!s.can_undo());
        assert!(!s.is_autosave_pending());
        assert_eq!(
            s.status().unwrap().text,
            "Started a new map, reset view/tools, and saved it."
        );
        let saved = s.store().get(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(parse_json(&saved).unwrap().into_document(), MapDocument::new());
    }

    #[test]
    fn test_isolate_flags() {
        let mut s = session();
        s.toggle_hide_isolated();
        assert!(!s.hides_isolated());
        s.toggle_isolate();
        s.toggle_hide_isolated();
        assert!(s.hides_isolated());
        s.toggle_isolate();
        assert!(!s.is_isolating());
        assert!(!s.hides_isolated());
    }

    #[test]
    fn test_select_tile_clamps() {
        let mut s = session();
        s.select_tile(500);
        assert_eq!(s.selected_tile(), VALID_TILE_COUNT - 1);
    }

    #[test]
    fn test_background_validation() {
        let mut s = session();
        assert!(!s.set_background("blue"));
        assert_eq!(s.document().background, HexColor::default());
        assert!(!s.is_autosave_pending());
        assert!(s.set_background("#336699"));
        assert!(s.is_autosave_pending());
    }

    #[test]
    fn test_layer_commands_and_label() {
        let mut s = session();
        assert!(!s.remove_active_layer());
        s.add_layer();
        s.add_layer();
        assert_eq!(s.layer_label(), "Current 3 of 3");
        s.previous_layer();
        assert!(s.remove_active_layer());
        assert_eq!(s.layer_label(), "Current 2 of 2");
    }

    #[test]
    fn test_wheel_zooms_around_cursor() {
        let mut s = session();
        let pos = ScreenPos::new(300.0, 200.0);
        let world = s.camera().screen_to_world(pos);
        s.wheel(3, pos);
        assert_eq!(s.zoom_label(), "110%");
        let after = s.camera().screen_to_world(pos);
        assert!((world.x - after.x).abs() < 1e-9);
        assert!((world.y - after.y).abs() < 1e-9);

        s.wheel(-1, pos);
        assert_eq!(s.zoom_label(), "100%");
        s.wheel(0, pos);
        assert_eq!(s.zoom_label(), "100%");
    }

    #[test]
    fn test_apply_snapshot_value() {
        let mut s = session();
        let value = serde_json::json!({ "layers": [[[1]], [[2]]], "activeLayerIndex": 1 });
        s.apply_snapshot(&value).unwrap();
        assert_eq!(s.document().active_layer(), 1);
        assert_eq!(s.document().get_tile(1, 0, 0), Some(2));
        assert!(s.apply_snapshot(&serde_json::json!([])).is_err());
        assert_eq!(s.document().layer_count(), 2);
    }
}
