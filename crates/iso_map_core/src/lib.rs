//! Core data structures for iso_map_editor
//!
//! This crate provides the editing engine behind the isometric map editor:
//! - `IsoCamera` - Isometric projection, camera offset and zoom
//! - `MapDocument` - The layered tile grid being edited
//! - `StrokeHistory` - Coalesced paint strokes with bounded undo/redo
//! - `MapSnapshot` - The portable JSON document and its validation
//! - `EditorSession` - Document, view and history bundled behind an event API
//! - `FramePlan` - Backend-agnostic draw list for one rendered frame
//!
//! Nothing in here touches a window or a GPU; the editor crate drives a
//! session from Bevy input and renders its frame plans.

mod color;
mod debounce;
mod document;
mod frame;
mod history;
mod layer;
mod projection;
mod session;
mod snapshot;
mod status;
mod storage;

pub use color::{HexColor, DEFAULT_CANVAS_BG};
pub use debounce::Debouncer;
pub use document::{MapDocument, MAX_LAYERS};
pub use frame::{
    sheet_slot, FrameItem, FrameOptions, FramePlan, OutlineEdge, GHOST_LAYER_ALPHA,
    HOVER_BACK_ALPHA, HOVER_FRONT_ALPHA, POINTER_RADIUS,
};
pub use history::{CommitOutcome, StrokeHistory, TileChange, MAX_UNDO_STEPS};
pub use layer::{
    is_valid_tile, Layer, Tile, GRID_HEIGHT, GRID_WIDTH, SHEET_COLUMNS, SHEET_ROWS,
    TILE_SIZE, TOTAL_SLOTS, VALID_TILE_COUNT,
};
pub use projection::{
    grid_to_screen, snap_zoom, IsoCamera, ScreenPos, TilePos, Viewport, DEFAULT_ZOOM,
    ISO_HALF_H, ISO_HALF_W, ISO_TILE_HEIGHT, ISO_TILE_WIDTH, LAYER_HEIGHT_PX, MAX_ZOOM,
    MIN_VIEWPORT_HEIGHT, MIN_VIEWPORT_WIDTH, MIN_ZOOM, ZOOM_STEP,
};
pub use session::{EditorSession, HeldButtons, PointerButton, SAVE_DEBOUNCE, STORAGE_KEY};
pub use snapshot::{
    is_valid, normalize_layers, parse_json, validate, MapSnapshot, SnapshotError,
    ValidatedSnapshot, SNAPSHOT_VERSION,
};
pub use status::{StatusLine, StatusMessage, STATUS_MESSAGE_TTL};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
