//! iso_map_editor - Isometric tile map editor for Bevy
//!
//! This crate wires the `iso_map_core` editing engine into a Bevy app:
//! - Layered painting with a tile palette
//! - Pan (middle mouse) and cursor-anchored zoom (wheel)
//! - Stroke-based undo/redo
//! - Local autosave, JSON import/export and PNG export
//!
//! # Usage
//!
//! ```rust,ignore
//! use bevy::prelude::*;
//! use iso_map_editor::IsoEditorPlugin;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(IsoEditorPlugin::new().with_spritesheet_path("tiles/iso.png"))
//!         .run();
//! }
//! ```

pub mod commands;
pub mod export;
pub mod preferences;
pub mod render;
pub mod storage;
pub mod tools;
pub mod ui;

pub use iso_map_core;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use iso_map_core::EditorSession;
use std::path::{Path, PathBuf};

use commands::handle_keyboard_shortcuts;
use preferences::EditorPreferences;
use render::MapRenderPlugin;
use tools::EditorToolsPlugin;
use ui::{ConfirmAction, EditorUiPlugin, PendingAction};

/// Where the spritesheet comes from
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SpritesheetSource {
    /// Path handed to the `AssetServer`
    pub asset_path: String,
    /// Same file on disk, read directly for PNG export
    pub file_path: PathBuf,
}

impl SpritesheetSource {
    /// Resolve `path` against the assets directory unless it is absolute
    pub fn resolve(assets_path: &Path, path: &str) -> Self {
        let normalized = path.replace('\\', "/");
        let file_path = if Path::new(&normalized).is_absolute() {
            PathBuf::from(&normalized)
        } else {
            assets_path.join(&normalized)
        };
        Self {
            asset_path: normalized,
            file_path,
        }
    }
}

/// Main editor plugin
///
/// # Example
///
/// ```rust,ignore
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(
///         IsoEditorPlugin::new()
///             .with_assets_path("my_assets")
///             .with_storage_dir("/tmp/maps")
///     )
///     .run();
/// ```
#[derive(Default)]
pub struct IsoEditorPlugin {
    /// Custom assets path. If None, uses `./assets`.
    pub assets_path: Option<PathBuf>,
    /// Spritesheet override. If None, uses the saved preference.
    pub spritesheet_path: Option<String>,
    /// Directory for local saves. If None, uses the platform data directory.
    pub storage_dir: Option<PathBuf>,
}

impl IsoEditorPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the assets directory path
    /// This should match where Bevy's AssetServer looks for files.
    pub fn with_assets_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.assets_path = Some(path.into());
        self
    }

    /// Load tiles from this spritesheet instead of the saved preference
    pub fn with_spritesheet_path(mut self, path: impl Into<String>) -> Self {
        self.spritesheet_path = Some(path.into());
        self
    }

    /// Keep local saves in this directory
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    fn detect_assets_path(&self) -> PathBuf {
        if let Some(path) = &self.assets_path {
            return path.clone();
        }
        std::env::current_dir()
            .map(|p| p.join("assets"))
            .unwrap_or_else(|_| PathBuf::from("assets"))
    }
}

impl Plugin for IsoEditorPlugin {
    fn build(&self, app: &mut App) {
        let assets_path = self.detect_assets_path();
        bevy::log::info!("IsoEditorPlugin: Using assets path: {:?}", assets_path);

        let preferences = EditorPreferences::load();
        let spritesheet = self
            .spritesheet_path
            .as_deref()
            .unwrap_or(&preferences.spritesheet_path);
        let source = SpritesheetSource::resolve(&assets_path, spritesheet);

        let editor_state = EditorState {
            show_grid: preferences.show_grid,
            ..default()
        };

        let store = storage::open_store(self.storage_dir.clone());

        app.add_plugins(EguiPlugin::default())
            .add_plugins(EditorUiPlugin)
            .add_plugins(MapRenderPlugin)
            .add_plugins(EditorToolsPlugin)
            .insert_resource(editor_state)
            .insert_resource(preferences)
            .insert_resource(source)
            .insert_resource(EditorSession::new(store))
            .add_systems(Startup, setup_editor_camera)
            .add_systems(Update, handle_keyboard_shortcuts);
    }
}

/// Spawns the editor camera if one doesn't exist
fn setup_editor_camera(mut commands: Commands, camera_query: Query<&Camera2d>) {
    if camera_query.is_empty() {
        commands.spawn(Camera2d);
    }
}

/// UI-side editor state; document and view live in `EditorSession`
#[derive(Resource, Debug)]
pub struct EditorState {
    pub show_grid: bool,
    pub pending_action: Option<PendingAction>,
    /// Open confirmation modal
    pub confirm: Option<ConfirmAction>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            show_grid: true,
            pending_action: None,
            confirm: None,
        }
    }
}

impl EditorState {
    /// Open a confirmation modal
    pub fn request_confirm(&mut self, action: ConfirmAction) {
        self.confirm = Some(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spritesheet_source_resolves_relative_paths() {
        let source = SpritesheetSource::resolve(Path::new("/srv/assets"), "tiles\\iso.png");
        assert_eq!(source.asset_path, "tiles/iso.png");
        assert_eq!(source.file_path, PathBuf::from("/srv/assets/tiles/iso.png"));
    }

    #[test]
    fn test_spritesheet_source_keeps_absolute_paths() {
        let source = SpritesheetSource::resolve(Path::new("assets"), "/opt/sheet.png");
        assert_eq!(source.file_path, PathBuf::from("/opt/sheet.png"));
        assert_eq!(source.asset_path, "/opt/sheet.png");
    }

    #[test]
    fn test_plugin_builder() {
        let plugin = IsoEditorPlugin::new()
            .with_assets_path("a")
            .with_spritesheet_path("s.png")
            .with_storage_dir("/tmp/x");
        assert_eq!(plugin.detect_assets_path(), PathBuf::from("a"));
        assert_eq!(plugin.spritesheet_path.as_deref(), Some("s.png"));
        assert_eq!(plugin.storage_dir, Some(PathBuf::from("/tmp/x")));
    }
}
