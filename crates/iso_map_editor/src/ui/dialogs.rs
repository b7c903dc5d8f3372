//! Confirmation modal and file dialogs

use bevy_egui::egui;
use iso_map_core::EditorSession;

use crate::export::{self, JSON_EXPORT_NAME, PNG_EXPORT_NAME};
use crate::preferences::EditorPreferences;
use crate::{EditorState, SpritesheetSource};

/// Actions that can be triggered from the toolbar or shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// Ask, then reset to an empty map
    NewMap,
    /// Ask, then remove the active layer
    RemoveLayer,
    SaveLocal,
    LoadLocal,
    Import,
    ExportJson,
    ExportImage,
    Undo,
    Redo,
}

/// Destructive action waiting for a yes/no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    NewMap,
    RemoveLayer,
}

impl ConfirmAction {
    pub fn message(&self) -> &'static str {
        match self {
            ConfirmAction::NewMap => {
                "Start a new map and reset the editor? Unsaved in-memory changes will be cleared."
            }
            ConfirmAction::RemoveLayer => {
                "Remove the current layer? This action cannot be undone with layer restore."
            }
        }
    }
}

/// Close the open confirmation, running its action when accepted
pub fn resolve_confirm(
    editor_state: &mut EditorState,
    session: &mut EditorSession,
    accepted: bool,
) {
    let Some(action) = editor_state.confirm.take() else {
        return;
    };
    match (action, accepted) {
        (ConfirmAction::NewMap, true) => {
            session.new_map();
            bevy::log::info!("Started a new map");
        }
        (ConfirmAction::NewMap, false) => session.set_status("New map canceled.", false),
        (ConfirmAction::RemoveLayer, true) => {
            session.remove_active_layer();
        }
        (ConfirmAction::RemoveLayer, false) => {}
    }
}

/// Render all dialogs and run the file actions that need one
pub fn render_dialogs(
    ctx: &egui::Context,
    editor_state: &mut EditorState,
    session: &mut EditorSession,
    preferences: &mut EditorPreferences,
    source: &SpritesheetSource,
) {
    render_confirm_dialog(ctx, editor_state, session);

    if let Some(action) = editor_state.pending_action.take() {
        match action {
            PendingAction::NewMap => {
                editor_state.request_confirm(ConfirmAction::NewMap);
            }
            PendingAction::RemoveLayer => {
                if session.document().can_remove_layer() {
                    editor_state.request_confirm(ConfirmAction::RemoveLayer);
                }
            }
            PendingAction::Import => {
                #[cfg(feature = "native")]
                {
                    if let Some(path) = file_dialog(preferences)
                        .add_filter("Map JSON", &["json"])
                        .pick_file()
                    {
                        remember_dir(preferences, &path);
                        import_file(session, &path);
                    }
                }
            }
            PendingAction::ExportJson => {
                #[cfg(feature = "native")]
                {
                    if let Some(path) = file_dialog(preferences)
                        .add_filter("Map JSON", &["json"])
                        .set_file_name(JSON_EXPORT_NAME)
                        .save_file()
                    {
                        remember_dir(preferences, &path);
                        match export::write_json(session, &path) {
                            Ok(()) => {
                                bevy::log::info!("Exported map JSON to {:?}", path);
                                session.set_status("Exported map JSON.", false);
                            }
                            Err(e) => {
                                bevy::log::error!("Failed to export map JSON: {}", e);
                                session.set_status("Export failed.", true);
                            }
                        }
                    }
                }
            }
            PendingAction::ExportImage => {
                #[cfg(feature = "native")]
                {
                    if let Some(path) = file_dialog(preferences)
                        .add_filter("PNG Image", &["png"])
                        .set_file_name(PNG_EXPORT_NAME)
                        .save_file()
                    {
                        remember_dir(preferences, &path);
                        match export::write_png(session, &source.file_path, &path) {
                            Ok(()) => {
                                bevy::log::info!("Exported map image to {:?}", path);
                                session.set_status("Exported PNG image (grid hidden).", false);
                            }
                            Err(e) => {
                                bevy::log::error!("Failed to export map image: {}", e);
                                session.set_status("Image export failed.", true);
                            }
                        }
                    }
                }
            }
            _ => {
                // Put other actions back
                editor_state.pending_action = Some(action);
            }
        }
    }

    // Only the native file dialogs read these
    #[cfg(not(feature = "native"))]
    let _ = (preferences, source);
}

/// Read a JSON file from disk and import it
pub fn import_file(session: &mut EditorSession, path: &std::path::Path) {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            if let Err(e) = session.import_json(&text) {
                bevy::log::warn!("Rejected map import from {:?}: {}", path, e);
            }
        }
        Err(e) => {
            bevy::log::warn!("Could not read {:?}: {}", path, e);
            session.set_status("Import failed (invalid JSON map file).", true);
        }
    }
}

#[cfg(feature = "native")]
fn file_dialog(preferences: &EditorPreferences) -> rfd::FileDialog {
    let dialog = rfd::FileDialog::new();
    match &preferences.last_export_dir {
        Some(dir) if dir.is_dir() => dialog.set_directory(dir),
        _ => dialog,
    }
}

#[cfg(feature = "native")]
fn remember_dir(preferences: &mut EditorPreferences, path: &std::path::Path) {
    if preferences.remember_dir(path) {
        if let Err(e) = preferences.save() {
            bevy::log::error!("Failed to save preferences: {}", e);
        }
    }
}

fn render_confirm_dialog(
    ctx: &egui::Context,
    editor_state: &mut EditorState,
    session: &mut EditorSession,
) {
    let Some(action) = editor_state.confirm else {
        return;
    };

    let mut answer = None;
    egui::Window::new("Confirm")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(action.message());
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Yes").clicked() {
                    answer = Some(true);
                }
                if ui.button("No").clicked() {
                    answer = Some(false);
                }
            });
        });

    if let Some(accepted) = answer {
        resolve_confirm(editor_state, session, accepted);
    }
}
