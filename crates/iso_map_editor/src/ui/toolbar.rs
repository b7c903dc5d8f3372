//! Top toolbar, layer panel and status bar

use bevy_egui::egui;
use iso_map_core::{EditorSession, HexColor};

use super::{EditorTheme, PendingAction};
use crate::preferences::EditorPreferences;
use crate::EditorState;

/// File, history, zoom and view controls along the top edge
pub fn render_toolbar(
    ctx: &egui::Context,
    editor_state: &mut EditorState,
    session: &mut EditorSession,
    preferences: &mut EditorPreferences,
) {
    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui.button("New").clicked() {
                editor_state.pending_action = Some(PendingAction::NewMap);
            }
            if ui.button("Save").clicked() {
                editor_state.pending_action = Some(PendingAction::SaveLocal);
            }
            if ui.button("Load").clicked() {
                editor_state.pending_action = Some(PendingAction::LoadLocal);
            }

            ui.separator();

            #[cfg(feature = "native")]
            {
                if ui.button("Import...").clicked() {
                    editor_state.pending_action = Some(PendingAction::Import);
                }
                if ui.button("Export JSON").clicked() {
                    editor_state.pending_action = Some(PendingAction::ExportJson);
                }
                if ui.button("Export PNG").clicked() {
                    editor_state.pending_action = Some(PendingAction::ExportImage);
                }
                ui.separator();
            }

            if ui
                .add_enabled(session.can_undo(), egui::Button::new("Undo"))
                .on_hover_text("Ctrl+Z")
                .clicked()
            {
                editor_state.pending_action = Some(PendingAction::Undo);
            }
            if ui
                .add_enabled(session.can_redo(), egui::Button::new("Redo"))
                .on_hover_text("Ctrl+Shift+Z / Ctrl+Y")
                .clicked()
            {
                editor_state.pending_action = Some(PendingAction::Redo);
            }

            ui.separator();

            if ui.button("-").on_hover_text("Zoom out").clicked() {
                session.zoom_out();
            }
            ui.label(session.zoom_label());
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                session.zoom_in();
            }

            ui.separator();

            ui.label("Background");
            let mut rgb = session.document().background.rgb();
            if ui.color_edit_button_srgb(&mut rgb).changed() {
                session.set_background(HexColor::from_rgb(rgb).as_str());
            }

            if ui.checkbox(&mut editor_state.show_grid, "Grid").changed() {
                preferences.show_grid = editor_state.show_grid;
                if let Err(e) = preferences.save() {
                    bevy::log::error!("Failed to save preferences: {}", e);
                }
            }
        });
    });
}

/// Layer navigation and isolation controls
pub fn render_layer_controls(
    ui: &mut egui::Ui,
    editor_state: &mut EditorState,
    session: &mut EditorSession,
) {
    ui.heading("Layers");
    ui.label(session.layer_label());

    ui.horizontal(|ui| {
        let doc = session.document();
        let can_prev = doc.active_layer() > 0;
        let can_next = doc.active_layer() + 1 < doc.layer_count();
        let can_add = doc.can_add_layer();
        let can_remove = doc.can_remove_layer();

        if ui.add_enabled(can_prev, egui::Button::new("Prev")).clicked() {
            session.previous_layer();
        }
        if ui.add_enabled(can_next, egui::Button::new("Next")).clicked() {
            session.next_layer();
        }
        if ui.add_enabled(can_add, egui::Button::new("Add")).clicked() {
            session.add_layer();
        }
        if ui
            .add_enabled(can_remove, egui::Button::new("Remove"))
            .clicked()
        {
            editor_state.pending_action = Some(PendingAction::RemoveLayer);
        }
    });

    ui.horizontal(|ui| {
        if ui
            .selectable_label(session.is_isolating(), "Isolate")
            .on_hover_text("Ghost every other layer")
            .clicked()
        {
            session.toggle_isolate();
        }
        ui.add_enabled_ui(session.is_isolating(), |ui| {
            if ui
                .selectable_label(session.hides_isolated(), "Hide others")
                .clicked()
            {
                session.toggle_hide_isolated();
            }
        });
    });
}

/// Status message on the left, hovered cell on the right
pub fn render_status_bar(ctx: &egui::Context, session: &EditorSession) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            match session.status() {
                Some(status) if status.is_error => {
                    ui.colored_label(EditorTheme::ERROR, &status.text);
                }
                Some(status) => {
                    ui.label(&status.text);
                }
                None => {
                    ui.label("");
                }
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(session.hover_label());
            });
        });
    });
}
