//! Editor UI built with egui

mod dialogs;
mod palette;
mod theme;
mod toolbar;

pub use dialogs::{import_file, resolve_confirm, ConfirmAction, PendingAction};
pub use theme::EditorTheme;

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass, EguiTextureHandle};
use iso_map_core::EditorSession;

use crate::preferences::EditorPreferences;
use crate::{EditorState, SpritesheetSource};

/// State of an image load operation
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ImageLoadState {
    /// Not yet started loading
    #[default]
    Pending,
    Loading,
    Loaded,
    /// Failed to load, with a message for the palette
    Failed(String),
}

/// The spritesheet as a Bevy image and an egui texture
#[derive(Resource, Default)]
pub struct SpritesheetTexture {
    pub handle: Option<Handle<Image>>,
    pub texture_id: Option<egui::TextureId>,
    /// Pixel size once loaded
    pub size: Vec2,
    pub state: ImageLoadState,
}

impl SpritesheetTexture {
    pub fn is_loaded(&self) -> bool {
        self.state == ImageLoadState::Loaded
    }

    /// Image handle, only once the image is ready to draw
    pub fn loaded_handle(&self) -> Option<&Handle<Image>> {
        if self.is_loaded() {
            self.handle.as_ref()
        } else {
            None
        }
    }
}

/// Main UI plugin
pub struct EditorUiPlugin;

impl Plugin for EditorUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpritesheetTexture>()
            .add_systems(Update, (load_spritesheet_texture, process_edit_actions))
            .add_systems(EguiPrimaryContextPass, render_ui);
    }
}

/// Start loading the spritesheet and register it with egui once ready
fn load_spritesheet_texture(
    mut sheet: ResMut<SpritesheetTexture>,
    mut contexts: EguiContexts,
    mut session: ResMut<EditorSession>,
    source: Res<SpritesheetSource>,
    asset_server: Res<AssetServer>,
    images: Res<Assets<Image>>,
) {
    if matches!(sheet.state, ImageLoadState::Loaded | ImageLoadState::Failed(_)) {
        return;
    }

    let Some(handle) = sheet.handle.clone() else {
        let handle: Handle<Image> = asset_server.load(source.asset_path.clone());
        sheet.handle = Some(handle);
        sheet.state = ImageLoadState::Loading;
        return;
    };

    match asset_server.load_state(&handle) {
        LoadState::Loaded => {
            if let Some(image) = images.get(&handle) {
                sheet.size = Vec2::new(image.width() as f32, image.height() as f32);
                sheet.texture_id = Some(contexts.add_image(EguiTextureHandle::Strong(handle)));
                sheet.state = ImageLoadState::Loaded;
                bevy::log::info!(
                    "Loaded spritesheet {} ({}x{})",
                    source.asset_path,
                    sheet.size.x,
                    sheet.size.y
                );
            }
        }
        LoadState::Failed(e) => {
            bevy::log::error!("Failed to load spritesheet {}: {}", source.asset_path, e);
            sheet.state = ImageLoadState::Failed(format!(
                "Could not load spritesheet: {}",
                source.asset_path
            ));
            session.set_status("Could not load spritesheet.", true);
        }
        LoadState::Loading | LoadState::NotLoaded => {}
    }
}

/// Run edit actions queued by the toolbar and shortcuts
fn process_edit_actions(
    mut editor_state: ResMut<EditorState>,
    mut session: ResMut<EditorSession>,
) {
    let Some(action) = editor_state.pending_action.take() else {
        return;
    };
    match action {
        PendingAction::Undo => {
            session.undo();
        }
        PendingAction::Redo => {
            session.redo();
        }
        PendingAction::SaveLocal => {
            session.save_local();
        }
        PendingAction::LoadLocal => {
            session.load_local(false);
        }
        _ => {
            // Dialog-driven actions run in the UI pass
            editor_state.pending_action = Some(action);
        }
    }
}

/// Main UI rendering system
fn render_ui(
    mut contexts: EguiContexts,
    mut editor_state: ResMut<EditorState>,
    mut session: ResMut<EditorSession>,
    mut preferences: ResMut<EditorPreferences>,
    sheet: Res<SpritesheetTexture>,
    source: Res<SpritesheetSource>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    EditorTheme::apply(ctx);

    toolbar::render_toolbar(ctx, &mut editor_state, &mut session, &mut preferences);
    toolbar::render_status_bar(ctx, &session);

    egui::SidePanel::left("tools_panel")
        .resizable(false)
        .default_width(230.0)
        .show(ctx, |ui| {
            toolbar::render_layer_controls(ui, &mut editor_state, &mut session);
            ui.separator();
            palette::render_palette(ui, &mut session, &sheet);
        });

    dialogs::render_dialogs(
        ctx,
        &mut editor_state,
        &mut session,
        &mut preferences,
        &source,
    );
}
