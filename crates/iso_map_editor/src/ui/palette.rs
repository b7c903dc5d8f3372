//! Tile palette backed by the spritesheet texture

use bevy_egui::egui;
use iso_map_core::{sheet_slot, EditorSession, TILE_SIZE, VALID_TILE_COUNT};

use super::{EditorTheme, ImageLoadState, SpritesheetTexture};

const PALETTE_COLUMNS: u32 = 5;
const PALETTE_TILE_SIZE: f32 = 40.0;

pub fn render_palette(ui: &mut egui::Ui, session: &mut EditorSession, sheet: &SpritesheetTexture) {
    ui.heading("Tiles");

    let (texture_id, sheet_size) = match (&sheet.state, sheet.texture_id) {
        (ImageLoadState::Loaded, Some(texture_id)) => (texture_id, sheet.size),
        (ImageLoadState::Failed(msg), _) => {
            ui.colored_label(EditorTheme::ERROR, msg);
            return;
        }
        _ => {
            ui.label("Loading spritesheet...");
            return;
        }
    };
    if sheet_size.x <= 0.0 || sheet_size.y <= 0.0 {
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("tile_palette_scroll")
        .show(ui, |ui| {
            egui::Grid::new("tile_palette")
                .spacing([2.0, 2.0])
                .show(ui, |ui| {
                    for index in 0..VALID_TILE_COUNT {
                        let (sx, sy) = sheet_slot(index);
                        let uv_min = egui::pos2(sx as f32 / sheet_size.x, sy as f32 / sheet_size.y);
                        let uv_max = egui::pos2(
                            (sx + TILE_SIZE) as f32 / sheet_size.x,
                            (sy + TILE_SIZE) as f32 / sheet_size.y,
                        );

                        #[allow(deprecated)]
                        let response = ui
                            .add(
                                egui::ImageButton::new(egui::load::SizedTexture::new(
                                    texture_id,
                                    egui::vec2(PALETTE_TILE_SIZE, PALETTE_TILE_SIZE),
                                ))
                                .uv(egui::Rect::from_min_max(uv_min, uv_max))
                                .frame(false)
                                .rounding(0.0),
                            )
                            .on_hover_text(format!("Tile {}", index));

                        if session.selected_tile() == index {
                            ui.painter().rect_stroke(
                                response.rect,
                                0.0,
                                egui::Stroke::new(2.0, EditorTheme::ACCENT),
                                egui::StrokeKind::Inside,
                            );
                        }
                        if response.clicked() {
                            session.select_tile(index);
                        }
                        if (index + 1) % PALETTE_COLUMNS == 0 {
                            ui.end_row();
                        }
                    }
                });
        });
}
