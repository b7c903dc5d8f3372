//! Map rendering for the editor viewport
//!
//! Tiles are Bevy sprites cut from the spritesheet with `Sprite::rect`, rebuilt
//! whenever the session revision changes. Grid, hover outline and pointer dot
//! are immediate-mode gizmos redrawn every frame.
//!
//! The session works in screen pixels with y pointing down. World pixels map to
//! Bevy world units 1:1 with y negated, and the camera scale carries the zoom.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use iso_map_core::{
    sheet_slot, EditorSession, FrameItem, FrameOptions, FramePlan, IsoCamera, ScreenPos,
    TilePos, TILE_SIZE,
};
use std::collections::HashMap;

use crate::ui::SpritesheetTexture;
use crate::EditorState;

/// Depth added per draw-order step
const Z_PER_ORDER: f32 = 1e-4;

/// Plugin for map rendering
pub struct MapRenderPlugin;

impl Plugin for MapRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RenderState>()
            .add_systems(Update, sync_clear_color)
            .add_systems(Update, sync_tile_sprites)
            .add_systems(Update, sync_viewport_overlays)
            .add_systems(Update, update_camera_from_session);
    }
}

/// Tracks which document revision the tile sprites show
#[derive(Resource, Default)]
pub struct RenderState {
    pub rendered_revision: Option<u64>,
    pub tile_sprites: HashMap<TileKey, (Entity, TileLook)>,
}

/// A placed tile is identified by its layer and cell
pub type TileKey = (usize, TilePos);

/// What a placed tile sprite currently shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLook {
    pub index: u32,
    pub top_left: ScreenPos,
    pub alpha: f32,
    pub order: u32,
}

/// Sprite changes needed to go from the shown tiles to a new plan
#[derive(Debug, Default, PartialEq)]
pub struct TileSpriteDiff {
    pub spawn: Vec<(TileKey, TileLook)>,
    pub update: Vec<(TileKey, TileLook)>,
    pub despawn: Vec<TileKey>,
}

/// Placed tiles of a plan, keyed by layer and cell
pub fn planned_tiles(plan: &FramePlan) -> HashMap<TileKey, TileLook> {
    plan.tiles()
        .filter_map(|item| match item {
            FrameItem::Tile {
                index,
                cell,
                layer,
                top_left,
                alpha,
                preview: false,
                order,
            } => Some((
                (*layer, *cell),
                TileLook {
                    index: *index,
                    top_left: *top_left,
                    alpha: *alpha,
                    order: *order,
                },
            )),
            _ => None,
        })
        .collect()
}

/// Compare shown tiles against the planned ones
pub fn diff_tiles(
    shown: &HashMap<TileKey, (Entity, TileLook)>,
    planned: &HashMap<TileKey, TileLook>,
) -> TileSpriteDiff {
    let mut diff = TileSpriteDiff::default();
    for (key, look) in planned {
        match shown.get(key) {
            None => diff.spawn.push((*key, *look)),
            Some((_, current)) if current != look => diff.update.push((*key, *look)),
            Some(_) => {}
        }
    }
    diff.despawn = shown
        .keys()
        .filter(|key| !planned.contains_key(*key))
        .copied()
        .collect();
    diff
}

/// Marker for placed tiles
#[derive(Component)]
pub struct MapTileSprite;

/// Marker for the translucent tile under the cursor
#[derive(Component)]
pub struct HoverPreviewSprite;

/// World pixel (y down) to Bevy world (y up)
pub fn world_to_bevy(p: ScreenPos) -> Vec2 {
    Vec2::new(p.x as f32, -(p.y as f32))
}

fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Color {
    Color::srgba_u8(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn tile_sprite(image: &Handle<Image>, index: u32, alpha: f32) -> Sprite {
    let (sx, sy) = sheet_slot(index);
    let size = TILE_SIZE as f32;
    Sprite {
        image: image.clone(),
        rect: Some(Rect::new(sx as f32, sy as f32, sx as f32 + size, sy as f32 + size)),
        custom_size: Some(Vec2::splat(size)),
        color: Color::srgba(1.0, 1.0, 1.0, alpha),
        ..default()
    }
}

/// Sprite transform for a blit whose top-left corner is `top_left`
fn tile_transform(top_left: ScreenPos, order: u32) -> Transform {
    let half = TILE_SIZE as f32 / 2.0;
    let center = world_to_bevy(top_left) + Vec2::new(half, -half);
    Transform::from_xyz(center.x, center.y, order as f32 * Z_PER_ORDER)
}

/// Camera position that puts session screen (0, 0) at the window's top-left
pub fn camera_translation(camera: &IsoCamera, window_size: Vec2) -> Vec2 {
    let zoom = camera.zoom as f32;
    Vec2::new(
        window_size.x / (2.0 * zoom) - camera.offset.x as f32,
        camera.offset.y as f32 - window_size.y / (2.0 * zoom),
    )
}

fn sync_clear_color(session: Res<EditorSession>, mut clear_color: ResMut<ClearColor>) {
    let [r, g, b] = session.document().background.rgb();
    let color = Color::srgb_u8(r, g, b);
    if clear_color.0 != color {
        clear_color.0 = color;
    }
}

/// Bring tile sprites in line with the document when its revision changed.
/// Only cells whose tile, alpha or position changed are touched.
fn sync_tile_sprites(
    mut commands: Commands,
    mut render_state: ResMut<RenderState>,
    session: Res<EditorSession>,
    sheet: Res<SpritesheetTexture>,
) {
    let Some(handle) = sheet.loaded_handle() else {
        return;
    };
    if render_state.rendered_revision == Some(session.revision()) {
        return;
    }

    let planned = planned_tiles(&session.frame_plan(FrameOptions::export()));
    let diff = diff_tiles(&render_state.tile_sprites, &planned);

    for key in diff.despawn {
        if let Some((entity, _)) = render_state.tile_sprites.remove(&key) {
            let _ = commands.get_entity(entity).map(|mut e| e.despawn());
        }
    }
    for (key, look) in diff.update {
        if let Some((entity, shown)) = render_state.tile_sprites.get_mut(&key) {
            if let Ok(mut e) = commands.get_entity(*entity) {
                e.insert((
                    tile_sprite(handle, look.index, look.alpha),
                    tile_transform(look.top_left, look.order),
                ));
            }
            *shown = look;
        }
    }
    for (key, look) in diff.spawn {
        let entity = commands
            .spawn((
                MapTileSprite,
                tile_sprite(handle, look.index, look.alpha),
                tile_transform(look.top_left, look.order),
            ))
            .id();
        render_state.tile_sprites.insert(key, (entity, look));
    }
    render_state.rendered_revision = Some(session.revision());
}

/// Grid, hover outline, hover preview tile and pointer dot
fn sync_viewport_overlays(
    mut commands: Commands,
    mut gizmos: Gizmos,
    session: Res<EditorSession>,
    editor_state: Res<EditorState>,
    sheet: Res<SpritesheetTexture>,
    mut preview_query: Query<
        (&mut Sprite, &mut Transform, &mut Visibility),
        With<HoverPreviewSprite>,
    >,
) {
    let plan = session.frame_plan(FrameOptions {
        grid: editor_state.show_grid,
        hover: true,
        pointer: true,
    });

    let grid_color = rgba(45, 70, 53, 0.18);
    let mut preview = None;
    for item in &plan.items {
        match item {
            FrameItem::GridCell { corners, .. } => {
                for (i, corner) in corners.iter().enumerate() {
                    let next = corners[(i + 1) % corners.len()];
                    gizmos.line_2d(world_to_bevy(*corner), world_to_bevy(next), grid_color);
                }
            }
            FrameItem::Tile {
                index,
                top_left,
                alpha,
                preview: true,
                order,
                ..
            } => {
                preview = Some((*index, *top_left, *alpha, *order));
            }
            FrameItem::Tile { .. } => {}
            FrameItem::HoverEdges { edges, alpha, .. } => {
                let color = rgba(112, 214, 123, *alpha);
                for edge in edges {
                    gizmos.line_2d(world_to_bevy(edge.from), world_to_bevy(edge.to), color);
                }
            }
            FrameItem::Pointer { center, radius } => {
                let world = world_to_bevy(plan.camera.screen_to_world(*center));
                let radius = (*radius / plan.camera.zoom) as f32;
                let iso = Isometry2d::from_translation(world);
                gizmos.circle_2d(iso, radius * 0.5, rgba(35, 48, 39, 0.9));
                gizmos.circle_2d(iso, radius, rgba(246, 250, 239, 0.95));
            }
        }
    }

    let Some(handle) = sheet.loaded_handle() else {
        return;
    };
    match preview_query.single_mut() {
        Ok((mut sprite, mut transform, mut visibility)) => match preview {
            Some((index, top_left, alpha, order)) => {
                *sprite = tile_sprite(handle, index, alpha);
                *transform = tile_transform(top_left, order);
                *visibility = Visibility::Visible;
            }
            None => {
                *visibility = Visibility::Hidden;
            }
        },
        Err(_) => {
            commands.spawn((
                HoverPreviewSprite,
                tile_sprite(handle, 0, 0.0),
                Transform::default(),
                Visibility::Hidden,
            ));
        }
    }
}

/// System to update camera transform and projection from the session camera
fn update_camera_from_session(
    session: Res<EditorSession>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut camera_query: Query<&mut Transform, With<Camera2d>>,
    mut projection_query: Query<&mut Projection, With<Camera2d>>,
) {
    let Ok(window) = windows.single() else { return };
    let camera = session.camera();
    let translation = camera_translation(camera, Vec2::new(window.width(), window.height()));

    for mut transform in camera_query.iter_mut() {
        transform.translation.x = translation.x;
        transform.translation.y = translation.y;
    }

    for mut projection in projection_query.iter_mut() {
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = 1.0 / camera.zoom as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Screen position of a Bevy world point under an orthographic camera at `cam`
    fn project(point: Vec2, cam: Vec2, zoom: f32, window: Vec2) -> Vec2 {
        Vec2::new(
            (point.x - cam.x) * zoom + window.x / 2.0,
            window.y / 2.0 - (point.y - cam.y) * zoom,
        )
    }

    #[test]
    fn test_camera_matches_session_projection() {
        let camera = IsoCamera {
            offset: ScreenPos::new(120.0, -35.0),
            zoom: 1.95,
        };
        let window = Vec2::new(1280.0, 720.0);
        let cam = camera_translation(&camera, window);

        let world = ScreenPos::new(64.0, 200.0);
        let expected = camera.world_to_screen(world);
        let actual = project(world_to_bevy(world), cam, camera.zoom as f32, window);
        assert!((actual.x - expected.x as f32).abs() < 1e-3);
        assert!((actual.y - expected.y as f32).abs() < 1e-3);
    }

    #[test]
    fn test_tile_transform_centers_blit() {
        let transform = tile_transform(ScreenPos::new(-16.0, 4.0), 10);
        assert_eq!(transform.translation.x, 0.0);
        assert_eq!(transform.translation.y, -20.0);
        assert!((transform.translation.z - 0.001).abs() < 1e-6);
    }

    fn session_with(json: &str) -> EditorSession {
        let mut session = EditorSession::new(Box::new(iso_map_core::MemoryStore::new()));
        session.import_json(json).unwrap();
        session
    }

    fn shown(planned: &HashMap<TileKey, TileLook>) -> HashMap<TileKey, (Entity, TileLook)> {
        planned
            .iter()
            .map(|(key, look)| (*key, (Entity::PLACEHOLDER, *look)))
            .collect()
    }

    const TWO_LAYERS: &str = r#"{"layers":[[[1,2],[null,null]],[[null,3],[null,null]]]}"#;

    #[test]
    fn test_first_sync_spawns_every_tile() {
        let session = session_with(TWO_LAYERS);
        let planned = planned_tiles(&session.frame_plan(FrameOptions::export()));
        let diff = diff_tiles(&HashMap::new(), &planned);
        assert_eq!(diff.spawn.len(), 3);
        assert!(diff.update.is_empty() && diff.despawn.is_empty());
    }

    #[test]
    fn test_painting_one_cell_touches_one_sprite() {
        let mut session = session_with(TWO_LAYERS);
        let before = planned_tiles(&session.frame_plan(FrameOptions::export()));

        session
            .import_json(r#"{"layers":[[[1,2],[4,null]],[[null,3],[null,null]]]}"#)
            .unwrap();
        let after = planned_tiles(&session.frame_plan(FrameOptions::export()));
        let diff = diff_tiles(&shown(&before), &after);
        assert_eq!(diff.spawn.len(), 1);
        assert_eq!(diff.spawn[0].0, (0, TilePos::new(0, 1)));
        assert_eq!(diff.spawn[0].1.index, 4);
        assert!(diff.update.is_empty() && diff.despawn.is_empty());
    }

    #[test]
    fn test_isolate_updates_only_other_layers() {
        let mut session = session_with(TWO_LAYERS);
        let before = planned_tiles(&session.frame_plan(FrameOptions::export()));

        session.toggle_isolate();
        let after = planned_tiles(&session.frame_plan(FrameOptions::export()));
        let diff = diff_tiles(&shown(&before), &after);
        assert_eq!(diff.update.len(), 1);
        assert_eq!(diff.update[0].0, (1, TilePos::new(1, 0)));
        assert!(diff.update[0].1.alpha < 1.0);
        assert!(diff.spawn.is_empty() && diff.despawn.is_empty());
    }

    #[test]
    fn test_erased_tiles_are_despawned() {
        let mut session = session_with(TWO_LAYERS);
        let before = planned_tiles(&session.frame_plan(FrameOptions::export()));

        session
            .import_json(r#"{"layers":[[[1,null],[null,null]],[[null,3],[null,null]]]}"#)
            .unwrap();
        let after = planned_tiles(&session.frame_plan(FrameOptions::export()));
        let diff = diff_tiles(&shown(&before), &after);
        assert_eq!(diff.despawn, vec![(0, TilePos::new(1, 0))]);
        assert!(diff.spawn.is_empty() && diff.update.is_empty());
    }

    #[test]
    fn test_tile_sprite_rect() {
        let sprite = tile_sprite(&Handle::default(), 12, 0.1);
        let rect = sprite.rect.unwrap();
        assert_eq!(rect.min, Vec2::new(32.0, 32.0));
        assert_eq!(rect.max, Vec2::new(64.0, 64.0));
        assert_eq!(sprite.custom_size, Some(Vec2::splat(32.0)));
    }
}
