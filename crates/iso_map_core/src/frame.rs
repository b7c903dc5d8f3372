//! Backend-agnostic draw list for one frame
//!
//! Items are in world pixels (zoom 1, y down, camera offset not applied) and
//! listed in painter's order: rows back to front, then columns, then layers
//! bottom to top. Each item also carries a stable `order` key so retained
//! backends can depth-sort without rebuilding when the hover cell moves.
//! Only the pointer dot is in screen pixels.

use crate::color::HexColor;
use crate::document::MAX_LAYERS;
use crate::layer::{Tile, GRID_HEIGHT, GRID_WIDTH, SHEET_COLUMNS, TILE_SIZE, TOTAL_SLOTS};
use crate::projection::{
    grid_to_screen, IsoCamera, ScreenPos, TilePos, Viewport, ISO_HALF_H, ISO_HALF_W,
    ISO_TILE_HEIGHT, LAYER_HEIGHT_PX,
};
use crate::session::EditorSession;

/// Opacity of non-active layers while isolating
pub const GHOST_LAYER_ALPHA: f32 = 0.1;
/// Opacity of the hover outline edges behind the preview tile
pub const HOVER_BACK_ALPHA: f32 = 0.55;
/// Opacity of the hover outline edges in front of the preview tile
pub const HOVER_FRONT_ALPHA: f32 = 0.95;
/// Radius of the pointer dot in screen pixels
pub const POINTER_RADIUS: f64 = 2.5;

/// Draw slots within one (cell, layer) step
const SLOT_GRID: u32 = 0;
const SLOT_TILE: u32 = 1;
const SLOT_HOVER_BACK: u32 = 2;
const SLOT_HOVER_TILE: u32 = 3;
const SLOT_HOVER_FRONT: u32 = 4;
const SLOTS: u32 = 5;

/// Pixel origin of a tile index in the spritesheet, clamped into the sheet
pub fn sheet_slot(index: u32) -> (u32, u32) {
    let safe = index.min(TOTAL_SLOTS - 1);
    (
        (safe % SHEET_COLUMNS) * TILE_SIZE,
        (safe / SHEET_COLUMNS) * TILE_SIZE,
    )
}

/// Stable painter's-order key for a draw slot
fn order_key(row: u32, col: u32, layer: usize, slot: u32) -> u32 {
    ((row * GRID_WIDTH + col) * MAX_LAYERS as u32 + layer as u32) * SLOTS + slot
}

/// Which overlays to include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOptions {
    pub grid: bool,
    pub hover: bool,
    pub pointer: bool,
}

impl FrameOptions {
    /// Everything, for the live viewport
    pub const fn live() -> Self {
        Self {
            grid: true,
            hover: true,
            pointer: true,
        }
    }

    /// Tiles only, for image export
    pub const fn export() -> Self {
        Self {
            grid: false,
            hover: false,
            pointer: false,
        }
    }
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self::live()
    }
}

/// A line segment in world pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineEdge {
    pub from: ScreenPos,
    pub to: ScreenPos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameItem {
    /// Diamond outline of one cell on the active layer
    GridCell { corners: [ScreenPos; 4], order: u32 },
    /// A spritesheet tile with its top-left corner in world pixels
    Tile {
        index: u32,
        cell: TilePos,
        layer: usize,
        top_left: ScreenPos,
        alpha: f32,
        preview: bool,
        order: u32,
    },
    /// Two edges of the hover outline
    HoverEdges {
        edges: [OutlineEdge; 2],
        alpha: f32,
        order: u32,
    },
    /// Cursor marker, in screen pixels
    Pointer { center: ScreenPos, radius: f64 },
}

/// Ordered draw list for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub background: HexColor,
    pub camera: IsoCamera,
    pub viewport: Viewport,
    pub items: Vec<FrameItem>,
}

impl FramePlan {
    pub fn build(session: &EditorSession, options: FrameOptions) -> Self {
        let doc = session.document();
        let active = doc.active_layer();
        let isolate = session.is_isolating();
        let hide = isolate && session.hides_isolated();
        let hover = if options.hover { session.hover() } else { None };

        let mut items = Vec::new();
        for row in 0..GRID_HEIGHT {
            for col in 0..GRID_WIDTH {
                let s = grid_to_screen(col as f64, row as f64);
                for (layer_index, layer) in doc.layers().iter().enumerate() {
                    let is_active = layer_index == active;
                    if hide && !is_active {
                        continue;
                    }
                    let layer_offset = layer_index as f64 * LAYER_HEIGHT_PX as f64;
                    let top = ScreenPos::new(s.x, s.y - layer_offset);

                    if options.grid && is_active {
                        items.push(FrameItem::GridCell {
                            corners: diamond(top),
                            order: order_key(row, col, layer_index, SLOT_GRID),
                        });
                    }

                    if let Some(index) = valid_index(layer.get(col, row)) {
                        let alpha = if isolate && !is_active {
                            GHOST_LAYER_ALPHA
                        } else {
                            1.0
                        };
                        items.push(FrameItem::Tile {
                            index,
                            cell: TilePos::new(col, row),
                            layer: layer_index,
                            top_left: blit_origin(top),
                            alpha,
                            preview: false,
                            order: order_key(row, col, layer_index, SLOT_TILE),
                        });
                    }

                    if is_active && hover == Some(TilePos::new(col, row)) {
                        push_hover(
                            &mut items,
                            top,
                            session.selected_tile(),
                            TilePos::new(col, row),
                            layer_index,
                        );
                    }
                }
            }
        }

        if options.pointer {
            if let Some(center) = session.pointer() {
                items.push(FrameItem::Pointer {
                    center,
                    radius: POINTER_RADIUS,
                });
            }
        }

        Self {
            background: doc.background.clone(),
            camera: *session.camera(),
            viewport: session.viewport(),
            items,
        }
    }

    /// World point to screen pixels
    pub fn to_screen(&self, world: ScreenPos) -> ScreenPos {
        self.camera.world_to_screen(world)
    }

    /// Screen-space top-left of a tile blit, snapped to whole pixels before zoom
    pub fn blit_to_screen(&self, top_left: ScreenPos) -> ScreenPos {
        let zoom = self.camera.zoom;
        ScreenPos::new(
            (top_left.x + self.camera.offset.x).floor() * zoom,
            (top_left.y + self.camera.offset.y).floor() * zoom,
        )
    }

    /// Edge length of a tile blit in screen pixels
    pub fn tile_screen_size(&self) -> f64 {
        TILE_SIZE as f64 * self.camera.zoom
    }

    pub fn tiles(&self) -> impl Iterator<Item = &FrameItem> {
        self.items
            .iter()
            .filter(|item| matches!(item, FrameItem::Tile { .. }))
    }
}

fn valid_index(tile: Tile) -> Option<u32> {
    tile.filter(|index| crate::layer::is_valid_tile(*index))
}

/// Top, right, bottom, left corners of a cell whose top corner is `top`
fn diamond(top: ScreenPos) -> [ScreenPos; 4] {
    [
        top,
        ScreenPos::new(top.x + ISO_HALF_W, top.y + ISO_HALF_H),
        ScreenPos::new(top.x, top.y + ISO_TILE_HEIGHT),
        ScreenPos::new(top.x - ISO_HALF_W, top.y + ISO_HALF_H),
    ]
}

/// Tile sprites are anchored half a tile left of and one tile above the top corner
fn blit_origin(top: ScreenPos) -> ScreenPos {
    ScreenPos::new(top.x - ISO_HALF_W, top.y - TILE_SIZE as f64 / 2.0)
}

fn push_hover(items: &mut Vec<FrameItem>, top: ScreenPos, selected: u32, cell: TilePos, layer: usize) {
    let [top_corner, right, bottom, left] = diamond(top);
    items.push(FrameItem::HoverEdges {
        edges: [
            OutlineEdge {
                from: top_corner,
                to: left,
            },
            OutlineEdge {
                from: top_corner,
                to: right,
            },
        ],
        alpha: HOVER_BACK_ALPHA,
        order: order_key(cell.y, cell.x, layer, SLOT_HOVER_BACK),
    });
    if let Some(index) = valid_index(Some(selected)) {
        items.push(FrameItem::Tile {
            index,
            cell,
            layer,
            top_left: blit_origin(top),
            alpha: 1.0,
            preview: true,
            order: order_key(cell.y, cell.x, layer, SLOT_HOVER_TILE),
        });
    }
    items.push(FrameItem::HoverEdges {
        edges: [
            OutlineEdge {
                from: left,
                to: bottom,
            },
            OutlineEdge {
                from: right,
                to: bottom,
            },
        ],
        alpha: HOVER_FRONT_ALPHA,
        order: order_key(cell.y, cell.x, layer, SLOT_HOVER_FRONT),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{HeldButtons, PointerButton};

    fn session() -> EditorSession {
        EditorSession::default().with_viewport(Viewport::new(800.0, 600.0))
    }

    fn paint(session: &mut EditorSession, x: u32, y: u32, tile: u32) {
        let mut world = grid_to_screen(x as f64 + 0.5, y as f64 + 0.5);
        world.y -= session.document().active_layer() as f64 * LAYER_HEIGHT_PX as f64;
        let pos = session.camera().world_to_screen(world);
        session.select_tile(tile);
        session.pointer_down(PointerButton::Primary, pos);
        session.pointer_up();
    }

    fn tile_alphas(plan: &FramePlan) -> Vec<(usize, f32)> {
        plan.tiles()
            .filter_map(|item| match item {
                FrameItem::Tile {
                    layer,
                    alpha,
                    preview: false,
                    ..
                } => Some((*layer, *alpha)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_sheet_slot() {
        assert_eq!(sheet_slot(0), (0, 0));
        assert_eq!(sheet_slot(12), (32, 32));
        assert_eq!(sheet_slot(114), (4 * 32, 10 * 32));
        assert_eq!(sheet_slot(500), (10 * 32, 10 * 32));
    }

    #[test]
    fn test_empty_map_draws_grid_only() {
        let plan = session().frame_plan(FrameOptions::live());
        let grid = plan
            .items
            .iter()
            .filter(|item| matches!(item, FrameItem::GridCell { .. }))
            .count();
        assert_eq!(grid, (GRID_WIDTH * GRID_HEIGHT) as usize);
        assert_eq!(plan.tiles().count(), 0);
    }

    #[test]
    fn test_export_options_suppress_overlays() {
        let mut s = session();
        paint(&mut s, 3, 3, 2);
        s.pointer_move(ScreenPos::new(400.0, 300.0), HeldButtons::default());

        let plan = s.frame_plan(FrameOptions::export());
        assert_eq!(plan.items.len(), 1);
        assert!(matches!(plan.items[0], FrameItem::Tile { index: 2, .. }));
    }

    #[test]
    fn test_tile_blit_position() {
        let mut s = session();
        paint(&mut s, 2, 1, 5);
        s.add_layer();
        paint(&mut s, 2, 1, 6);

        let plan = s.frame_plan(FrameOptions::export());
        let origins: Vec<ScreenPos> = plan
            .tiles()
            .filter_map(|item| match item {
                FrameItem::Tile { top_left, .. } => Some(*top_left),
                _ => None,
            })
            .collect();
        // grid_to_screen(2, 1) = (16, 24)
        assert_eq!(origins, vec![ScreenPos::new(0.0, 8.0), ScreenPos::new(0.0, 0.0)]);
    }

    #[test]
    fn test_isolate_ghosts_and_hides() {
        let mut s = session();
        paint(&mut s, 0, 0, 1);
        s.add_layer();
        paint(&mut s, 0, 0, 2);
        s.previous_layer();

        s.toggle_isolate();
        let plan = s.frame_plan(FrameOptions::export());
        assert_eq!(tile_alphas(&plan), vec![(0, 1.0), (1, GHOST_LAYER_ALPHA)]);

        s.toggle_hide_isolated();
        let plan = s.frame_plan(FrameOptions::export());
        assert_eq!(tile_alphas(&plan), vec![(0, 1.0)]);
    }

    #[test]
    fn test_hover_preview_order() {
        let mut s = session();
        s.select_tile(9);
        let pos = s.camera().world_to_screen(grid_to_screen(5.5, 5.5));
        s.pointer_move(pos, HeldButtons::default());

        let plan = s.frame_plan(FrameOptions::live());
        let hover: Vec<&FrameItem> = plan
            .items
            .iter()
            .filter(|item| {
                matches!(
                    item,
                    FrameItem::HoverEdges { .. } | FrameItem::Tile { preview: true, .. }
                )
            })
            .collect();
        assert_eq!(hover.len(), 3);
        assert!(matches!(hover[0], FrameItem::HoverEdges { alpha, .. } if *alpha == HOVER_BACK_ALPHA));
        assert!(matches!(hover[1], FrameItem::Tile { index: 9, .. }));
        assert!(matches!(hover[2], FrameItem::HoverEdges { alpha, .. } if *alpha == HOVER_FRONT_ALPHA));
        assert!(matches!(plan.items.last(), Some(FrameItem::Pointer { .. })));
    }

    #[test]
    fn test_order_keys_increase() {
        let mut s = session();
        paint(&mut s, 1, 1, 1);
        paint(&mut s, 2, 1, 1);
        s.add_layer();
        paint(&mut s, 1, 1, 1);
        let plan = s.frame_plan(FrameOptions::live());
        let orders: Vec<u32> = plan
            .items
            .iter()
            .filter_map(|item| match item {
                FrameItem::GridCell { order, .. }
                | FrameItem::Tile { order, .. }
                | FrameItem::HoverEdges { order, .. } => Some(*order),
                FrameItem::Pointer { .. } => None,
            })
            .collect();
        assert!(orders.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_blit_to_screen_snaps_before_zoom() {
        let mut plan = session().frame_plan(FrameOptions::export());
        plan.camera = IsoCamera {
            offset: ScreenPos::new(10.7, 3.2),
            zoom: 2.0,
        };
        assert_eq!(
            plan.blit_to_screen(ScreenPos::new(-16.0, -16.0)),
            ScreenPos::new(-12.0, -26.0)
        );
        assert_eq!(plan.tile_screen_size(), 64.0);
    }
}
