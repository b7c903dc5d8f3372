//! Isometric projection, camera and zoom
//!
//! Screen space has its origin at the top-left of the viewport with y pointing
//! down. World space is screen space with zoom and camera offset undone; the
//! isometric transform maps grid cells into world space as diamonds.

use serde::{Deserialize, Serialize};

use crate::layer::{GRID_HEIGHT, GRID_WIDTH};

/// Width of an isometric diamond in world pixels
pub const ISO_TILE_WIDTH: f64 = 32.0;
/// Height of an isometric diamond in world pixels
pub const ISO_TILE_HEIGHT: f64 = 16.0;
pub const ISO_HALF_W: f64 = ISO_TILE_WIDTH / 2.0;
pub const ISO_HALF_H: f64 = ISO_TILE_HEIGHT / 2.0;

/// Vertical offset between stacked layers at zoom 1
pub const LAYER_HEIGHT_PX: u32 = 8;

pub const DEFAULT_ZOOM: f64 = 1.3;
pub const MIN_ZOOM: f64 = DEFAULT_ZOOM;
pub const MAX_ZOOM: f64 = DEFAULT_ZOOM * 3.0;
/// Zoom changes in 10% increments of the default zoom
pub const ZOOM_STEP: f64 = DEFAULT_ZOOM * 0.1;

pub const MIN_VIEWPORT_WIDTH: f64 = 320.0;
pub const MIN_VIEWPORT_HEIGHT: f64 = 260.0;

const ZOOM_EPSILON: f64 = 1e-9;
const BOUNDARY_EPSILON: f64 = 1e-9;

/// A point in screen or world pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPos {
    pub x: f64,
    pub y: f64,
}

impl ScreenPos {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A cell address on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: u32,
    pub y: u32,
}

impl TilePos {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Size of the drawing surface in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: MIN_VIEWPORT_WIDTH,
            height: MIN_VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    /// Create a viewport, flooring to whole pixels and enforcing the minimum size
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.floor().max(MIN_VIEWPORT_WIDTH),
            height: height.floor().max(MIN_VIEWPORT_HEIGHT),
        }
    }

    pub fn center(&self) -> ScreenPos {
        ScreenPos::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Forward isometric transform of a (possibly fractional) grid coordinate
#[inline]
pub fn grid_to_screen(gx: f64, gy: f64) -> ScreenPos {
    ScreenPos {
        x: (gx - gy) * ISO_HALF_W,
        y: (gx + gy) * ISO_HALF_H,
    }
}

/// Clamp a zoom into range and snap it to the nearest step from the default.
///
/// Snapping keeps repeated incremental zoom from drifting; snapping an
/// already-snapped value returns it unchanged.
pub fn snap_zoom(target: f64) -> f64 {
    let clamped = target.clamp(MIN_ZOOM, MAX_ZOOM);
    let steps = ((clamped - DEFAULT_ZOOM) / ZOOM_STEP).round();
    let snapped = DEFAULT_ZOOM + steps * ZOOM_STEP;
    snapped.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Pull values that land within float noise of a tile boundary onto it, so
/// exact corners survive the zoom round trip and floor to the lower tile
fn snap_to_boundary(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() < BOUNDARY_EPSILON {
        nearest
    } else {
        value
    }
}

/// Camera offset (pan) and zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoCamera {
    /// Pan offset in world pixels
    pub offset: ScreenPos,
    /// Screen pixels per world pixel
    pub zoom: f64,
}

impl Default for IsoCamera {
    fn default() -> Self {
        Self {
            offset: ScreenPos::default(),
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl IsoCamera {
    /// Undo zoom and camera offset
    pub fn screen_to_world(&self, screen: ScreenPos) -> ScreenPos {
        ScreenPos {
            x: screen.x / self.zoom - self.offset.x,
            y: screen.y / self.zoom - self.offset.y,
        }
    }

    /// Map a world point back to screen pixels
    pub fn world_to_screen(&self, world: ScreenPos) -> ScreenPos {
        ScreenPos {
            x: (world.x + self.offset.x) * self.zoom,
            y: (world.y + self.offset.y) * self.zoom,
        }
    }

    /// Find the tile under a screen pixel on the given layer.
    ///
    /// The layer's vertical offset is added back before inverting the
    /// isometric transform, so the pick follows the raised layer surface.
    /// Exact tile boundaries belong to the lower tile.
    pub fn screen_to_grid(&self, screen: ScreenPos, active_layer: usize) -> Option<TilePos> {
        let world = self.screen_to_world(screen);
        let world_y = world.y + active_layer as f64 * LAYER_HEIGHT_PX as f64;
        let gx = (world_y / ISO_HALF_H + world.x / ISO_HALF_W) / 2.0;
        let gy = (world_y / ISO_HALF_H - world.x / ISO_HALF_W) / 2.0;
        if !gx.is_finite() || !gy.is_finite() {
            return None;
        }
        let tile_x = snap_to_boundary(gx).floor();
        let tile_y = snap_to_boundary(gy).floor();
        if tile_x < 0.0
            || tile_y < 0.0
            || tile_x >= GRID_WIDTH as f64
            || tile_y >= GRID_HEIGHT as f64
        {
            return None;
        }
        Some(TilePos::new(tile_x as u32, tile_y as u32))
    }

    /// Zoom toward `target`, keeping the world point under `pivot` fixed.
    ///
    /// Returns false when the snapped zoom equals the current zoom.
    pub fn set_zoom(&mut self, target: f64, pivot: ScreenPos) -> bool {
        let normalized = snap_zoom(target);
        if (normalized - self.zoom).abs() < ZOOM_EPSILON {
            return false;
        }
        let world_before = self.screen_to_world(pivot);
        self.zoom = normalized;
        self.offset.x = pivot.x / self.zoom - world_before.x;
        self.offset.y = pivot.y / self.zoom - world_before.y;
        true
    }

    /// Zoom by a whole number of steps around `pivot`
    pub fn zoom_by_steps(&mut self, steps: i32, pivot: ScreenPos) -> bool {
        self.set_zoom(self.zoom + steps as f64 * ZOOM_STEP, pivot)
    }

    /// Zoom as a percentage of the default, clamped to 100..=300 for display
    pub fn zoom_label_percent(&self) -> u32 {
        let pct = ((self.zoom / DEFAULT_ZOOM) * 100.0).round();
        pct.clamp(100.0, 300.0) as u32
    }

    /// Place the center of the grid at the center of the viewport
    pub fn center_on_grid(&mut self, viewport: Viewport) {
        let center = grid_to_screen(
            (GRID_WIDTH as f64 - 1.0) / 2.0,
            (GRID_HEIGHT as f64 - 1.0) / 2.0,
        );
        self.offset.x = viewport.width / (2.0 * self.zoom) - center.x;
        self.offset.y = viewport.height / (2.0 * self.zoom) - center.y;
    }
}
