//! Tile layers and the fixed spritesheet/grid geometry

/// Edge length of one spritesheet cell, in pixels
pub const TILE_SIZE: u32 = 32;
/// Spritesheet columns
pub const SHEET_COLUMNS: u32 = 11;
/// Spritesheet rows
pub const SHEET_ROWS: u32 = 11;
/// Total number of slots in the spritesheet
pub const TOTAL_SLOTS: u32 = SHEET_COLUMNS * SHEET_ROWS;
/// Only this prefix of the spritesheet slots holds real tiles
pub const VALID_TILE_COUNT: u32 = 115;

/// Grid width in tiles (fixed for the lifetime of a document)
pub const GRID_WIDTH: u32 = 30;
/// Grid height in tiles (fixed for the lifetime of a document)
pub const GRID_HEIGHT: u32 = 30;

/// A single cell value - None means empty, Some(idx) is a spritesheet index
pub type Tile = Option<u32>;

/// Check whether a tile index refers to a valid spritesheet slot
#[inline]
pub fn is_valid_tile(index: u32) -> bool {
    index < VALID_TILE_COUNT
}

/// A full grid of tile cells, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    tiles: Vec<Tile>,
}

impl Default for Layer {
    fn default() -> Self {
        Self::empty()
    }
}

impl Layer {
    /// Create a layer with every cell set to the empty sentinel
    pub fn empty() -> Self {
        Self {
            tiles: vec![None; (GRID_WIDTH * GRID_HEIGHT) as usize],
        }
    }

    fn index(x: u32, y: u32) -> Option<usize> {
        if x >= GRID_WIDTH || y >= GRID_HEIGHT {
            return None;
        }
        Some((y * GRID_WIDTH + x) as usize)
    }

    /// Get tile at position (None if out of bounds or empty)
    pub fn get(&self, x: u32, y: u32) -> Tile {
        Self::index(x, y)
            .and_then(|idx| self.tiles.get(idx).copied())
            .flatten()
    }

    /// Set tile at position. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, tile: Tile) {
        if let Some(cell) = Self::index(x, y).and_then(|idx| self.tiles.get_mut(idx)) {
            *cell = tile;
        }
    }

    /// Whether every cell is empty
    pub fn is_empty(&self) -> bool {
        self.tiles.iter().all(|t| t.is_none())
    }

    /// Rows of the layer, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(GRID_WIDTH as usize)
    }

    /// Layer as nested rows (the on-disk shape)
    pub fn to_rows(&self) -> Vec<Vec<Tile>> {
        self.rows().map(|row| row.to_vec()).collect()
    }
}
