//! The document being edited: an ordered stack of layers

use crate::color::HexColor;
use crate::layer::{Layer, Tile, GRID_HEIGHT, GRID_WIDTH};

/// Maximum number of layers in a document
pub const MAX_LAYERS: usize = 24;

/// A layered isometric map
///
/// Layer order encodes vertical stacking: layer `i` is drawn
/// `i * LAYER_HEIGHT_PX` pixels above layer 0. There is always at least one
/// layer and never more than [`MAX_LAYERS`].
#[derive(Debug, Clone, PartialEq)]
pub struct MapDocument {
    layers: Vec<Layer>,
    active_layer: usize,
    pub background: HexColor,
}

impl Default for MapDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MapDocument {
    /// Create a document with a single empty layer
    pub fn new() -> Self {
        Self {
            layers: vec![Layer::empty()],
            active_layer: 0,
            background: HexColor::default(),
        }
    }

    /// Build a document from already-shaped layers.
    ///
    /// An empty layer list is replaced by a single empty layer, extra layers
    /// beyond [`MAX_LAYERS`] are dropped, and the active index is clamped.
    pub fn from_layers(mut layers: Vec<Layer>, active_layer: usize, background: HexColor) -> Self {
        if layers.is_empty() {
            layers.push(Layer::empty());
        }
        layers.truncate(MAX_LAYERS);
        let active_layer = active_layer.min(layers.len() - 1);
        Self {
            layers,
            active_layer,
            background,
        }
    }

    pub fn width(&self) -> u32 {
        GRID_WIDTH
    }

    pub fn height(&self) -> u32 {
        GRID_HEIGHT
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn active_layer(&self) -> usize {
        self.active_layer
    }

    /// Get tile at position for a specific layer
    pub fn get_tile(&self, layer_index: usize, x: u32, y: u32) -> Tile {
        self.layers
            .get(layer_index)
            .and_then(|layer| layer.get(x, y))
    }

    /// Set tile at position for a specific layer. Out-of-range writes are ignored.
    pub fn set_tile(&mut self, layer_index: usize, x: u32, y: u32, tile: Tile) {
        if let Some(layer) = self.layers.get_mut(layer_index) {
            layer.set(x, y, tile);
        }
    }

    /// Whether a cell address is inside the layer stack and grid
    pub fn contains(&self, layer_index: usize, x: u32, y: u32) -> bool {
        layer_index < self.layers.len() && x < GRID_WIDTH && y < GRID_HEIGHT
    }

    /// Append an empty layer and make it active. Refused at [`MAX_LAYERS`].
    pub fn add_layer(&mut self) -> bool {
        if self.layers.len() >= MAX_LAYERS {
            return false;
        }
        self.layers.push(Layer::empty());
        self.active_layer = self.layers.len() - 1;
        true
    }

    /// Remove a layer by index. Refused when it is the last remaining layer.
    pub fn remove_layer(&mut self, index: usize) -> bool {
        if self.layers.len() <= 1 || index >= self.layers.len() {
            return false;
        }
        self.layers.remove(index);
        self.active_layer = self.active_layer.min(self.layers.len() - 1);
        true
    }

    /// Set the active layer, clamped into range
    pub fn set_active_layer(&mut self, index: usize) {
        self.active_layer = index.min(self.layers.len() - 1);
    }

    /// Move the active layer down one step (toward index 0)
    pub fn select_previous_layer(&mut self) {
        self.active_layer = self.active_layer.saturating_sub(1);
    }

    /// Move the active layer up one step
    pub fn select_next_layer(&mut self) {
        self.set_active_layer(self.active_layer + 1);
    }

    pub fn can_add_layer(&self) -> bool {
        self.layers.len() < MAX_LAYERS
    }

    pub fn can_remove_layer(&self) -> bool {
        self.layers.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document() {
        let doc = MapDocument::new();
        assert_eq!(doc.layer_count(), 1);
        assert_eq!(doc.active_layer(), 0);
        assert_eq!(doc.background.as_str(), "#17171e");
        assert!(doc.layers()[0].is_empty());
    }

    #[test]
    fn test_tile_operations() {
        let mut doc = MapDocument::new();
        assert_eq!(doc.get_tile(0, 5, 5), None);

        doc.set_tile(0, 5, 5, Some(42));
        assert_eq!(doc.get_tile(0, 5, 5), Some(42));

        doc.set_tile(0, 5, 5, None);
        assert_eq!(doc.get_tile(0, 5, 5), None);
    }

    #[test]
    fn test_out_of_range_writes_are_silent() {
        let mut doc = MapDocument::new();
        doc.set_tile(3, 0, 0, Some(1));
        doc.set_tile(0, 99, 0, Some(1));
        assert_eq!(doc.get_tile(3, 0, 0), None);
        assert!(doc.layers()[0].is_empty());
    }

    #[test]
    fn test_add_layer_activates_and_caps() {
        let mut doc = MapDocument::new();
        assert!(doc.add_layer());
        assert_eq!(doc.layer_count(), 2);
        assert_eq!(doc.active_layer(), 1);

        while doc.can_add_layer() {
            doc.add_layer();
        }
        assert_eq!(doc.layer_count(), MAX_LAYERS);
        assert!(!doc.add_layer());
        assert_eq!(doc.layer_count(), MAX_LAYERS);
    }

    #[test]
    fn test_remove_last_layer_refused() {
        let mut doc = MapDocument::new();
        assert!(!doc.remove_layer(0));
        assert_eq!(doc.layer_count(), 1);
    }

    #[test]
    fn test_remove_layer_reclamps_active() {
        let mut doc = MapDocument::new();
        doc.add_layer();
        doc.add_layer();
        assert_eq!(doc.active_layer(), 2);

        assert!(doc.remove_layer(2));
        assert_eq!(doc.layer_count(), 2);
        assert_eq!(doc.active_layer(), 1);

        doc.set_active_layer(0);
        assert!(doc.remove_layer(1));
        assert_eq!(doc.active_layer(), 0);
    }

    #[test]
    fn test_layer_navigation_clamps() {
        let mut doc = MapDocument::new();
        doc.add_layer();
        doc.select_next_layer();
        assert_eq!(doc.active_layer(), 1);
        doc.select_previous_layer();
        doc.select_previous_layer();
        assert_eq!(doc.active_layer(), 0);
        doc.set_active_layer(50);
        assert_eq!(doc.active_layer(), 1);
    }

    #[test]
    fn test_from_layers_clamps() {
        let doc = MapDocument::from_layers(Vec::new(), 7, HexColor::default());
        assert_eq!(doc.layer_count(), 1);
        assert_eq!(doc.active_layer(), 0);

        let doc = MapDocument::from_layers(vec![Layer::empty(); 3], 7, HexColor::default());
        assert_eq!(doc.active_layer(), 2);
    }
}
