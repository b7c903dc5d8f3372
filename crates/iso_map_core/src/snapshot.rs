//! Portable JSON document and its validation
//!
//! Outbound, a [`MapSnapshot`] is a direct structural copy of the document.
//! Inbound, untrusted JSON goes through [`validate`] first, which either
//! rejects it with a [`SnapshotError`] or produces a typed
//! [`ValidatedSnapshot`]. Only a validated snapshot can be turned into a
//! document, so nothing downstream has to probe loosely-typed fields.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::color::HexColor;
use crate::document::MapDocument;
use crate::layer::{is_valid_tile, Layer, Tile, GRID_HEIGHT, GRID_WIDTH};
use crate::projection::LAYER_HEIGHT_PX;

/// Current document schema version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors produced while reading a map document
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// Text was not JSON at all
    Parse(String),
    /// Top level value is not an object
    NotAnObject,
    /// `layers` is missing, not an array, or empty
    MissingLayers,
    /// `canvasBgColor` is present but not `#RRGGBB`
    InvalidColor(String),
    /// A layer is not an array or has no rows
    EmptyLayer { layer: usize },
    /// A layer's row count differs from the declared `gridHeight`
    HeightMismatch {
        layer: usize,
        expected: i64,
        found: usize,
    },
    /// The expected row width is not a positive integer
    InvalidWidth { layer: usize },
    /// A row is not an array of the expected width
    RaggedRow {
        layer: usize,
        row: usize,
        expected: i64,
    },
    /// A cell is neither null nor a valid tile index
    InvalidTile {
        layer: usize,
        row: usize,
        column: usize,
    },
    /// Encoding a document failed
    Serialize(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Parse(e) => write!(f, "Parse error: {}", e),
            SnapshotError::NotAnObject => write!(f, "Map data must be a JSON object"),
            SnapshotError::MissingLayers => write!(f, "Map data has no layers"),
            SnapshotError::InvalidColor(c) => write!(f, "Invalid background color: {}", c),
            SnapshotError::EmptyLayer { layer } => write!(f, "Layer {} has no rows", layer),
            SnapshotError::HeightMismatch {
                layer,
                expected,
                found,
            } => write!(
                f,
                "Layer {} has {} rows, expected {}",
                layer, found, expected
            ),
            SnapshotError::InvalidWidth { layer } => {
                write!(f, "Layer {} has no usable row width", layer)
            }
            SnapshotError::RaggedRow {
                layer,
                row,
                expected,
            } => write!(
                f,
                "Row {} of layer {} is not {} cells wide",
                row, layer, expected
            ),
            SnapshotError::InvalidTile { layer, row, column } => write!(
                f,
                "Invalid tile at layer {}, row {}, column {}",
                layer, row, column
            ),
            SnapshotError::Serialize(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Parse(e.to_string())
    }
}

/// Schema v1 document as written to storage and export files
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    pub version: u32,
    pub grid_width: u32,
    pub grid_height: u32,
    pub layer_height_px: u32,
    pub canvas_bg_color: HexColor,
    pub active_layer_index: usize,
    pub layers: Vec<Vec<Vec<Tile>>>,
}

impl MapSnapshot {
    /// Copy a document into its portable form
    pub fn from_document(doc: &MapDocument) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            grid_width: doc.width(),
            grid_height: doc.height(),
            layer_height_px: LAYER_HEIGHT_PX,
            canvas_bg_color: doc.background.clone(),
            active_layer_index: doc.active_layer(),
            layers: doc.layers().iter().map(Layer::to_rows).collect(),
        }
    }

    /// Compact JSON, used for local persistence
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::Serialize(e.to_string()))
    }

    /// Pretty-printed JSON, used for file export
    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Serialize(e.to_string()))
    }
}

/// A document that passed validation, in typed form
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSnapshot {
    layers: Vec<Vec<Vec<Tile>>>,
    background: Option<HexColor>,
    active_layer_index: usize,
}

impl ValidatedSnapshot {
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Declared background, if any
    pub fn background(&self) -> Option<&HexColor> {
        self.background.as_ref()
    }

    /// Declared active layer; absent, negative or fractional values read as 0
    pub fn active_layer_index(&self) -> usize {
        self.active_layer_index
    }

    /// Build a live document shaped to the current grid
    pub fn into_document(self) -> MapDocument {
        let layers = normalize_layers(&self);
        MapDocument::from_layers(
            layers,
            self.active_layer_index,
            self.background.unwrap_or_default(),
        )
    }
}

/// JSON numbers that hold a whole value, including `3.0`
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    if value.as_u64().is_some() {
        return Some(i64::MAX);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

fn validate_cell(cell: &Value) -> Option<Tile> {
    if cell.is_null() {
        return Some(None);
    }
    let index = as_integer(cell)?;
    if index < 0 {
        return None;
    }
    let index = u32::try_from(index).ok()?;
    is_valid_tile(index).then_some(Some(index))
}

/// Check an untrusted value against schema v1 and convert it.
///
/// Rules: the value is an object; `layers` is a non-empty array; a present
/// `canvasBgColor` is `#RRGGBB`; every layer is a non-empty array of rows
/// whose count matches an integer `gridHeight` when one is declared; every
/// row has exactly the expected width (integer `gridWidth` if declared, else
/// the layer's first row length, and it must be positive); every cell is null
/// or an integer tile index in range.
pub fn validate(value: &Value) -> Result<ValidatedSnapshot, SnapshotError> {
    let object = value.as_object().ok_or(SnapshotError::NotAnObject)?;

    let layers = object
        .get("layers")
        .and_then(Value::as_array)
        .filter(|layers| !layers.is_empty())
        .ok_or(SnapshotError::MissingLayers)?;

    let background = match object.get("canvasBgColor") {
        None => None,
        Some(Value::String(s)) => {
            Some(HexColor::parse(s).ok_or_else(|| SnapshotError::InvalidColor(s.clone()))?)
        }
        Some(other) => return Err(SnapshotError::InvalidColor(other.to_string())),
    };

    let declared_height = object.get("gridHeight").and_then(as_integer);
    let declared_width = object.get("gridWidth").and_then(as_integer);

    let mut typed_layers = Vec::with_capacity(layers.len());
    for (layer_index, layer) in layers.iter().enumerate() {
        let rows = layer
            .as_array()
            .filter(|rows| !rows.is_empty())
            .ok_or(SnapshotError::EmptyLayer { layer: layer_index })?;

        if let Some(expected) = declared_height {
            if rows.len() as i64 != expected {
                return Err(SnapshotError::HeightMismatch {
                    layer: layer_index,
                    expected,
                    found: rows.len(),
                });
            }
        }

        let expected_width = match declared_width {
            Some(width) => Some(width),
            None => rows[0].as_array().map(|row| row.len() as i64),
        }
        .filter(|width| *width >= 1)
        .ok_or(SnapshotError::InvalidWidth { layer: layer_index })?;

        let mut typed_rows = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let cells = row
                .as_array()
                .filter(|cells| cells.len() as i64 == expected_width)
                .ok_or(SnapshotError::RaggedRow {
                    layer: layer_index,
                    row: row_index,
                    expected: expected_width,
                })?;

            let typed_row = cells
                .iter()
                .enumerate()
                .map(|(column, cell)| {
                    validate_cell(cell).ok_or(SnapshotError::InvalidTile {
                        layer: layer_index,
                        row: row_index,
                        column,
                    })
                })
                .collect::<Result<Vec<Tile>, _>>()?;
            typed_rows.push(typed_row);
        }
        typed_layers.push(typed_rows);
    }

    let active_layer_index = object
        .get("activeLayerIndex")
        .and_then(as_integer)
        .map(|i| i.max(0) as usize)
        .unwrap_or(0);

    Ok(ValidatedSnapshot {
        layers: typed_layers,
        background,
        active_layer_index,
    })
}

/// Whether a value passes [`validate`]
pub fn is_valid(value: &Value) -> bool {
    validate(value).is_ok()
}

/// Parse JSON text and validate it
pub fn parse_json(text: &str) -> Result<ValidatedSnapshot, SnapshotError> {
    let value: Value = serde_json::from_str(text)?;
    validate(&value)
}

/// Reshape validated layers to the current grid.
///
/// The overlapping top-left rectangle is copied into fresh empty layers;
/// anything outside it is dropped and anything missing stays empty. Source
/// dimensions are taken from the first layer.
pub fn normalize_layers(snapshot: &ValidatedSnapshot) -> Vec<Layer> {
    let source_height = snapshot.layers.first().map_or(0, Vec::len);
    let source_width = snapshot
        .layers
        .first()
        .and_then(|rows| rows.first())
        .map_or(0, Vec::len);
    let copy_height = source_height.min(GRID_HEIGHT as usize);
    let copy_width = source_width.min(GRID_WIDTH as usize);

    snapshot
        .layers
        .iter()
        .map(|rows| {
            let mut layer = Layer::empty();
            for (y, row) in rows.iter().take(copy_height).enumerate() {
                for (x, tile) in row.iter().take(copy_width).enumerate() {
                    layer.set(x as u32, y as u32, *tile);
                }
            }
            layer
        })
        .collect()
}
