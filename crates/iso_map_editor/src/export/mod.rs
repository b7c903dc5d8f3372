//! JSON and PNG export
//!
//! PNG export rasterizes a [`FramePlan`] on the CPU with the `image` crate, so
//! the written file matches the live viewport minus grid, hover and pointer.

use image::{Rgba, RgbaImage};
use iso_map_core::{sheet_slot, EditorSession, FrameItem, FrameOptions, FramePlan, TILE_SIZE};
use std::path::Path;

/// Suggested file name for JSON export
pub const JSON_EXPORT_NAME: &str = "isometric-map.json";
/// Suggested file name for PNG export
pub const PNG_EXPORT_NAME: &str = "isometric-map.png";

#[derive(Debug)]
pub enum ExportError {
    Io(String),
    Image(String),
    Serialize(String),
    NoSpritesheet,
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "IO error: {}", e),
            ExportError::Image(e) => write!(f, "Image error: {}", e),
            ExportError::Serialize(e) => write!(f, "Serialize error: {}", e),
            ExportError::NoSpritesheet => write!(f, "Spritesheet is not available"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Write the document as pretty-printed JSON
pub fn write_json(session: &EditorSession, path: &Path) -> Result<(), ExportError> {
    let json = session
        .export_json()
        .map_err(|e| ExportError::Serialize(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| ExportError::Io(e.to_string()))
}

/// Load the spritesheet pixels used for rasterizing
pub fn load_spritesheet(path: &Path) -> Result<RgbaImage, ExportError> {
    if !path.exists() {
        return Err(ExportError::NoSpritesheet);
    }
    let image = image::open(path).map_err(|e| ExportError::Image(e.to_string()))?;
    Ok(image.to_rgba8())
}

/// Render the current view without overlays and save it as PNG
pub fn write_png(
    session: &EditorSession,
    spritesheet: &Path,
    path: &Path,
) -> Result<(), ExportError> {
    let sheet = load_spritesheet(spritesheet)?;
    let plan = session.frame_plan(FrameOptions::export());
    let image = rasterize(&plan, &sheet);
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| ExportError::Image(e.to_string()))
}

/// Draw a frame plan into a viewport-sized image.
///
/// Only background and tiles are drawn; overlay items are ignored. Tiles are
/// scaled nearest-neighbor and alpha blended over what is already there.
pub fn rasterize(plan: &FramePlan, sheet: &RgbaImage) -> RgbaImage {
    let width = plan.viewport.width.round().max(1.0) as u32;
    let height = plan.viewport.height.round().max(1.0) as u32;
    let [r, g, b] = plan.background.rgb();
    let mut target = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));

    let size = plan.tile_screen_size().round().max(1.0) as i64;
    for item in plan.tiles() {
        let FrameItem::Tile {
            index,
            top_left,
            alpha,
            ..
        } = item
        else {
            continue;
        };
        let origin = plan.blit_to_screen(*top_left);
        blit_tile(
            &mut target,
            sheet,
            *index,
            origin.x.round() as i64,
            origin.y.round() as i64,
            size,
            *alpha,
        );
    }
    target
}

fn blit_tile(
    target: &mut RgbaImage,
    sheet: &RgbaImage,
    index: u32,
    dx: i64,
    dy: i64,
    size: i64,
    alpha: f32,
) {
    let (sx, sy) = sheet_slot(index);
    let tile = TILE_SIZE as i64;
    for oy in 0..size {
        let ty = dy + oy;
        if ty < 0 || ty >= target.height() as i64 {
            continue;
        }
        let src_y = sy as i64 + oy * tile / size;
        for ox in 0..size {
            let tx = dx + ox;
            if tx < 0 || tx >= target.width() as i64 {
                continue;
            }
            let src_x = sx as i64 + ox * tile / size;
            let Some(src) = sheet.get_pixel_checked(src_x as u32, src_y as u32) else {
                continue;
            };
            let dst = target.get_pixel_mut(tx as u32, ty as u32);
            *dst = blend(*dst, *src, alpha);
        }
    }
}

/// Source-over blend onto an opaque destination
fn blend(dst: Rgba<u8>, src: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let a = (src[3] as f32 / 255.0) * alpha.clamp(0.0, 1.0);
    if a <= 0.0 {
        return dst;
    }
    let mix = |d: u8, s: u8| ((s as f32) * a + (d as f32) * (1.0 - a)).round() as u8;
    Rgba([mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2]), 255])
}
