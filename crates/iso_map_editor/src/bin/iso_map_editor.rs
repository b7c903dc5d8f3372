//! Standalone isometric map editor binary
//!
//! Run with: iso_map_editor
//! The spritesheet is read from `assets/spritesheet.png` unless the
//! preferences file names another one.

use bevy::asset::{AssetPlugin, UnapprovedPathMode};
use bevy::image::{ImageFilterMode, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::window::WindowResolution;
use iso_map_editor::IsoEditorPlugin;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Isometric Map Editor".to_string(),
                        resolution: WindowResolution::new(1280, 800)
                            .with_scale_factor_override(1.0),
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin {
                    // Nearest sampling keeps pixel-art tiles crisp when zoomed
                    default_sampler: ImageSamplerDescriptor {
                        mag_filter: ImageFilterMode::Nearest,
                        min_filter: ImageFilterMode::Nearest,
                        mipmap_filter: ImageFilterMode::Nearest,
                        ..default()
                    },
                })
                .set(AssetPlugin {
                    // Spritesheets may live anywhere on disk
                    unapproved_path_mode: UnapprovedPathMode::Allow,
                    ..default()
                }),
        )
        .add_plugins(IsoEditorPlugin::default())
        .run();
}
