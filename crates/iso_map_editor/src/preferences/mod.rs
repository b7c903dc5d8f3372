//! User preferences persisted between editor sessions

mod file;

pub use file::PreferencesError;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default spritesheet, relative to the assets directory
pub const DEFAULT_SPRITESHEET: &str = "spritesheet.png";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPreferences {
    /// Spritesheet to load on startup. Relative paths resolve against the assets directory.
    pub spritesheet_path: String,
    pub show_grid: bool,
    /// Directory last used for JSON/PNG export or import
    pub last_export_dir: Option<PathBuf>,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            spritesheet_path: DEFAULT_SPRITESHEET.to_string(),
            show_grid: true,
            last_export_dir: None,
        }
    }
}

impl EditorPreferences {
    /// Remember the directory of a file the user just picked
    pub fn remember_dir(&mut self, file: &std::path::Path) -> bool {
        let Some(parent) = file.parent() else {
            return false;
        };
        if self.last_export_dir.as_deref() == Some(parent) {
            return false;
        }
        self.last_export_dir = Some(parent.to_path_buf());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let prefs: EditorPreferences = serde_json::from_str(r#"{"show_grid": false}"#).unwrap();
        assert!(!prefs.show_grid);
        assert_eq!(prefs.spritesheet_path, DEFAULT_SPRITESHEET);
        assert_eq!(prefs.last_export_dir, None);
    }

    #[test]
    fn test_remember_dir() {
        let mut prefs = EditorPreferences::default();
        assert!(prefs.remember_dir(std::path::Path::new("/home/me/maps/a.json")));
        assert_eq!(
            prefs.last_export_dir.as_deref(),
            Some(std::path::Path::new("/home/me/maps"))
        );
        assert!(!prefs.remember_dir(std::path::Path::new("/home/me/maps/b.png")));
    }
}
