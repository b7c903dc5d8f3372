//! `#RRGGBB` background colors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default canvas background
pub const DEFAULT_CANVAS_BG: &str = "#17171e";

/// A color in `#RRGGBB` form. Construction validates the format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parse a `#RRGGBB` string (case-insensitive hex digits)
    pub fn parse(value: &str) -> Option<Self> {
        if Self::is_valid(value) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    /// Whether `value` is exactly `#` followed by six hex digits
    pub fn is_valid(value: &str) -> bool {
        let Some(hex) = value.strip_prefix('#') else {
            return false;
        };
        hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Red, green and blue components
    pub fn rgb(&self) -> [u8; 3] {
        let hex = &self.0[1..];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        [channel(0), channel(2), channel(4)]
    }

    /// Build from components, lowercase
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        Self(format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]))
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self(DEFAULT_CANVAS_BG.to_string())
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(format!("invalid color '{}', expected #RRGGBB", value))
        }
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}
