//! Fixed style table for shapes (spec §4.E: "exact colors and widths are
//! style parameters; the implementer fixes a table at construction").
//!
//! Grounded on `src/map/tile_renderer/vector/styling.rs` in the teacher
//! crate, minus its global `RwLock` + JSON5 hot-reload machinery — that
//! belongs to an interactive application, not a rendering library.

use serde::{Deserialize, Serialize};

/// RGB color, serialized as a `#RRGGBB` hex string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
  #[must_use]
  pub fn to_tiny_skia(self) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(self.0, self.1, self.2, 255)
  }
}

impl Serialize for Rgb {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2))
  }
}

impl<'de> Deserialize<'de> for Rgb {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    let s = s.trim_start_matches('#');
    if s.len() != 6 {
      return Err(serde::de::Error::custom(format!("invalid hex color: {s}")));
    }
    let byte = |range| u8::from_str_radix(&s[range], 16).map_err(serde::de::Error::custom);
    Ok(Self(byte(0..2)?, byte(2..4)?, byte(4..6)?))
  }
}

/// Stroke styling for one road class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StrokeStyle {
  pub color: Rgb,
  pub width: f32,
  pub dashed: bool,
}

/// Fixed table of z-indices, fill/stroke colors, and label font sizes,
/// keyed by shape variant (spec §4.E table).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
  pub background: Rgb,

  pub plain_fill: Rgb,
  pub forest_fill: Rgb,
  pub mountains_fill: Rgb,
  pub desert_fill: Rgb,
  pub lakes_fill: Rgb,
  pub national_park_fill: Rgb,
  pub buildings_fill: Rgb,
  pub civilian_fill: Rgb,

  pub waterway_line: StrokeStyle,
  pub road: StrokeStyle,
  pub highway: StrokeStyle,
  pub railway: StrokeStyle,
  pub border: StrokeStyle,

  pub place_label_color: Rgb,
  pub place_label_font_size: f32,
}

impl Default for StyleConfig {
  fn default() -> Self {
    Self {
      background: Rgb(255, 255, 255),

      plain_fill: Rgb(214, 230, 181),
      forest_fill: Rgb(163, 203, 142),
      mountains_fill: Rgb(176, 168, 160),
      desert_fill: Rgb(237, 224, 176),
      lakes_fill: Rgb(158, 202, 230),
      national_park_fill: Rgb(185, 220, 170),
      buildings_fill: Rgb(209, 199, 190),
      civilian_fill: Rgb(224, 224, 216),

      waterway_line: StrokeStyle {
        color: Rgb(120, 170, 210),
        width: 1.5,
        dashed: false,
      },
      road: StrokeStyle {
        color: Rgb(255, 255, 255),
        width: 2.0,
        dashed: false,
      },
      highway: StrokeStyle {
        color: Rgb(250, 160, 90),
        width: 4.0,
        dashed: false,
      },
      railway: StrokeStyle {
        color: Rgb(90, 90, 90),
        width: 1.5,
        dashed: true,
      },
      border: StrokeStyle {
        color: Rgb(150, 60, 60),
        width: 2.5,
        dashed: true,
      },

      place_label_color: Rgb(40, 40, 40),
      place_label_font_size: 14.0,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_style_config_has_distinct_fills() {
    let cfg = StyleConfig::default();
    assert_ne!(cfg.forest_fill, cfg.desert_fill);
    assert_ne!(cfg.background, cfg.buildings_fill);
  }
}
