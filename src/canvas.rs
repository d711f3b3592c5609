//! The abstract 2D drawing surface (spec §1, §6): `fill`, `stroke`
//! (via `draw_line`), `polyline`/`polygon` (via `draw_polygon`), and
//! `text`. The concrete drawing library is an external collaborator per
//! spec.md — `tilecore` defines the trait and ships exactly one concrete
//! implementation on top of the teacher's own `tiny-skia` + `fontdue`
//! stack, the same way the teacher ships `RasterTileRenderer` and
//! `VectorTileRenderer` as the two implementations of its `TileRenderer`
//! trait (`src/map/tile_renderer.rs`).

use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

use crate::coordinate::Coordinate;

/// Primitives a renderer needs from a drawing surface.
pub trait Canvas {
  fn fill(&mut self, color: Color);
  fn draw_line(&mut self, points: &[Coordinate], color: Color, width: f32, dashed: bool);
  fn draw_polygon(&mut self, points: &[Coordinate], fill: Color);
  fn draw_text(&mut self, at: Coordinate, text: &str, color: Color, font_size: f32);
}

/// A `tiny-skia`-backed RGBA canvas, the crate's one concrete `Canvas`.
///
/// `font` is optional: a caller rendering a scene with no
/// `PopulatedPlace` labels (or a test exercising only lines/polygons) has
/// no need to supply one, and `draw_text` is a silent no-op without it.
pub struct TinySkiaCanvas {
  pixmap: Pixmap,
  font: Option<fontdue::Font>,
}

impl TinySkiaCanvas {
  /// # Panics
  /// Panics if `width` or `height` is zero, matching `tiny_skia::Pixmap`'s
  /// own constructor contract.
  #[must_use]
  pub fn new(width: u32, height: u32, font: Option<fontdue::Font>) -> Self {
    let pixmap = Pixmap::new(width, height).expect("canvas dimensions must be non-zero");
    Self { pixmap, font }
  }

  #[must_use]
  pub fn into_pixmap(self) -> Pixmap {
    self.pixmap
  }

  #[must_use]
  pub fn pixmap(&self) -> &Pixmap {
    &self.pixmap
  }

  fn path_for(points: &[Coordinate], closed: bool) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    let first = points.first()?;
    builder.move_to(first.x, first.y);
    for p in &points[1..] {
      builder.line_to(p.x, p.y);
    }
    if closed {
      builder.close();
    }
    builder.finish()
  }
}

impl Canvas for TinySkiaCanvas {
  fn fill(&mut self, color: Color) {
    self.pixmap.fill(color);
  }

  fn draw_line(&mut self, points: &[Coordinate], color: Color, width: f32, dashed: bool) {
    let Some(path) = Self::path_for(points, false) else {
      return;
    };
    let mut stroke = Stroke {
      width,
      ..Stroke::default()
    };
    if dashed {
      stroke.dash = StrokeDash::new(vec![width * 3.0, width * 2.0], 0.0);
    }
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    self
      .pixmap
      .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
  }

  fn draw_polygon(&mut self, points: &[Coordinate], fill: Color) {
    let Some(path) = Self::path_for(points, true) else {
      return;
    };
    let mut paint = Paint::default();
    paint.set_color(fill);
    paint.anti_alias = true;
    self
      .pixmap
      .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
  }

  // Adapted from the teacher's `render_text` (manual glyph blit via
  // `fontdue`, no anti-aliased typography per spec §1's non-goals).
  #[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
  )]
  fn draw_text(&mut self, at: Coordinate, text: &str, color: Color, font_size: f32) {
    let Some(font) = self.font.as_ref() else {
      log::warn!("draw_text called on a TinySkiaCanvas with no font, skipping label {text:?}");
      return;
    };
    let (ref_metrics, _) = font.rasterize('A', font_size);
    let baseline_offset = ref_metrics.height as f32 + ref_metrics.ymin as f32;
    let mut cursor_x = at.x;
    let width = self.pixmap.width() as i32;
    let height = self.pixmap.height() as i32;

    for ch in text.chars() {
      let (metrics, bitmap) = font.rasterize(ch, font_size);
      if bitmap.is_empty() {
        cursor_x += metrics.advance_width;
        continue;
      }

      let glyph_x = (cursor_x + metrics.xmin as f32).round() as i32;
      let glyph_y = (at.y + baseline_offset - metrics.height as f32 - metrics.ymin as f32).round() as i32;

      for (i, &alpha) in bitmap.iter().enumerate() {
        if alpha == 0 {
          continue;
        }
        let px = glyph_x + (i % metrics.width) as i32;
        let py = glyph_y + (i / metrics.width) as i32;
        if px < 0 || py < 0 || px >= width || py >= height {
          continue;
        }
        let idx = (py as u32 * self.pixmap.width() + px as u32) as usize * 4;
        if let Some(pixel) = self.pixmap.data_mut().get_mut(idx..idx + 4) {
          let a = f32::from(alpha) / 255.0;
          let sr = (color.red() * 255.0) as u8;
          let sg = (color.green() * 255.0) as u8;
          let sb = (color.blue() * 255.0) as u8;
          pixel[0] = ((1.0 - a) * f32::from(pixel[0]) + a * f32::from(sr)) as u8;
          pixel[1] = ((1.0 - a) * f32::from(pixel[1]) + a * f32::from(sg)) as u8;
          pixel[2] = ((1.0 - a) * f32::from(pixel[2]) + a * f32::from(sb)) as u8;
          pixel[3] = 255;
        }
      }

      cursor_x += metrics.advance_width;
    }
  }
}

/// Test-only canvas recording every call instead of rasterizing, used to
/// assert draw ordering (spec §8 property 5) without depending on
/// `tiny-skia` pixel output.
#[derive(Default)]
pub struct RecordingCanvas {
  pub fill_calls: Vec<Color>,
  pub line_calls: Vec<(Vec<Coordinate>, Color, f32, bool)>,
  pub polygon_calls: Vec<(Vec<Coordinate>, Color)>,
  pub text_calls: Vec<(String, Coordinate, Color, f32)>,
}

impl Canvas for RecordingCanvas {
  fn fill(&mut self, color: Color) {
    self.fill_calls.push(color);
  }

  fn draw_line(&mut self, points: &[Coordinate], color: Color, width: f32, dashed: bool) {
    self.line_calls.push((points.to_vec(), color, width, dashed));
  }

  fn draw_polygon(&mut self, points: &[Coordinate], fill: Color) {
    self.polygon_calls.push((points.to_vec(), fill));
  }

  fn draw_text(&mut self, at: Coordinate, text: &str, color: Color, font_size: f32) {
    self.text_calls.push((text.to_string(), at, color, font_size));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn recording_canvas_captures_calls_in_order() {
    let mut canvas = RecordingCanvas::default();
    canvas.fill(Color::WHITE);
    canvas.draw_polygon(&[Coordinate::new(0., 0.), Coordinate::new(1., 1.)], Color::BLACK);
    canvas.draw_line(&[Coordinate::new(0., 0.), Coordinate::new(1., 0.)], Color::BLACK, 1.0, false);
    assert_eq!(canvas.fill_calls.len(), 1);
    assert_eq!(canvas.polygon_calls.len(), 1);
    assert_eq!(canvas.line_calls.len(), 1);
  }
}
