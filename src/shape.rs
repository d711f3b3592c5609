//! Tagged-variant shape model (spec §4.E, §9 re-architecture note).
//!
//! The source repo's `BaseShape` + subclass inheritance is replaced with a
//! sum type: one shared header (`screen_coordinates`, `z_index`) and one
//! `draw` arm per variant. This keeps shapes cache-friendly and avoids
//! vtable indirection on the render hot path, matching the teacher's own
//! preference for small structs behind one shared trait boundary
//! (`TileRenderer` in `tile_renderer.rs`) over deep inheritance.

use crate::canvas::Canvas;
use crate::coordinate::Coordinate;
use crate::style::StyleConfig;

/// Subtype of a filled-polygon geo-feature. Not every `EnvironmentCategory`
/// gets its own top-level `Shape` variant — `Civilian` and `Buildings`
/// share this family with `Plain`/`Forest`/etc. (spec §4.E lists
/// "`GeoFeature(Plain/Forest/Mountains/Desert/Lakes/NationalPark/Residential)`";
/// `Buildings` is folded in here too since the table has no separate row
/// for it — see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoFeatureKind {
  Plain,
  Forest,
  NationalPark,
  Residential,
  Buildings,
  Mountains,
  Desert,
  Lakes,
}

impl GeoFeatureKind {
  /// Fixed z-index within the spec's 10–35 band, lowest first.
  #[must_use]
  pub const fn z_index(self) -> i32 {
    match self {
      Self::Plain => 10,
      Self::Forest => 14,
      Self::NationalPark => 18,
      Self::Residential => 22,
      Self::Buildings => 26,
      Self::Mountains => 29,
      Self::Desert => 32,
      Self::Lakes => 35,
    }
  }

  fn fill(self, style: &StyleConfig) -> tiny_skia::Color {
    match self {
      Self::Plain => style.plain_fill,
      Self::Forest => style.forest_fill,
      Self::NationalPark => style.national_park_fill,
      Self::Residential => style.civilian_fill,
      Self::Buildings => style.buildings_fill,
      Self::Mountains => style.mountains_fill,
      Self::Desert => style.desert_fill,
      Self::Lakes => style.lakes_fill,
    }
    .to_tiny_skia()
  }
}

/// Fields shared by every shape variant.
#[derive(Debug, Clone)]
pub struct ShapeHeader {
  pub screen_coordinates: Vec<Coordinate>,
  pub z_index: i32,
}

/// One drawable unit produced by `tessellate`. Lives only within one
/// render call; never retained past the callback that produced it.
#[derive(Debug, Clone)]
pub enum Shape {
  GeoFeature {
    header: ShapeHeader,
    kind: GeoFeatureKind,
  },
  Waterway {
    header: ShapeHeader,
    is_polygon: bool,
  },
  Road {
    header: ShapeHeader,
  },
  Highway {
    header: ShapeHeader,
  },
  Railway {
    header: ShapeHeader,
  },
  Border {
    header: ShapeHeader,
  },
  PopulatedPlace {
    header: ShapeHeader,
    label: String,
  },
}

impl Shape {
  #[must_use]
  pub fn z_index(&self) -> i32 {
    self.header().z_index
  }

  #[must_use]
  pub fn header(&self) -> &ShapeHeader {
    match self {
      Self::GeoFeature { header, .. }
      | Self::Waterway { header, .. }
      | Self::Road { header }
      | Self::Highway { header }
      | Self::Railway { header }
      | Self::Border { header }
      | Self::PopulatedPlace { header, .. } => header,
    }
  }

  fn header_mut(&mut self) -> &mut ShapeHeader {
    match self {
      Self::GeoFeature { header, .. }
      | Self::Waterway { header, .. }
      | Self::Road { header }
      | Self::Highway { header }
      | Self::Railway { header }
      | Self::Border { header }
      | Self::PopulatedPlace { header, .. } => header,
    }
  }

  /// Maps each `(x, y)` to
  /// `((x - origin_x) * scale, canvas_height - (y - origin_y) * scale)`.
  /// Y is inverted because screen Y grows downward (spec §4.E).
  pub fn translate_and_scale(
    &mut self,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
    canvas_height: f32,
  ) {
    for coord in &mut self.header_mut().screen_coordinates {
      coord.x = (coord.x - origin_x) * scale;
      coord.y = canvas_height - (coord.y - origin_y) * scale;
    }
  }

  /// Issues the drawing primitives appropriate for this variant. Degenerate
  /// shapes are never reached here — the renderer skips them before
  /// calling `draw` (spec §4.F): fewer than 2 coordinates for a line or
  /// polygon, or no anchor point at all for a label.
  pub fn draw(&self, canvas: &mut dyn Canvas, style: &StyleConfig) {
    let points = &self.header().screen_coordinates;
    match self {
      Self::GeoFeature { kind, .. } => canvas.draw_polygon(points, kind.fill(style)),
      Self::Waterway { is_polygon, .. } => {
        if *is_polygon {
          canvas.draw_polygon(points, style.lakes_fill.to_tiny_skia());
        } else {
          canvas.draw_line(
            points,
            style.waterway_line.color.to_tiny_skia(),
            style.waterway_line.width,
            style.waterway_line.dashed,
          );
        }
      }
      Self::Road { .. } => canvas.draw_line(
        points,
        style.road.color.to_tiny_skia(),
        style.road.width,
        style.road.dashed,
      ),
      Self::Highway { .. } => canvas.draw_line(
        points,
        style.highway.color.to_tiny_skia(),
        style.highway.width,
        style.highway.dashed,
      ),
      Self::Railway { .. } => canvas.draw_line(
        points,
        style.railway.color.to_tiny_skia(),
        style.railway.width,
        style.railway.dashed,
      ),
      Self::Border { .. } => canvas.draw_line(
        points,
        style.border.color.to_tiny_skia(),
        style.border.width,
        style.border.dashed,
      ),
      Self::PopulatedPlace { label, .. } => {
        if let Some(point) = points.first() {
          canvas.draw_text(
            *point,
            label,
            style.place_label_color.to_tiny_skia(),
            style.place_label_font_size,
          );
        }
      }
    }
  }
}
