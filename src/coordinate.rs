//! Planar coordinates and the two bounding-box types (spec §3).

/// A planar `(x, y)` pair of 32-bit floats. Immutable; the coordinate
/// system is whatever the source file used, downstream code treats it as
/// flat.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
  pub x: f32,
  pub y: f32,
}

impl Coordinate {
  #[must_use]
  pub const fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }
}

/// Geographic query box, `(min_lat, min_lon, max_lat, max_lon)`.
/// Invariant: `min_lat <= max_lat` and `min_lon <= max_lon`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeographicBoundingBox {
  pub min_lat: f64,
  pub min_lon: f64,
  pub max_lat: f64,
  pub max_lon: f64,
}

impl GeographicBoundingBox {
  #[must_use]
  pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
    debug_assert!(min_lat <= max_lat);
    debug_assert!(min_lon <= max_lon);
    Self {
      min_lat,
      min_lon,
      max_lat,
      max_lon,
    }
  }

  /// Inclusive on both axes.
  #[must_use]
  pub fn contains(&self, lat: f64, lon: f64) -> bool {
    lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.min_lat > self.max_lat || self.min_lon > self.max_lon
  }
}

/// Screen-space bounding box, grown monotonically as shapes are
/// tessellated. Starts at infinities of the right sign so that the first
/// `add` always wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBoundingBox {
  pub min_x: f32,
  pub max_x: f32,
  pub min_y: f32,
  pub max_y: f32,
}

impl Default for ScreenBoundingBox {
  fn default() -> Self {
    Self::new()
  }
}

impl ScreenBoundingBox {
  #[must_use]
  pub fn new() -> Self {
    Self {
      min_x: f32::INFINITY,
      max_x: f32::NEG_INFINITY,
      min_y: f32::INFINITY,
      max_y: f32::NEG_INFINITY,
    }
  }

  pub fn add(&mut self, coord: Coordinate) {
    self.min_x = self.min_x.min(coord.x);
    self.max_x = self.max_x.max(coord.x);
    self.min_y = self.min_y.min(coord.y);
    self.max_y = self.max_y.max(coord.y);
  }

  #[must_use]
  pub fn width(&self) -> f32 {
    self.max_x - self.min_x
  }

  #[must_use]
  pub fn height(&self) -> f32 {
    self.max_y - self.min_y
  }

  /// Non-positive width or height (empty scene, spec §4.F.2).
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.width() <= 0. || self.height() <= 0.
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn geographic_bbox_contains_is_inclusive() {
    let bbox = GeographicBoundingBox::new(10.0, 10.0, 20.0, 20.0);
    assert!(bbox.contains(10.0, 10.0));
    assert!(bbox.contains(20.0, 20.0));
    assert!(bbox.contains(15.0, 15.0));
    assert!(!bbox.contains(9.9, 15.0));
    assert!(!bbox.contains(15.0, 20.1));
  }

  #[test]
  fn screen_bbox_accumulates_monotonically() {
    let mut bbox = ScreenBoundingBox::new();
    for c in [Coordinate::new(0., 0.), Coordinate::new(10., 0.)] {
      bbox.add(c);
    }
    for c in [Coordinate::new(5., 5.), Coordinate::new(5., 15.)] {
      bbox.add(c);
    }
    assert_eq!(bbox.min_x, 0.);
    assert_eq!(bbox.max_x, 10.);
    assert_eq!(bbox.min_y, 0.);
    assert_eq!(bbox.max_y, 15.);
  }

  #[test]
  fn empty_screen_bbox_has_non_positive_extent() {
    let bbox = ScreenBoundingBox::new();
    assert!(bbox.is_empty());
  }

  #[test]
  fn single_point_screen_bbox_is_empty() {
    let mut bbox = ScreenBoundingBox::new();
    bbox.add(Coordinate::new(3., 3.));
    assert!(bbox.is_empty());
  }
}
