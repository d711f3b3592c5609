//! Layered rasterizer (spec §4.F).
//!
//! `tessellate` turns one classified feature into the matching `Shape`,
//! enqueues it by z-index, and grows the screen bounding box. `render`
//! drains the queue in ascending z-order and composites onto a canvas.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::canvas::Canvas;
use crate::classifier::EnvironmentCategory;
use crate::coordinate::ScreenBoundingBox;
use crate::feature::MapFeatureData;
use crate::shape::{GeoFeatureKind, Shape, ShapeHeader};
use crate::style::StyleConfig;

/// A queue entry pairs a shape with a monotonic insertion sequence number
/// so that `BinaryHeap` — which is not otherwise stable — breaks z-index
/// ties in insertion order (spec §5 ordering, §8 property 5).
struct QueueEntry {
  z_index: i32,
  sequence: u64,
  shape: Shape,
}

impl PartialEq for QueueEntry {
  fn eq(&self, other: &Self) -> bool {
    self.z_index == other.z_index && self.sequence == other.sequence
  }
}
impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for QueueEntry {
  fn cmp(&self, other: &Self) -> std::cmp::Ordering {
    // Reverse() around the whole heap turns BinaryHeap (a max-heap) into a
    // min-heap on z_index; within equal z_index, smaller sequence (earlier
    // insertion) must pop first, so sequence compares the same direction.
    self
      .z_index
      .cmp(&other.z_index)
      .then(self.sequence.cmp(&other.sequence))
  }
}

/// Min-heap of pending shapes, keyed by `(z_index, insertion order)`.
#[derive(Default)]
pub struct ShapeQueue {
  heap: BinaryHeap<Reverse<QueueEntry>>,
  next_sequence: u64,
}

impl ShapeQueue {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  fn push(&mut self, shape: Shape) {
    let entry = QueueEntry {
      z_index: shape.z_index(),
      sequence: self.next_sequence,
      shape,
    };
    self.next_sequence += 1;
    self.heap.push(Reverse(entry));
  }

  fn pop(&mut self) -> Option<Shape> {
    self.heap.pop().map(|Reverse(entry)| entry.shape)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.heap.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.heap.is_empty()
  }
}

fn shape_for(feature: &MapFeatureData<'_>) -> Option<Shape> {
  let header = || ShapeHeader {
    screen_coordinates: feature.coordinates.clone(),
    z_index: 0,
  };

  let with_z = |mut h: ShapeHeader, z: i32| {
    h.z_index = z;
    h
  };

  let geo_feature = |kind: GeoFeatureKind| Shape::GeoFeature {
    header: with_z(header(), kind.z_index()),
    kind,
  };

  let shape = match feature.environment {
    EnvironmentCategory::Unknown => return None,
    EnvironmentCategory::Plain => geo_feature(GeoFeatureKind::Plain),
    EnvironmentCategory::Forest => geo_feature(GeoFeatureKind::Forest),
    EnvironmentCategory::NationalPark => geo_feature(GeoFeatureKind::NationalPark),
    EnvironmentCategory::Civilian => geo_feature(GeoFeatureKind::Residential),
    EnvironmentCategory::Buildings => geo_feature(GeoFeatureKind::Buildings),
    EnvironmentCategory::Mountains => geo_feature(GeoFeatureKind::Mountains),
    EnvironmentCategory::Desert => geo_feature(GeoFeatureKind::Desert),
    EnvironmentCategory::Lakes => geo_feature(GeoFeatureKind::Lakes),
    EnvironmentCategory::Water => Shape::Waterway {
      header: with_z(header(), 40),
      is_polygon: feature.geometry_kind.is_polygon(),
    },
    EnvironmentCategory::Road => Shape::Road {
      header: with_z(header(), 50),
    },
    EnvironmentCategory::Railway => Shape::Railway {
      header: with_z(header(), 55),
    },
    EnvironmentCategory::Highway => Shape::Highway {
      header: with_z(header(), 60),
    },
    EnvironmentCategory::Border => Shape::Border {
      header: with_z(header(), 70),
    },
    EnvironmentCategory::PopulatedPlace => Shape::PopulatedPlace {
      header: with_z(header(), 90),
      label: feature.label.map(|l| l.decode()).or_else(|| feature.name.clone()).unwrap_or_default(),
    },
  };
  Some(shape)
}

/// Builds the `Shape` variant selected by `feature.environment`, enqueues
/// it by z-index, and expands `screen_bbox` to cover every one of its
/// (pre-scaled) screen coordinates. Features classified `Unknown` are
/// dropped (spec §4.F, not an error — see `ClassificationMiss` in §7).
pub fn tessellate(
  feature: &MapFeatureData<'_>,
  screen_bbox: &mut ScreenBoundingBox,
  queue: &mut ShapeQueue,
) {
  let Some(shape) = shape_for(feature) else {
    return;
  };
  for coord in &shape.header().screen_coordinates {
    screen_bbox.add(*coord);
  }
  queue.push(shape);
}

/// Drains `queue` in ascending z-order onto a `width x height` canvas,
/// scaling the scene to fit. Returns early with a background-filled
/// canvas if the scene is empty (spec §4.F.2, `EmptyScene`).
pub fn render(
  mut queue: ShapeQueue,
  screen_bbox: ScreenBoundingBox,
  canvas: &mut dyn Canvas,
  width: u32,
  height: u32,
  style: &StyleConfig,
) {
  canvas.fill(style.background.to_tiny_skia());

  if screen_bbox.is_empty() {
    log::debug!("empty scene, returning background-filled canvas");
    return;
  }

  #[allow(clippy::cast_precision_loss)]
  let scale = (width as f32 / screen_bbox.width()).min(height as f32 / screen_bbox.height());

  let mut drawn = 0usize;
  let mut skipped_degenerate = 0usize;
  while let Some(mut shape) = queue.pop() {
    // A label only needs the one point it's anchored to; every other
    // variant draws a line or polygon and needs at least two.
    let min_coordinates = if matches!(shape, Shape::PopulatedPlace { .. }) {
      1
    } else {
      2
    };
    if shape.header().screen_coordinates.len() < min_coordinates {
      skipped_degenerate += 1;
      continue;
    }
    shape.translate_and_scale(
      screen_bbox.min_x,
      screen_bbox.min_y,
      scale,
      screen_bbox.height() * scale,
    );
    shape.draw(canvas, style);
    drawn += 1;
  }
  log::debug!("rendered {drawn} shapes, skipped {skipped_degenerate} degenerate");
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::canvas::RecordingCanvas;
  use crate::classifier::GeometryKind;
  use crate::coordinate::Coordinate;

  fn feature(environment: EnvironmentCategory, coords: &[(f32, f32)]) -> MapFeatureData<'static> {
    MapFeatureData {
      id: 1,
      geometry_kind: GeometryKind::Line,
      label: None,
      coordinates: coords.iter().map(|&(x, y)| Coordinate::new(x, y)).collect(),
      environment,
      name: None,
    }
  }

  #[test]
  fn unknown_category_is_dropped() {
    let f = feature(EnvironmentCategory::Unknown, &[(0., 0.), (1., 1.)]);
    let mut bbox = ScreenBoundingBox::new();
    let mut queue = ShapeQueue::new();
    tessellate(&f, &mut bbox, &mut queue);
    assert!(queue.is_empty());
  }

  #[test]
  fn bbox_accumulates_across_tessellated_shapes() {
    let mut bbox = ScreenBoundingBox::new();
    let mut queue = ShapeQueue::new();
    tessellate(
      &feature(EnvironmentCategory::Road, &[(0., 0.), (10., 0.)]),
      &mut bbox,
      &mut queue,
    );
    tessellate(
      &feature(EnvironmentCategory::Highway, &[(5., 5.), (5., 15.)]),
      &mut bbox,
      &mut queue,
    );
    assert_eq!((bbox.min_x, bbox.max_x, bbox.min_y, bbox.max_y), (0., 10., 0., 15.));
  }

  #[test]
  fn queue_drains_in_ascending_z_order_with_stable_ties() {
    let mut bbox = ScreenBoundingBox::new();
    let mut queue = ShapeQueue::new();
    // Road (z=50) enqueued before Forest (z=14): Forest must drain first.
    tessellate(
      &feature(EnvironmentCategory::Road, &[(0., 0.), (1., 1.)]),
      &mut bbox,
      &mut queue,
    );
    tessellate(
      &feature(EnvironmentCategory::Forest, &[(0., 0.), (1., 1.)]),
      &mut bbox,
      &mut queue,
    );
    let first = queue.pop().unwrap();
    let second = queue.pop().unwrap();
    assert!(matches!(first, Shape::GeoFeature { .. }));
    assert!(matches!(second, Shape::Road { .. }));
  }

  #[test]
  fn empty_scene_renders_background_only() {
    let queue = ShapeQueue::new();
    let bbox = ScreenBoundingBox::new();
    let mut canvas = RecordingCanvas::default();
    render(queue, bbox, &mut canvas, 100, 100, &StyleConfig::default());
    assert_eq!(canvas.fill_calls.len(), 1);
    assert!(canvas.polygon_calls.is_empty());
    assert!(canvas.line_calls.is_empty());
  }

  #[test]
  fn degenerate_shapes_are_skipped_at_render_time() {
    let mut bbox = ScreenBoundingBox::new();
    let mut queue = ShapeQueue::new();
    // Degenerate: a single-coordinate "line" has nothing to stroke.
    tessellate(
      &feature(EnvironmentCategory::Road, &[(0., 0.)]),
      &mut bbox,
      &mut queue,
    );
    // Non-degenerate, establishes a real screen bbox so render doesn't
    // take the empty-scene early return.
    tessellate(
      &feature(EnvironmentCategory::Highway, &[(0., 0.), (10., 10.)]),
      &mut bbox,
      &mut queue,
    );
    let mut canvas = RecordingCanvas::default();
    render(queue, bbox, &mut canvas, 100, 100, &StyleConfig::default());
    assert_eq!(canvas.line_calls.len(), 1);
  }

  #[test]
  fn populated_place_with_single_coordinate_still_renders() {
    let mut f = feature(EnvironmentCategory::PopulatedPlace, &[(5., 5.)]);
    f.name = Some("Berlin".to_string());
    let mut bbox = ScreenBoundingBox::new();
    let mut queue = ShapeQueue::new();
    // Establish a real bbox with a second, unrelated shape so render
    // doesn't take the empty-scene early return.
    tessellate(
      &feature(EnvironmentCategory::Road, &[(0., 0.), (10., 10.)]),
      &mut bbox,
      &mut queue,
    );
    tessellate(&f, &mut bbox, &mut queue);
    let mut canvas = RecordingCanvas::default();
    render(queue, bbox, &mut canvas, 100, 100, &StyleConfig::default());
    assert_eq!(canvas.text_calls.len(), 1);
    assert_eq!(canvas.text_calls[0].0, "Berlin");
  }
}
