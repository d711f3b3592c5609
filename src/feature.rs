//! Feature iterator (spec §4.C).
//!
//! `for_each_feature` walks the tiles covering a bounding box, hydrates
//! each feature's coordinates and property map, classifies it, and invokes
//! the callback. The callback returning `false` stops iteration across all
//! remaining tiles on the next step (spec §5 cancellation).

use crate::classifier::{classify, EnvironmentCategory, GeometryKind, PropertyMap};
use crate::coordinate::{Coordinate, GeographicBoundingBox};
use crate::error::LayoutError;
use crate::store::{decode_utf16_lossy, Store};

/// Raw UTF-16LE code-unit bytes for one string-table entry. Borrows from
/// the mapped region and is valid only for the duration of the callback
/// invocation that receives it (spec §4.C guarantee ii).
#[derive(Debug, Clone, Copy)]
pub struct LabelView<'a>(pub &'a [u8]);

impl LabelView<'_> {
  #[must_use]
  pub fn decode(&self) -> String {
    decode_utf16_lossy(self.0)
  }
}

/// One fully-hydrated feature, lifetime-scoped to one callback invocation.
/// `label` stays a borrowed view; `name` is looked up from `properties` and
/// is owned, since it is read after the property map (itself short-lived)
/// has already been allocated.
#[derive(Debug)]
pub struct MapFeatureData<'a> {
  pub id: i64,
  pub geometry_kind: GeometryKind,
  pub label: Option<LabelView<'a>>,
  pub coordinates: Vec<Coordinate>,
  pub environment: EnvironmentCategory,
  pub name: Option<String>,
}

/// Walks every tile `tiles_for_bounding_box` reports as covering `bbox`,
/// in storage order, yielding each feature that has at least one
/// coordinate inside `bbox`. A tile id absent from the index is skipped
/// silently (spec §4.C edge case); a malformed record aborts the call and
/// returns `Err` rather than silently skipping (spec §7).
///
/// Duplicate-across-tiles policy (spec §9 Open Question): this
/// implementation assumes — and `tests/store_tests.rs` checks — that the
/// on-disk format assigns each feature to exactly one tile block, so no
/// deduplication is performed here; a feature is visited once per tile
/// that lists it, and the source format never lists the same feature in
/// two tiles.
///
/// # Errors
/// Returns [`LayoutError`] if a feature record, its coordinates, or its
/// properties point outside the mapped region.
pub fn for_each_feature(
  store: &Store,
  bbox: &GeographicBoundingBox,
  tiles_for_bounding_box: impl Fn(f64, f64, f64, f64) -> Vec<u32>,
  mut callback: impl FnMut(&MapFeatureData<'_>) -> bool,
) -> Result<(), LayoutError> {
  if bbox.is_empty() {
    return Ok(());
  }

  let tile_ids = tiles_for_bounding_box(bbox.min_lat, bbox.min_lon, bbox.max_lat, bbox.max_lon);

  'tiles: for tile_id in tile_ids {
    let Some((block, base_offset)) = store.find_tile(tile_id)? else {
      log::debug!("tile {tile_id} not present in index, skipping");
      continue;
    };

    for i in 0..block.features_count {
      let record = store.feature_at(i, base_offset)?;
      let geometry_kind =
        GeometryKind::try_from(record.geometry_kind).map_err(|()| LayoutError::TruncatedRecord {
          offset: base_offset,
          reason: "unknown geometry kind byte",
        })?;

      if record.coordinate_offset < 0 || record.coordinate_count < 0 {
        return Err(LayoutError::TruncatedRecord {
          offset: base_offset,
          reason: "negative coordinate range",
        });
      }
      let coordinates = store.coordinates(
        block.coordinates_offset_in_bytes,
        record.coordinate_offset as u32,
        record.coordinate_count as u32,
      )?;

      let intersects = coordinates
        .iter()
        .any(|c| bbox.contains(f64::from(c.y), f64::from(c.x)));
      if !intersects {
        continue;
      }

      if record.property_count < 0 || record.properties_offset < 0 {
        return Err(LayoutError::TruncatedRecord {
          offset: base_offset,
          reason: "negative property range",
        });
      }
      let mut properties = PropertyMap::new();
      for p in 0..record.property_count as u32 {
        let key_index = record.properties_offset as u32 + 2 * p;
        let value_index = key_index + 1;
        let key_bytes = store.string_at(
          block.strings_offset_in_bytes,
          block.characters_offset_in_bytes,
          key_index,
        )?;
        let value_bytes = store.string_at(
          block.strings_offset_in_bytes,
          block.characters_offset_in_bytes,
          value_index,
        )?;
        properties.insert(decode_utf16_lossy(key_bytes), decode_utf16_lossy(value_bytes));
      }

      let environment = classify(&properties, geometry_kind);
      let name = properties.get("name").map(str::to_string);

      let label = if record.label_offset < 0 {
        None
      } else {
        Some(LabelView(store.string_at(
          block.strings_offset_in_bytes,
          block.characters_offset_in_bytes,
          record.label_offset as u32,
        )?))
      };

      let feature = MapFeatureData {
        id: record.id,
        geometry_kind,
        label,
        coordinates,
        environment,
        name,
      };

      if !callback(&feature) {
        break 'tiles;
      }
    }
  }

  Ok(())
}
