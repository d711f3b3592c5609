//! The on-disk binary tile file layout (spec §6).
//!
//! All multi-byte fields are little-endian. Every struct here has a fixed
//! byte size and a `read_at` that parses it out of an arbitrary byte slice
//! without requiring alignment.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::LayoutError;

pub const FILE_HEADER_SIZE: usize = 8;
pub const TILE_HEADER_ENTRY_SIZE: usize = 12;
pub const TILE_BLOCK_HEADER_SIZE: usize = 40;
pub const MAP_FEATURE_RECORD_SIZE: usize = 29;
pub const STRING_ENTRY_SIZE: usize = 8;

fn slice_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8], LayoutError> {
  data
    .get(offset..offset + len)
    .ok_or(LayoutError::OffsetOutOfBounds {
      offset: offset as u64,
      len: len as u64,
      data_len: data.len() as u64,
    })
}

/// Fixed-size header at offset 0: a version marker and the number of tiles
/// in the index immediately following it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
  pub version: u32,
  pub tile_count: u32,
}

impl FileHeader {
  pub fn read_at(data: &[u8], offset: usize) -> Result<Self, LayoutError> {
    let bytes = slice_at(data, offset, FILE_HEADER_SIZE)?;
    Ok(Self {
      version: LittleEndian::read_u32(&bytes[0..4]),
      tile_count: LittleEndian::read_u32(&bytes[4..8]),
    })
  }
}

/// One entry of the tile index: maps a tile id to the byte offset of its
/// `TileBlockHeader` within the mapped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileHeaderEntry {
  pub tile_id: u32,
  pub offset_in_bytes: u64,
}

impl TileHeaderEntry {
  pub fn read_at(data: &[u8], offset: usize) -> Result<Self, LayoutError> {
    let bytes = slice_at(data, offset, TILE_HEADER_ENTRY_SIZE)?;
    Ok(Self {
      tile_id: LittleEndian::read_u32(&bytes[0..4]),
      offset_in_bytes: LittleEndian::read_u64(&bytes[4..12]),
    })
  }
}

/// Per-tile record describing the four sub-arrays (features, coordinates,
/// strings, characters) that make up one tile block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBlockHeader {
  pub features_count: u32,
  pub coordinates_count: u32,
  pub strings_count: u32,
  pub characters_count: u32,
  pub coordinates_offset_in_bytes: u64,
  pub strings_offset_in_bytes: u64,
  pub characters_offset_in_bytes: u64,
}

impl TileBlockHeader {
  pub fn read_at(data: &[u8], offset: usize) -> Result<Self, LayoutError> {
    let bytes = slice_at(data, offset, TILE_BLOCK_HEADER_SIZE)?;
    Ok(Self {
      features_count: LittleEndian::read_u32(&bytes[0..4]),
      coordinates_count: LittleEndian::read_u32(&bytes[4..8]),
      strings_count: LittleEndian::read_u32(&bytes[8..12]),
      characters_count: LittleEndian::read_u32(&bytes[12..16]),
      coordinates_offset_in_bytes: LittleEndian::read_u64(&bytes[16..24]),
      strings_offset_in_bytes: LittleEndian::read_u64(&bytes[24..32]),
      characters_offset_in_bytes: LittleEndian::read_u64(&bytes[32..40]),
    })
  }
}

/// Fixed-size feature record. `label_offset < 0` means "no label".
/// Properties are `2 * property_count` consecutive string-entry indices
/// (key, value, key, value, ...) starting at `properties_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapFeatureRecord {
  pub id: i64,
  pub label_offset: i32,
  pub geometry_kind: u8,
  pub coordinate_offset: i32,
  pub coordinate_count: i32,
  pub properties_offset: i32,
  pub property_count: i32,
}

impl MapFeatureRecord {
  pub fn read_at(data: &[u8], offset: usize) -> Result<Self, LayoutError> {
    let bytes = slice_at(data, offset, MAP_FEATURE_RECORD_SIZE)?;
    Ok(Self {
      id: LittleEndian::read_i64(&bytes[0..8]),
      label_offset: LittleEndian::read_i32(&bytes[8..12]),
      geometry_kind: bytes[12],
      coordinate_offset: LittleEndian::read_i32(&bytes[13..17]),
      coordinate_count: LittleEndian::read_i32(&bytes[17..21]),
      properties_offset: LittleEndian::read_i32(&bytes[21..25]),
      property_count: LittleEndian::read_i32(&bytes[25..29]),
    })
  }
}

/// A `(offset, length)` pair into a tile's character array. Offsets count
/// 16-bit code units, not bytes — multiply by 2 to get a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringEntry {
  pub offset: u32,
  pub length: u32,
}

impl StringEntry {
  pub fn read_at(data: &[u8], offset: usize) -> Result<Self, LayoutError> {
    let bytes = slice_at(data, offset, STRING_ENTRY_SIZE)?;
    Ok(Self {
      offset: LittleEndian::read_u32(&bytes[0..4]),
      length: LittleEndian::read_u32(&bytes[4..8]),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_header_round_trip() {
    let mut buf = vec![0u8; FILE_HEADER_SIZE];
    LittleEndian::write_u32(&mut buf[0..4], 1);
    LittleEndian::write_u32(&mut buf[4..8], 42);
    let header = FileHeader::read_at(&buf, 0).unwrap();
    assert_eq!(header.version, 1);
    assert_eq!(header.tile_count, 42);
  }

  #[test]
  fn truncated_header_is_layout_error() {
    let buf = vec![0u8; FILE_HEADER_SIZE - 1];
    assert!(FileHeader::read_at(&buf, 0).is_err());
  }
}
