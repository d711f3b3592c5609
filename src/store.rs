//! Tile index & memory map, plus the layout accessors built on top of it
//! (spec §4.A, §4.B).
//!
//! `Store` owns the `File` and the `Mmap` together; both are released on
//! every exit path by `Drop`, which is Rust's native answer to spec.md's
//! "scoped acquisition... released on every exit path is required;
//! double-close is a no-op" — there is no explicit `close()` method, and a
//! `Store` cannot be used after being dropped because the borrow checker
//! will not allow it.
//!
//! No precedent for this in the teacher crate (`mapvas` fetches raster/
//! vector tiles over HTTP, never memory-maps a local file); grounded on
//! `novalabsxyz-geoprop`'s `nasadem` crate (`Storage::Mapped(Mmap)`) and
//! the `pmtiles-rs`/`versatiles-rs` tile-store crates in the retrieval
//! pack, all of which pair `memmap2` with `byteorder` for packed binary
//! tile formats.

use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;

use crate::coordinate::Coordinate;
use crate::error::{LayoutError, OpenError};
use crate::format::{
  FileHeader, MapFeatureRecord, StringEntry, TileBlockHeader, TileHeaderEntry, FILE_HEADER_SIZE,
  MAP_FEATURE_RECORD_SIZE, STRING_ENTRY_SIZE, TILE_BLOCK_HEADER_SIZE, TILE_HEADER_ENTRY_SIZE,
};

/// A memory-mapped tile file, read-only for the lifetime of the `Store`.
pub struct Store {
  _file: File,
  mmap: Mmap,
  header: FileHeader,
}

impl Store {
  /// Maps `path` read-only and validates that the file is at least large
  /// enough to hold the fixed header and tile index (spec §4.A).
  ///
  /// # Errors
  /// Returns [`OpenError`] if the file is missing, unreadable, or smaller
  /// than `sizeof(FileHeader) + tile_count * sizeof(TileHeaderEntry)`.
  pub fn open(path: impl AsRef<Path>) -> Result<Self, OpenError> {
    use std::io::Read;

    let path: PathBuf = path.as_ref().to_path_buf();
    let mut file = File::open(&path).map_err(|e| match e.kind() {
      std::io::ErrorKind::NotFound => OpenError::NotFound(path.clone()),
      std::io::ErrorKind::PermissionDenied => OpenError::PermissionDenied(path.clone()),
      _ => OpenError::Io(e),
    })?;
    let file_len = file.metadata().map_err(OpenError::Io)?.len();

    // Validate size before mmap'ing: an empty file is rejected by
    // `Mmap::map` itself with a generic `io::Error`, which would hide the
    // dedicated `TooSmall` variant behind `Io` for the 0-byte case. Reading
    // the header straight off the file keeps every undersized-file case on
    // the same `TooSmall` path, independent of the mmap backend's handling
    // of empty files.
    if file_len < FILE_HEADER_SIZE as u64 {
      return Err(OpenError::TooSmall {
        expected: FILE_HEADER_SIZE as u64,
        actual: file_len,
      });
    }
    let mut header_bytes = [0u8; FILE_HEADER_SIZE];
    file.read_exact(&mut header_bytes).map_err(OpenError::Io)?;
    let header = FileHeader::read_at(&header_bytes, 0).map_err(|_| OpenError::TooSmall {
      expected: FILE_HEADER_SIZE as u64,
      actual: file_len,
    })?;

    let required = FILE_HEADER_SIZE as u64
      + u64::from(header.tile_count) * TILE_HEADER_ENTRY_SIZE as u64;
    if file_len < required {
      return Err(OpenError::TooSmall {
        expected: required,
        actual: file_len,
      });
    }

    // SAFETY: the file is opened read-only above and is not modified by
    // this process for the lifetime of the mapping; `Store` never writes
    // through `mmap`.
    let mmap = unsafe { Mmap::map(&file) }.map_err(OpenError::Io)?;

    log::debug!(
      "opened tile store {:?}: {} tiles, {} bytes mapped",
      path,
      header.tile_count,
      mmap.len()
    );

    Ok(Self {
      _file: file,
      mmap,
      header,
    })
  }

  #[must_use]
  pub fn tile_count(&self) -> u32 {
    self.header.tile_count
  }

  #[must_use]
  pub fn version(&self) -> u32 {
    self.header.version
  }

  fn data(&self) -> &[u8] {
    &self.mmap
  }

  /// The `i`-th entry of the tile index, immediately following the fixed
  /// header.
  pub fn nth_tile_header(&self, i: u32) -> Result<TileHeaderEntry, LayoutError> {
    let offset = FILE_HEADER_SIZE + i as usize * TILE_HEADER_ENTRY_SIZE;
    TileHeaderEntry::read_at(self.data(), offset)
  }

  /// Linear scan over the tile index (tile counts are O(thousands), per
  /// spec.md §4.B). Returns `Ok(None)` if `tile_id` is absent — this is
  /// not an error, callers skip the tile silently (spec §4.C edge case).
  pub fn find_tile(&self, tile_id: u32) -> Result<Option<(TileBlockHeader, u64)>, LayoutError> {
    for i in 0..self.header.tile_count {
      let entry = self.nth_tile_header(i)?;
      if entry.tile_id == tile_id {
        let block = TileBlockHeader::read_at(self.data(), entry.offset_in_bytes as usize)?;
        return Ok(Some((block, entry.offset_in_bytes)));
      }
    }
    Ok(None)
  }

  /// The `i`-th feature record of a tile block starting at `base_offset`.
  pub fn feature_at(&self, i: u32, base_offset: u64) -> Result<MapFeatureRecord, LayoutError> {
    let offset =
      base_offset as usize + TILE_BLOCK_HEADER_SIZE + i as usize * MAP_FEATURE_RECORD_SIZE;
    MapFeatureRecord::read_at(self.data(), offset)
  }

  /// Reads `count` coordinates starting at index `start` within the
  /// coordinate array at `coord_offset`. Unaligned little-endian loads —
  /// no assumption is made about `coord_offset`'s alignment within the
  /// mapped region.
  pub fn coordinates(
    &self,
    coord_offset: u64,
    start: u32,
    count: u32,
  ) -> Result<Vec<Coordinate>, LayoutError> {
    let mut out = Vec::with_capacity(count as usize);
    for i in start..start + count {
      let offset = coord_offset as usize + i as usize * 8;
      let bytes = self
        .data()
        .get(offset..offset + 8)
        .ok_or(LayoutError::OffsetOutOfBounds {
          offset: offset as u64,
          len: 8,
          data_len: self.data().len() as u64,
        })?;
      out.push(Coordinate::new(
        LittleEndian::read_f32(&bytes[0..4]),
        LittleEndian::read_f32(&bytes[4..8]),
      ));
    }
    Ok(out)
  }

  /// The `i`-th string entry's UTF-16 character view, as raw little-endian
  /// code-unit bytes. Callers decode on demand (`decode_utf16_lossy`) —
  /// surrogate handling is the caller's choice, per spec.md §9's open
  /// question.
  pub fn string_at<'a>(
    &'a self,
    strings_offset: u64,
    chars_offset: u64,
    i: u32,
  ) -> Result<&'a [u8], LayoutError> {
    let entry_offset = strings_offset as usize + i as usize * STRING_ENTRY_SIZE;
    let entry = StringEntry::read_at(self.data(), entry_offset)?;
    let byte_offset = chars_offset as usize + entry.offset as usize * 2;
    let byte_len = entry.length as usize * 2;
    self
      .data()
      .get(byte_offset..byte_offset + byte_len)
      .ok_or(LayoutError::OffsetOutOfBounds {
        offset: byte_offset as u64,
        len: byte_len as u64,
        data_len: self.data().len() as u64,
      })
  }
}

/// Decodes raw little-endian UTF-16 code-unit bytes into an owned
/// `String`, replacing unpaired surrogates with U+FFFD.
#[must_use]
pub fn decode_utf16_lossy(bytes: &[u8]) -> String {
  let units = bytes
    .chunks_exact(2)
    .map(|pair| LittleEndian::read_u16(pair));
  char::decode_utf16(units)
    .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  fn write_u32(buf: &mut Vec<u8>, v: u32) {
    let mut b = [0u8; 4];
    LittleEndian::write_u32(&mut b, v);
    buf.extend_from_slice(&b);
  }

  fn write_u64(buf: &mut Vec<u8>, v: u64) {
    let mut b = [0u8; 8];
    LittleEndian::write_u64(&mut b, v);
    buf.extend_from_slice(&b);
  }

  /// Builds a minimal well-formed tile file with one tile, no features,
  /// for layout-accessor tests. Feature-iterator tests build a richer
  /// fixture in `tests/store_tests.rs`.
  fn minimal_fixture() -> Vec<u8> {
    let mut buf = Vec::new();
    write_u32(&mut buf, 1); // version
    write_u32(&mut buf, 1); // tile_count
    write_u32(&mut buf, 7); // tile id
    let block_offset = (8 + 12) as u64;
    write_u64(&mut buf, block_offset);

    // TileBlockHeader: zero features/coords/strings/chars.
    write_u32(&mut buf, 0);
    write_u32(&mut buf, 0);
    write_u32(&mut buf, 0);
    write_u32(&mut buf, 0);
    write_u64(&mut buf, block_offset + TILE_BLOCK_HEADER_SIZE as u64);
    write_u64(&mut buf, block_offset + TILE_BLOCK_HEADER_SIZE as u64);
    write_u64(&mut buf, block_offset + TILE_BLOCK_HEADER_SIZE as u64);
    buf
  }

  fn write_fixture_to_tempfile(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
  }

  #[test]
  fn open_rejects_missing_file() {
    let err = Store::open("/nonexistent/path/does-not-exist.tiles").unwrap_err();
    assert!(matches!(err, OpenError::NotFound(_)));
  }

  #[test]
  fn open_rejects_too_small_file() {
    let file = write_fixture_to_tempfile(&[0u8; 4]);
    let err = Store::open(file.path()).unwrap_err();
    assert!(matches!(err, OpenError::TooSmall { .. }));
  }

  #[test]
  fn open_rejects_empty_file_as_too_small_not_io_error() {
    let file = write_fixture_to_tempfile(&[]);
    let err = Store::open(file.path()).unwrap_err();
    assert!(matches!(err, OpenError::TooSmall { .. }));
  }

  #[test]
  fn open_accepts_well_formed_minimal_file() {
    let bytes = minimal_fixture();
    let file = write_fixture_to_tempfile(&bytes);
    let store = Store::open(file.path()).unwrap();
    assert_eq!(store.tile_count(), 1);
    assert_eq!(store.version(), 1);
  }

  #[test]
  fn find_tile_locates_by_id() {
    let bytes = minimal_fixture();
    let file = write_fixture_to_tempfile(&bytes);
    let store = Store::open(file.path()).unwrap();
    let (block, _) = store.find_tile(7).unwrap().expect("tile 7 present");
    assert_eq!(block.features_count, 0);
    assert!(store.find_tile(99).unwrap().is_none());
  }

  #[test]
  fn decode_utf16_round_trips_ascii() {
    let text = "Berlin";
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut bytes = Vec::new();
    for u in units {
      let mut b = [0u8; 2];
      LittleEndian::write_u16(&mut b, u);
      bytes.extend_from_slice(&b);
    }
    assert_eq!(decode_utf16_lossy(&bytes), "Berlin");
  }
}
