//! Error types for the tile store (spec §7).
//!
//! `ClassificationMiss`, `DegenerateShape`, and `EmptyScene` are not
//! errors — they are ordinary control flow handled inline where they occur
//! (see `classifier`, `shape`, and `renderer`).

use thiserror::Error;

/// Fatal to `Store::open`.
#[derive(Error, Debug)]
pub enum OpenError {
  #[error("tile file not found: {0}")]
  NotFound(std::path::PathBuf),
  #[error("tile file too small: expected at least {expected} bytes, found {actual}")]
  TooSmall { expected: u64, actual: u64 },
  #[error("permission denied opening tile file: {0}")]
  PermissionDenied(std::path::PathBuf),
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

/// A tile header, feature record, or string/coordinate offset points
/// outside the mapped region.
#[derive(Error, Debug)]
pub enum LayoutError {
  #[error("offset {offset} (len {len}) out of bounds for region of length {data_len}")]
  OffsetOutOfBounds {
    offset: u64,
    len: u64,
    data_len: u64,
  },
  #[error("tile block at offset {offset} is truncated: {reason}")]
  TruncatedRecord { offset: u64, reason: &'static str },
}
