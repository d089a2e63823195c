//! Error types for `cmeter-core`.
//!
//! Every backend error converts into [`Error`], so callers can branch on
//! [`ErrorKind`] without knowing which store produced it.

use thiserror::Error;
use uuid::Uuid;

use crate::path::CatalogPath;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid path segment: {0:?}")]
  InvalidSegment(String),

  #[error("invalid path pattern: {0:?}")]
  InvalidPattern(String),

  #[error("quantity must be a positive integer, got {0}")]
  InvalidQuantity(i64),

  #[error("day count out of range: {0}")]
  InvalidWindow(i64),

  #[error("invalid nutrition values: {0}")]
  InvalidNutrition(String),

  #[error("invalid time of day: {0:?}")]
  InvalidTimeOfDay(String),

  #[error("unsupported locale: {0:?}")]
  UnsupportedLocale(String),

  #[error("unrecognized action: {0:?}")]
  UnrecognizedAction(String),

  #[error("path {0} already exists")]
  PathConflict(CatalogPath),

  #[error("nutrition fact not found: {0}")]
  FactNotFound(Uuid),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification used to decide how an error is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Bad user-supplied argument; nothing was written.
  Validation,
  /// Uniqueness violation on create.
  Conflict,
  NotFound,
  /// Connectivity or query failure; logged, shown generically.
  Storage,
  /// A navigation token nobody recognises. Never fatal.
  Unrecognized,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::InvalidSegment(_)
      | Self::InvalidPattern(_)
      | Self::InvalidQuantity(_)
      | Self::InvalidWindow(_)
      | Self::InvalidNutrition(_)
      | Self::InvalidTimeOfDay(_)
      | Self::UnsupportedLocale(_) => ErrorKind::Validation,
      Self::PathConflict(_) => ErrorKind::Conflict,
      Self::FactNotFound(_) => ErrorKind::NotFound,
      Self::Storage(_) => ErrorKind::Storage,
      Self::UnrecognizedAction(_) => ErrorKind::Unrecognized,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
