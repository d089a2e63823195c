//! Error type for `cmeter-store-sqlite`.

use cmeter_core::path::CatalogPath;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] cmeter_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column that no longer decodes into its domain type.
  #[error("corrupt row: {0}")]
  Decode(String),

  /// The owner already has a catalog node at this path.
  #[error("path {0} already exists")]
  PathConflict(CatalogPath),
}

impl From<Error> for cmeter_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      Error::PathConflict(path) => cmeter_core::Error::PathConflict(path),
      other => cmeter_core::Error::Storage(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
