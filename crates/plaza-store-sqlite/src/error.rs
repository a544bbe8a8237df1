//! Error type for `plaza-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain rule rejected the operation (duplicate edge, unknown user...).
  #[error(transparent)]
  Core(#[from] plaza_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl From<Error> for plaza_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(core) => core,
      Error::DateParse(detail) => plaza_core::Error::CorruptRecord(detail),
      other => plaza_core::Error::StorageUnavailable(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
