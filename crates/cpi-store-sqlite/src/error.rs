//! Error type for `cpi-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Core(#[from] cpi_core::Error),

  /// The database could not be opened or rejected a statement.
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A stored value could not be decoded into its domain type.
  #[error("decode error in column {column}: {reason}")]
  Decode {
    column: &'static str,
    reason: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
