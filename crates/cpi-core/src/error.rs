//! Error types for `cpi-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Caller input that the operation refuses to act on.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("invalid price model for {subject}: {reason}")]
  PriceModel { subject: String, reason: String },
}

impl Error {
  pub fn invalid(msg: impl Into<String>) -> Self {
    Error::InvalidArgument(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
