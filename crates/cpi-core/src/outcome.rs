//! User-facing results of the write and delete paths.
//!
//! Callers render these directly: a zero-count delete and a store rejection
//! are shown as warnings, everything else as success.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const NO_MATCH_MESSAGE: &str = "No matching record found";

/// Result of a matching-delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
  pub deleted: u64,
  pub message: String,
}

impl DeleteOutcome {
  pub fn from_count(deleted: u64) -> Self {
    let message = match deleted {
      0 => NO_MATCH_MESSAGE.to_owned(),
      n => format!("{n} matching observations deleted"),
    };
    Self { deleted, message }
  }

  /// `false` when nothing matched; not an error, but rendered as a warning.
  pub fn is_success(&self) -> bool { self.deleted > 0 }
}

/// Result of saving one observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReport {
  pub success: bool,
  pub message: String,
}

impl WriteReport {
  pub fn saved() -> Self {
    Self { success: true, message: "Observation saved".to_owned() }
  }

  pub fn rejected(reason: impl fmt::Display) -> Self {
    Self {
      success: false,
      message: format!("Observation rejected by store: {reason}"),
    }
  }

  pub fn from_result<T, E: fmt::Display>(result: &Result<T, E>) -> Self {
    match result {
      Ok(_) => Self::saved(),
      Err(e) => Self::rejected(e),
    }
  }
}
