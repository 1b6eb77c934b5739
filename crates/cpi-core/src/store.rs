//! The `ObservationStore` trait.
//!
//! Implemented by storage backends (e.g. `cpi-store-sqlite`). The API and
//! CLI depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  filter::{ObservationFilter, SortKey},
  observation::{NewObservation, Observation},
  outcome::DeleteOutcome,
};

/// Abstraction over a single-table observation store.
///
/// There is no update in place: rows are inserted, listed and deleted.
pub trait ObservationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert one observation. The store assigns `added_on`.
  fn record(
    &self,
    input: NewObservation,
  ) -> impl Future<Output = Result<Observation, Self::Error>> + Send + '_;

  /// Insert many observations in a single transaction. Returns the count.
  fn record_batch(
    &self,
    inputs: Vec<NewObservation>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Every row, oldest `added_on` first.
  fn list(&self) -> impl Future<Output = Result<Vec<Observation>, Self::Error>> + Send + '_;

  /// Number of rows matching `filter`. An empty filter counts every row.
  fn count_matching<'a>(
    &'a self,
    filter: &'a ObservationFilter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Delete up to `limit` rows matching `filter`, chosen in `order_by` order.
  ///
  /// Fails with an invalid-argument error if `filter` has no non-null
  /// field. Zero matches is a normal outcome, not an error.
  fn delete_matching<'a>(
    &'a self,
    filter: &'a ObservationFilter,
    limit: u64,
    order_by: &'a [SortKey],
  ) -> impl Future<Output = Result<DeleteOutcome, Self::Error>> + Send + 'a;

  /// Drop every row and recreate the table.
  fn reset(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
