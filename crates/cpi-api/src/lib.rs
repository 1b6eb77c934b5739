//! JSON HTTP API for the CPI observation store.
//!
//! Exposes an axum [`Router`] backed by any [`ObservationStore`]. This is the
//! boundary a data-entry form or dashboard talks to.

pub mod catalog;
pub mod charts;
pub mod error;
pub mod observations;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use cpi_core::{catalog::Catalog, store::ObservationStore};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:   Arc<S>,
  pub catalog: Arc<Catalog>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), catalog: Arc::clone(&self.catalog) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: ObservationStore + 'static,
{
  Router::new()
    .route(
      "/observations",
      get(observations::list::<S>).post(observations::create::<S>),
    )
    .route("/observations/delete", post(observations::delete::<S>))
    .route("/charts/{kind}", get(charts::handler::<S>))
    .route("/catalog", get(catalog::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use cpi_core::{
    chart::Chart,
    filter::{ObservationFilter, SortKey},
    observation::{NewObservation, Observation},
    outcome::DeleteOutcome,
  };
  use cpi_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use crate::observations::CreateResponse;

  async fn make_state() -> ApiState<SqliteStore> {
    ApiState {
      store:   Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      catalog: Arc::new(Catalog::default()),
    }
  }

  /// A store whose every operation fails, for the error paths.
  struct FullDisk;

  #[derive(Debug, thiserror::Error)]
  #[error("disk is full")]
  struct DiskFull;

  impl ObservationStore for FullDisk {
    type Error = DiskFull;

    async fn record(&self, _input: NewObservation) -> Result<Observation, DiskFull> {
      Err(DiskFull)
    }

    async fn record_batch(&self, _inputs: Vec<NewObservation>) -> Result<usize, DiskFull> {
      Err(DiskFull)
    }

    async fn list(&self) -> Result<Vec<Observation>, DiskFull> { Err(DiskFull) }

    async fn count_matching<'a>(&'a self, _filter: &'a ObservationFilter) -> Result<u64, DiskFull> {
      Err(DiskFull)
    }

    async fn delete_matching<'a>(
      &'a self,
      _filter: &'a ObservationFilter,
      _limit: u64,
      _order_by: &'a [SortKey],
    ) -> Result<DeleteOutcome, DiskFull> {
      Err(DiskFull)
    }

    async fn reset(&self) -> Result<(), DiskFull> { Err(DiskFull) }
  }

  async fn call<S: ObservationStore + 'static>(
    state: &ApiState<S>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = api_router(state.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
  }

  fn eggs(city: &str) -> Value {
    json!({
      "date": "2024-03-01",
      "category": "Food",
      "item": "USDA Grade-A eggs (Dozen)",
      "price": "2.99",
      "state": "Texas",
      "city": city,
    })
  }

  // ── Create / list ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_then_list() {
    let state = make_state().await;
    let (status, body) = call(&state, "POST", "/observations", Some(eggs("Dallas"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: CreateResponse = serde_json::from_slice(&body).unwrap();
    assert!(created.report.success);
    assert!(created.observation.is_some());

    let (status, body) = call(&state, "GET", "/observations", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows: Vec<Observation> = serde_json::from_slice(&body).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].city, "Dallas");
  }

  #[tokio::test]
  async fn create_rejects_unknown_fields() {
    let state = make_state().await;
    let mut body = eggs("Dallas");
    body["colour"] = json!("brown");
    let (status, _) = call(&state, "POST", "/observations", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn create_reports_store_rejection() {
    let state = ApiState { store: Arc::new(FullDisk), catalog: Arc::new(Catalog::default()) };
    let (status, body) = call(&state, "POST", "/observations", Some(eggs("Dallas"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let created: CreateResponse = serde_json::from_slice(&body).unwrap();
    assert!(!created.report.success);
    assert!(created.report.message.contains("disk is full"), "{}", created.report.message);
    assert!(created.observation.is_none());
  }

  #[tokio::test]
  async fn store_failure_on_delete_is_a_server_error() {
    let state = ApiState { store: Arc::new(FullDisk), catalog: Arc::new(Catalog::default()) };
    let req = json!({ "filter": { "city": "Dallas" } });
    let (status, body) = call(&state, "POST", "/observations/delete", Some(req)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let err: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(err["error"], "disk is full");
  }

  // ── Delete ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_with_empty_filter_is_bad_request() {
    let state = make_state().await;
    call(&state, "POST", "/observations", Some(eggs("Dallas"))).await;

    let req = json!({ "filter": { "state": null, "city": null }, "limit": 5 });
    let (status, body) = call(&state, "POST", "/observations/delete", Some(req)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: Value = serde_json::from_slice(&body).unwrap();
    assert!(err["error"].as_str().unwrap().contains("at least one"));
  }

  #[tokio::test]
  async fn delete_with_fractional_limit_is_bad_request() {
    let state = make_state().await;
    let req = json!({ "filter": { "state": "Texas" }, "limit": 1.5 });
    let (status, _) = call(&state, "POST", "/observations/delete", Some(req)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn delete_most_recent_first() {
    let state = make_state().await;
    call(&state, "POST", "/observations", Some(eggs("Dallas"))).await;
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    call(&state, "POST", "/observations", Some(eggs("Austin"))).await;

    let req = json!({
      "filter": { "state": "Texas" },
      "limit": "1",
      "order_by": [{ "column": "AddedOn", "direction": "desc" }],
    });
    let (status, body) = call(&state, "POST", "/observations/delete", Some(req)).await;
    assert_eq!(status, StatusCode::OK);
    let outcome: DeleteOutcome = serde_json::from_slice(&body).unwrap();
    assert_eq!(outcome.deleted, 1);

    let (_, body) = call(&state, "GET", "/observations", None).await;
    let rows: Vec<Observation> = serde_json::from_slice(&body).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].city, "Dallas");
  }

  #[tokio::test]
  async fn delete_defaults_to_newest_first() {
    let state = make_state().await;
    call(&state, "POST", "/observations", Some(eggs("Dallas"))).await;
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    call(&state, "POST", "/observations", Some(eggs("Austin"))).await;

    let req = json!({ "filter": { "item": "USDA Grade-A eggs (Dozen)" } });
    let (status, body) = call(&state, "POST", "/observations/delete", Some(req)).await;
    assert_eq!(status, StatusCode::OK);
    let outcome: DeleteOutcome = serde_json::from_slice(&body).unwrap();
    assert_eq!(outcome.deleted, 1);

    let (_, body) = call(&state, "GET", "/observations", None).await;
    let rows: Vec<Observation> = serde_json::from_slice(&body).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].city, "Dallas");
  }

  #[tokio::test]
  async fn delete_without_match_reports_zero() {
    let state = make_state().await;
    let req = json!({ "filter": { "city": "Boston" } });
    let (status, body) = call(&state, "POST", "/observations/delete", Some(req)).await;
    assert_eq!(status, StatusCode::OK);
    let outcome: DeleteOutcome = serde_json::from_slice(&body).unwrap();
    assert_eq!(outcome.deleted, 0);
    assert!(!outcome.is_success());
  }

  // ── Charts / catalog ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn chart_by_slug() {
    let state = make_state().await;
    call(&state, "POST", "/observations", Some(eggs("Dallas"))).await;
    call(&state, "POST", "/observations", Some(eggs("Dallas"))).await;

    let (status, body) = call(&state, "GET", "/charts/average-price-by-city", None).await;
    assert_eq!(status, StatusCode::OK);
    match serde_json::from_slice::<Chart>(&body).unwrap() {
      Chart::AveragePriceByCity(bars) => {
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].count, 2);
      }
      other => panic!("unexpected chart {other:?}"),
    }

    let (status, _) = call(&state, "GET", "/charts/pie", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn catalog_lists_defaults() {
    let state = make_state().await;
    let (status, body) = call(&state, "GET", "/catalog", None).await;
    assert_eq!(status, StatusCode::OK);
    let catalog: Catalog = serde_json::from_slice(&body).unwrap();
    assert_eq!(catalog, Catalog::default());
  }
}
