//! Handlers for `/observations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/observations` | Whole table, oldest first |
//! | `POST` | `/observations` | Body: [`NewObservation`]; 201 + [`CreateResponse`] |
//! | `POST` | `/observations/delete` | Body: [`DeleteBody`]; returns [`DeleteOutcome`] |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
};
use cpi_core::{
  Error,
  filter::{ObservationFilter, SortKey, parse_limit},
  observation::{NewObservation, Observation},
  outcome::{DeleteOutcome, WriteReport},
  store::ObservationStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /observations`
pub async fn list<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<Observation>>, ApiError>
where
  S: ObservationStore + 'static,
{
  let rows = state.store.list().await.map_err(ApiError::store)?;
  Ok(Json(rows))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResponse {
  #[serde(flatten)]
  pub report:      WriteReport,
  pub observation: Option<Observation>,
}

/// `POST /observations`
///
/// A store failure is reported in the body with `success: false` rather than
/// as a bare error, so the form can show why the save did not happen.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<NewObservation>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError>
where
  S: ObservationStore + 'static,
{
  let Json(input) = body?;
  let result = state.store.record(input).await;
  let report = WriteReport::from_result(&result);

  match result {
    Ok(observation) => {
      tracing::info!(item = %observation.item, city = %observation.city, "observation saved");
      Ok((StatusCode::CREATED, Json(CreateResponse { report, observation: Some(observation) })))
    }
    Err(e) => {
      tracing::warn!(error = %e, "observation rejected");
      Ok((
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(CreateResponse { report, observation: None }),
      ))
    }
  }
}

// ─── Delete ───────────────────────────────────────────────────────────────────

fn default_limit() -> Value { Value::from(1) }

/// JSON body accepted by `POST /observations/delete`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteBody {
  #[serde(default)]
  pub filter:   ObservationFilter,
  /// A non-negative integer, as a number or as text from a form field.
  #[serde(default = "default_limit")]
  pub limit:    Value,
  /// Omitted means newest first; an empty list leaves the choice to the
  /// store.
  #[serde(default)]
  pub order_by: Option<Vec<SortKey>>,
}

impl DeleteBody {
  pub fn order(&self) -> Vec<SortKey> {
    self.order_by.clone().unwrap_or_else(|| vec![SortKey::most_recent_first()])
  }
}

fn limit_from_json(v: &Value) -> Result<u64, Error> {
  match v {
    Value::Number(n) => n
      .as_u64()
      .ok_or_else(|| Error::invalid(format!("limit must be a non-negative integer, got {n}"))),
    Value::String(s) => parse_limit(s),
    other => Err(Error::invalid(format!("limit must be a non-negative integer, got {other}"))),
  }
}

/// `POST /observations/delete`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<DeleteBody>, JsonRejection>,
) -> Result<Json<DeleteOutcome>, ApiError>
where
  S: ObservationStore + 'static,
{
  let Json(body) = body?;
  body.filter.ensure_not_empty()?;
  let limit = limit_from_json(&body.limit)?;

  let order = body.order();

  let outcome = state
    .store
    .delete_matching(&body.filter, limit, &order)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(deleted = outcome.deleted, limit, "matching delete");
  Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
  use cpi_core::observation::Column;

  use super::*;

  #[test]
  fn limit_accepts_integers_only() {
    assert_eq!(limit_from_json(&Value::from(3)).unwrap(), 3);
    assert_eq!(limit_from_json(&Value::from("2")).unwrap(), 2);
    assert!(limit_from_json(&Value::from(1.5)).is_err());
    assert!(limit_from_json(&Value::from(-1)).is_err());
    assert!(limit_from_json(&Value::Null).is_err());
  }

  #[test]
  fn order_defaults_to_newest_first() {
    let body: DeleteBody = serde_json::from_str(r#"{"filter":{"city":"Dallas"}}"#).unwrap();
    assert_eq!(body.order(), vec![SortKey::most_recent_first()]);

    let body: DeleteBody =
      serde_json::from_str(r#"{"filter":{"city":"Dallas"},"order_by":[]}"#).unwrap();
    assert!(body.order().is_empty());

    let body: DeleteBody = serde_json::from_str(
      r#"{"filter":{"city":"Dallas"},"order_by":[{"column":"Price","direction":"asc"}]}"#,
    )
    .unwrap();
    assert_eq!(body.order(), vec![SortKey::asc(Column::Price)]);
  }
}
