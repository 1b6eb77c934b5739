//! `GET /charts/{kind}` — chart data for the current table.

use axum::{
  Json,
  extract::{Path, State},
};
use cpi_core::{
  chart::{Chart, ChartKind},
  store::ObservationStore,
};

use crate::{ApiState, error::ApiError};

/// `kind` is a slug such as `prices-over-time` or `average-price-by-city`.
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Path(kind): Path<String>,
) -> Result<Json<Chart>, ApiError>
where
  S: ObservationStore + 'static,
{
  let kind: ChartKind = kind.parse()?;
  let rows = state.store.list().await.map_err(ApiError::store)?;
  Ok(Json(Chart::build(kind, &rows)))
}
