//! `GET /catalog` — the selectable categories, items, states and cities.

use axum::{Json, extract::State};
use cpi_core::{catalog::Catalog, store::ObservationStore};

use crate::ApiState;

pub async fn handler<S>(State(state): State<ApiState<S>>) -> Json<Catalog>
where
  S: ObservationStore + 'static,
{
  Json(state.catalog.as_ref().clone())
}
