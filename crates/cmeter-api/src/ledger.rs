//! Handlers for `/ledger` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/ledger` | `?owner&from&to` (RFC 3339, inclusive); newest first |
//! | `POST` | `/ledger` | Body: [`AppendBody`]; the fact must exist |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use cmeter_core::{
  ledger::{LedgerEvent, Quantity, TimeWindow},
  store::IntakeStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct WindowParams {
  pub owner: String,
  pub from:  DateTime<Utc>,
  pub to:    DateTime<Utc>,
}

/// `GET /ledger?owner=<login>&from=<ts>&to=<ts>`
pub async fn query<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<WindowParams>,
) -> Result<Json<Vec<LedgerEvent>>, ApiError>
where
  S: IntakeStore,
{
  if params.from > params.to {
    return Err(ApiError::BadRequest("`from` must not be after `to`".to_owned()));
  }
  let events = store
    .query_window(&params.owner, TimeWindow::new(params.from, params.to))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(events))
}

#[derive(Debug, Deserialize)]
pub struct AppendBody {
  pub owner:    String,
  pub fact_id:  Uuid,
  /// Defaults to one unit.
  pub quantity: Option<i64>,
}

/// `POST /ledger`
pub async fn append<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<AppendBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: IntakeStore,
{
  let quantity = body.quantity.map(Quantity::new).transpose()?.unwrap_or(Quantity::ONE);

  if store.get_fact(body.fact_id).await.map_err(ApiError::from_store)?.is_none() {
    return Err(ApiError::NotFound(format!("fact {}", body.fact_id)));
  }

  let event = store
    .append_event(&body.owner, body.fact_id, quantity)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(event)))
}
