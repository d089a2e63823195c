//! Handlers for `/facts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/facts` | Body: [`NewFact`]; returns 201 + stored fact |
//! | `GET`  | `/facts/:id` | Single fact |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use cmeter_core::{
  nutrition::{NewFact, NutritionFact},
  store::IntakeStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `POST /facts`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewFact>,
) -> Result<impl IntoResponse, ApiError>
where
  S: IntakeStore,
{
  let fact = store.record_fact(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(fact)))
}

/// `GET /facts/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<NutritionFact>, ApiError>
where
  S: IntakeStore,
{
  store
    .get_fact(id)
    .await
    .map_err(ApiError::from_store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("fact {id}")))
}
