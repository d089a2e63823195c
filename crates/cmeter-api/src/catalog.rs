//! Handlers for `/catalog` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/catalog` | `?owner` required; `parent` defaults to the root |
//! | `GET`  | `/catalog/export` | `?owner&pattern`; every node matching the pattern |
//! | `POST` | `/catalog` | Body: [`NewNodeBody`]; returns 201 + stored node |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cmeter_core::{
  catalog::{CatalogNode, NewNode},
  path::{CatalogPath, PathPattern, Segment},
  store::IntakeStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Level ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LevelParams {
  pub owner:  String,
  /// Dotted parent path. Empty or absent means the root level.
  #[serde(default)]
  pub parent: String,
}

/// `GET /catalog?owner=<login>[&parent=a.b]`
pub async fn list_level<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<LevelParams>,
) -> Result<Json<Vec<CatalogNode>>, ApiError>
where
  S: IntakeStore,
{
  let parent = CatalogPath::parse(&params.parent)?;
  let nodes = store
    .list_at_level(&params.owner, &parent)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(nodes))
}

// ─── Export ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExportParams {
  pub owner:   String,
  /// A path pattern such as `kitchen.*` or `*{2}.milk`.
  pub pattern: String,
}

/// `GET /catalog/export?owner=<login>&pattern=<pattern>`
pub async fn export<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ExportParams>,
) -> Result<Json<Vec<CatalogNode>>, ApiError>
where
  S: IntakeStore,
{
  let pattern = PathPattern::parse(&params.pattern)?;
  let nodes = store
    .list_descendants(&params.owner, &pattern)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(nodes))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewNodeBody {
  pub owner:        String,
  #[serde(default)]
  pub parent:       String,
  pub segment:      String,
  pub display_name: Option<String>,
  /// Set for a leaf item; absent for a folder.
  pub fact_id:      Option<Uuid>,
}

/// `POST /catalog`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewNodeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: IntakeStore,
{
  let parent = CatalogPath::parse(&body.parent)?;
  let segment = Segment::new(body.segment)?;

  let mut input = match body.fact_id {
    Some(fact_id) => NewNode::leaf(body.owner, parent, segment, fact_id),
    None => NewNode::folder(body.owner, parent, segment),
  };
  if let Some(name) = body.display_name {
    input = input.with_display_name(name);
  }

  let node = store.create_node(input).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(node)))
}
