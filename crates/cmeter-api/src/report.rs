//! Handler for `GET /report?owner&days`.
//!
//! Returns both the structured rows and the same text the chat surface shows.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{DateTime, Utc};
use cmeter_core::{
  report::{ReportWindow, build_report},
  store::IntakeStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ReportParams {
  pub owner: String,
  /// Defaults to one day.
  pub days:  Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ReportRowBody {
  pub at:       DateTime<Utc>,
  pub name:     String,
  pub quantity: i64,
  pub energy:   i64,
}

#[derive(Debug, Serialize)]
pub struct ReportBody {
  pub from:         DateTime<Utc>,
  pub to:           DateTime<Utc>,
  pub rows:         Vec<ReportRowBody>,
  pub total_energy: i64,
  pub skipped:      usize,
  pub rendered:     String,
}

/// `GET /report?owner=<login>[&days=N]`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ReportParams>,
) -> Result<Json<ReportBody>, ApiError>
where
  S: IntakeStore,
{
  let window = ReportWindow::last_days(Utc::now(), params.days.unwrap_or(1))?;
  let report = build_report(store.as_ref(), &params.owner, window)
    .await
    .map_err(ApiError::from_store)?;

  let rendered = report.render();
  Ok(Json(ReportBody {
    from: report.window.range.start,
    to: report.window.range.end,
    total_energy: report.total_energy,
    skipped: report.skipped,
    rows: report
      .rows
      .into_iter()
      .map(|r| ReportRowBody { at: r.at, name: r.name, quantity: r.quantity, energy: r.energy })
      .collect(),
    rendered,
  }))
}
