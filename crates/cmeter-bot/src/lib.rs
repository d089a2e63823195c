//! Chat front end for C-Meter.
//!
//! Exposes an axum [`Router`] that accepts transport events on
//! `POST /events`, answers each with a [`transport::Reply`], and mounts the
//! REST API under `/api`. Works with any [`IntakeStore`].

pub mod error;
pub mod handlers;
pub mod transport;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::State,
  routing::{get, post},
};
use cmeter_core::store::IntakeStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use transport::{Inbound, Reply};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CMETER_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("cmeter.db") }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store: Arc<S>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: IntakeStore + 'static,
{
  Router::new()
    .route("/events", post(events_handler::<S>))
    .route("/health", get(health_handler))
    .with_state(state.clone())
    .nest("/api", cmeter_api::api_router(state.store))
    .layer(TraceLayer::new_for_http())
}

async fn events_handler<S>(
  State(state): State<AppState<S>>,
  Json(inbound): Json<Inbound>,
) -> Json<Reply>
where
  S: IntakeStore + 'static,
{
  Json(handlers::dispatch(state.store.as_ref(), inbound).await)
}

async fn health_handler() -> &'static str { "ok" }

// ─── Integration tests ────────────────────────────────────────────────────────
