//! JSON REST API for C-Meter.
//!
//! Exposes an axum [`Router`] backed by any [`cmeter_core::store::IntakeStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cmeter_api::api_router(store.clone()))
//! ```

pub mod catalog;
pub mod error;
pub mod facts;
pub mod ledger;
pub mod report;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use cmeter_core::store::IntakeStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: IntakeStore + 'static,
{
  Router::new()
    // Facts
    .route("/facts", post(facts::create::<S>))
    .route("/facts/{id}", get(facts::get_one::<S>))
    // Catalog
    .route("/catalog", get(catalog::list_level::<S>).post(catalog::create::<S>))
    .route("/catalog/export", get(catalog::export::<S>))
    // Ledger
    .route("/ledger", get(ledger::query::<S>).post(ledger::append::<S>))
    // Report
    .route("/report", get(report::handler::<S>))
    .with_state(store)
}
