//! The `IntakeStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `cmeter-store-sqlite`).
//! Higher layers (`cmeter-api`, `cmeter-bot`) and the report builder depend on
//! this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  catalog::{CatalogNode, NewNode},
  ledger::{LedgerEvent, Quantity, TimeWindow},
  nutrition::{NewFact, NutritionFact},
  path::{CatalogPath, PathPattern},
  prefs::{Locale, UserPreferences},
};

/// Abstraction over a C-Meter storage backend.
///
/// Every method is one unit of work against the backing store; nothing is
/// cached between calls. Nutrition facts and ledger events are append-only.
///
/// The error type converts into [`crate::Error`] so callers can classify it
/// with [`crate::Error::kind`].
pub trait IntakeStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Meta ──────────────────────────────────────────────────────────────

  /// Version of the schema the store is running on.
  fn schema_version(&self) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  // ── Nutrition facts ───────────────────────────────────────────────────

  /// Validate and persist a new fact. `created_at` is set by the store.
  fn record_fact(
    &self,
    input: NewFact,
  ) -> impl Future<Output = Result<NutritionFact, Self::Error>> + Send + '_;

  /// Retrieve a fact by UUID. Returns `None` if not found.
  fn get_fact(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<NutritionFact>, Self::Error>> + Send + '_;

  // ── Catalog ───────────────────────────────────────────────────────────

  /// Create a node at `input.parent` + `input.segment`.
  ///
  /// Fails with a conflict if the owner already has a node at that path.
  /// The parent is not required to exist.
  fn create_node(
    &self,
    input: NewNode,
  ) -> impl Future<Output = Result<CatalogNode, Self::Error>> + Send + '_;

  /// Exact-path lookup. Returns `None` if the owner has no node there.
  fn get_node<'a>(
    &'a self,
    owner: &'a str,
    path: &'a CatalogPath,
  ) -> impl Future<Output = Result<Option<CatalogNode>, Self::Error>> + Send + 'a;

  /// Nodes exactly one segment below `parent`, ordered by path.
  fn list_at_level<'a>(
    &'a self,
    owner: &'a str,
    parent: &'a CatalogPath,
  ) -> impl Future<Output = Result<Vec<CatalogNode>, Self::Error>> + Send + 'a;

  /// Every node whose path matches `pattern`, ordered by path.
  fn list_descendants<'a>(
    &'a self,
    owner: &'a str,
    pattern: &'a PathPattern,
  ) -> impl Future<Output = Result<Vec<CatalogNode>, Self::Error>> + Send + 'a;

  // ── Ledger ────────────────────────────────────────────────────────────

  /// Append a consumption event. Id and timestamp are server-assigned.
  fn append_event<'a>(
    &'a self,
    owner: &'a str,
    fact_id: Uuid,
    quantity: Quantity,
  ) -> impl Future<Output = Result<LedgerEvent, Self::Error>> + Send + 'a;

  /// Events of `owner` inside `window` (both bounds inclusive), newest first.
  fn query_window<'a>(
    &'a self,
    owner: &'a str,
    window: TimeWindow,
  ) -> impl Future<Output = Result<Vec<LedgerEvent>, Self::Error>> + Send + 'a;

  // ── Preferences ───────────────────────────────────────────────────────

  fn get_preferences<'a>(
    &'a self,
    owner: &'a str,
  ) -> impl Future<Output = Result<Option<UserPreferences>, Self::Error>> + Send + 'a;

  /// Upsert the day boundary, leaving the locale untouched.
  fn set_day_boundary<'a>(
    &'a self,
    owner: &'a str,
    boundary: chrono::NaiveTime,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Upsert the locale, leaving the day boundary untouched.
  fn set_locale<'a>(
    &'a self,
    owner: &'a str,
    locale: Locale,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
