//! Ledger events — append-only records of consumption.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Quantity ────────────────────────────────────────────────────────────────

/// A strictly positive number of units of a nutrition fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(i64);

impl Quantity {
  pub const ONE: Quantity = Quantity(1);

  pub fn new(value: i64) -> Result<Self> {
    if value > 0 { Ok(Self(value)) } else { Err(Error::InvalidQuantity(value)) }
  }

  pub fn get(self) -> i64 { self.0 }
}

impl TryFrom<i64> for Quantity {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> { Self::new(value) }
}

impl From<Quantity> for i64 {
  fn from(q: Quantity) -> Self { q.0 }
}

// ─── Event ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
  pub event_id:   Uuid,
  pub fact_id:    Uuid,
  pub quantity:   Quantity,
  pub owner:      String,
  /// Server-assigned; never changes.
  pub created_at: DateTime<Utc>,
}

// ─── Window ──────────────────────────────────────────────────────────────────

/// A closed time range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

impl TimeWindow {
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self { Self { start, end } }
}
