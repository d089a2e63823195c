//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with microsecond
//! precision, so lexical order is chronological order. UUIDs are stored as
//! hyphenated lowercase strings, paths in their dotted form.

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};
use cmeter_core::{
  catalog::CatalogNode,
  ledger::{LedgerEvent, Quantity},
  nutrition::NutritionFact,
  path::{CatalogPath, SEPARATOR},
  prefs::{Locale, UserPreferences},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveTime ───────────────────────────────────────────────────────────────

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Paths ───────────────────────────────────────────────────────────────────

pub fn encode_path(p: &CatalogPath) -> String { p.to_string() }

pub fn decode_path(s: &str) -> Result<CatalogPath> {
  CatalogPath::parse(s).map_err(|e| Error::Decode(e.to_string()))
}

/// Half-open range `[lower, upper)` holding the serialised paths of every
/// strict descendant of `p`. `'/'` is the byte right after the separator.
pub fn descendant_bounds(p: &CatalogPath) -> (String, String) {
  debug_assert_eq!(SEPARATOR, '.');
  (format!("{p}{SEPARATOR}"), format!("{p}/"))
}

// ─── Locale ──────────────────────────────────────────────────────────────────

pub fn decode_locale(s: &str) -> Result<Locale> {
  s.parse().map_err(|e: cmeter_core::Error| Error::Decode(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const FACT_COLUMNS: &str = "fact_id, name, energy, protein, fat, carbs, created_at";

/// Raw values read directly from a `nutrition_facts` row.
pub struct RawFact {
  pub fact_id:    String,
  pub name:       String,
  pub energy:     i64,
  pub protein:    i64,
  pub fat:        i64,
  pub carbs:      i64,
  pub created_at: String,
}

impl RawFact {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      fact_id:    row.get(0)?,
      name:       row.get(1)?,
      energy:     row.get(2)?,
      protein:    row.get(3)?,
      fat:        row.get(4)?,
      carbs:      row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_fact(self) -> Result<NutritionFact> {
    Ok(NutritionFact {
      fact_id:    decode_uuid(&self.fact_id)?,
      name:       self.name,
      energy:     self.energy,
      protein:    self.protein,
      fat:        self.fat,
      carbs:      self.carbs,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const NODE_COLUMNS: &str = "node_id, owner, path, display_name, fact_id, created_at";

/// Raw values read directly from a `catalog_nodes` row.
pub struct RawNode {
  pub node_id:      String,
  pub owner:        String,
  pub path:         String,
  pub display_name: String,
  pub fact_id:      Option<String>,
  pub created_at:   String,
}

impl RawNode {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      node_id:      row.get(0)?,
      owner:        row.get(1)?,
      path:         row.get(2)?,
      display_name: row.get(3)?,
      fact_id:      row.get(4)?,
      created_at:   row.get(5)?,
    })
  }

  pub fn into_node(self) -> Result<CatalogNode> {
    Ok(CatalogNode {
      node_id:      decode_uuid(&self.node_id)?,
      owner:        self.owner,
      path:         decode_path(&self.path)?,
      display_name: self.display_name,
      fact_id:      self.fact_id.as_deref().map(decode_uuid).transpose()?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub const EVENT_COLUMNS: &str = "event_id, fact_id, quantity, owner, created_at";

/// Raw values read directly from a `ledger_events` row.
pub struct RawEvent {
  pub event_id:   String,
  pub fact_id:    String,
  pub quantity:   i64,
  pub owner:      String,
  pub created_at: String,
}

impl RawEvent {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:   row.get(0)?,
      fact_id:    row.get(1)?,
      quantity:   row.get(2)?,
      owner:      row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_event(self) -> Result<LedgerEvent> {
    Ok(LedgerEvent {
      event_id:   decode_uuid(&self.event_id)?,
      fact_id:    decode_uuid(&self.fact_id)?,
      quantity:   Quantity::new(self.quantity).map_err(|e| Error::Decode(e.to_string()))?,
      owner:      self.owner,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `user_preferences` row.
pub struct RawPreferences {
  pub owner:        String,
  pub day_boundary: String,
  pub locale:       String,
}

impl RawPreferences {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { owner: row.get(0)?, day_boundary: row.get(1)?, locale: row.get(2)? })
  }

  pub fn into_preferences(self) -> Result<UserPreferences> {
    Ok(UserPreferences {
      owner:        self.owner,
      day_boundary: decode_time(&self.day_boundary)?,
      locale:       decode_locale(&self.locale)?,
    })
  }
}
