//! [`SqliteStore`] — the SQLite implementation of [`IntakeStore`].

use std::{path::Path, sync::Arc};

use chrono::{DateTime, NaiveTime, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use cmeter_core::{
  catalog::{CatalogNode, NewNode},
  ledger::{LedgerEvent, Quantity, TimeWindow},
  nutrition::{NewFact, NutritionFact},
  path::{CatalogPath, PathPattern},
  prefs::{Locale, UserPreferences},
  store::IntakeStore,
};

use crate::{
  Error, Result,
  encode::{
    EVENT_COLUMNS, FACT_COLUMNS, NODE_COLUMNS, RawEvent, RawFact, RawNode, RawPreferences,
    descendant_bounds, encode_dt, encode_path, encode_time, encode_uuid,
  },
  schema::{SCHEMA, SCHEMA_VERSION},
};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A C-Meter store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and clones
/// share it.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  clock: Clock,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  /// Replace the source of server-assigned timestamps.
  pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let store = Self { conn, clock: Arc::new(Utc::now) };
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!(version = SCHEMA_VERSION, "schema ready");
    Ok(())
  }

  /// Current time at the precision the timestamp columns keep.
  fn now(&self) -> DateTime<Utc> { (self.clock)().trunc_subsecs(6) }

  async fn query_nodes(
    &self,
    sql: String,
    params: Vec<rusqlite::types::Value>,
  ) -> Result<Vec<CatalogNode>> {
    let raws: Vec<RawNode> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawNode::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNode::into_node).collect()
  }
}

// ─── IntakeStore impl ────────────────────────────────────────────────────────

impl IntakeStore for SqliteStore {
  type Error = Error;

  // ── Meta ──────────────────────────────────────────────────────────────────

  async fn schema_version(&self) -> Result<u32> {
    let version = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |row| row.get::<_, u32>(0))?))
      .await?;
    Ok(version)
  }

  // ── Nutrition facts ───────────────────────────────────────────────────────

  async fn record_fact(&self, input: NewFact) -> Result<NutritionFact> {
    input.validate()?;

    let fact = NutritionFact {
      fact_id:    Uuid::new_v4(),
      name:       input.name.trim().to_owned(),
      energy:     input.energy,
      protein:    input.protein,
      fat:        input.fat,
      carbs:      input.carbs,
      created_at: self.now(),
    };

    let id_str = encode_uuid(fact.fact_id);
    let name = fact.name.clone();
    let (energy, protein, fat, carbs) = (fact.energy, fact.protein, fact.fat, fact.carbs);
    let at_str = encode_dt(fact.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO nutrition_facts (fact_id, name, energy, protein, fat, carbs, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, name, energy, protein, fat, carbs, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(fact_id = %fact.fact_id, name = %fact.name, "recorded nutrition fact");
    Ok(fact)
  }

  async fn get_fact(&self, id: Uuid) -> Result<Option<NutritionFact>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawFact> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {FACT_COLUMNS} FROM nutrition_facts WHERE fact_id = ?1"),
            rusqlite::params![id_str],
            RawFact::read,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawFact::into_fact).transpose()
  }

  // ── Catalog ───────────────────────────────────────────────────────────────

  async fn create_node(&self, input: NewNode) -> Result<CatalogNode> {
    let node = CatalogNode {
      node_id:      Uuid::new_v4(),
      path:         input.path(),
      owner:        input.owner,
      display_name: input.display_name,
      fact_id:      input.fact_id,
      created_at:   self.now(),
    };

    let id_str      = encode_uuid(node.node_id);
    let owner       = node.owner.clone();
    let path_str    = encode_path(&node.path);
    let depth       = node.path.depth() as i64;
    let display     = node.display_name.clone();
    let fact_id_str = node.fact_id.map(encode_uuid);
    let at_str      = encode_dt(node.created_at);

    // The UNIQUE (owner, path) constraint is the arbiter for racing creates.
    let inserted = self
      .conn
      .call(move |conn| {
        let outcome = conn.execute(
          "INSERT INTO catalog_nodes
             (node_id, owner, path, depth, display_name, fact_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, owner, path_str, depth, display, fact_id_str, at_str],
        );
        match outcome {
          Ok(_) => Ok(true),
          Err(rusqlite::Error::SqliteFailure(err, _))
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      tracing::debug!(owner = %node.owner, path = %node.path, "catalog path conflict");
      return Err(Error::PathConflict(node.path));
    }

    tracing::debug!(owner = %node.owner, path = %node.path, leaf = node.is_leaf(), "created catalog node");
    Ok(node)
  }

  async fn get_node(&self, owner: &str, path: &CatalogPath) -> Result<Option<CatalogNode>> {
    if path.is_root() {
      return Ok(None);
    }
    let owner = owner.to_owned();
    let path_str = encode_path(path);

    let raw: Option<RawNode> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {NODE_COLUMNS} FROM catalog_nodes WHERE owner = ?1 AND path = ?2"),
            rusqlite::params![owner, path_str],
            RawNode::read,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawNode::into_node).transpose()
  }

  async fn list_at_level(&self, owner: &str, parent: &CatalogPath) -> Result<Vec<CatalogNode>> {
    let depth = parent.depth() as i64 + 1;

    if parent.is_root() {
      return self
        .query_nodes(
          format!(
            "SELECT {NODE_COLUMNS} FROM catalog_nodes
             WHERE owner = ?1 AND depth = 1
             ORDER BY path"
          ),
          vec![owner.to_owned().into()],
        )
        .await;
    }

    let (lower, upper) = descendant_bounds(parent);
    self
      .query_nodes(
        format!(
          "SELECT {NODE_COLUMNS} FROM catalog_nodes
           WHERE owner = ?1 AND depth = ?2 AND path >= ?3 AND path < ?4
           ORDER BY path"
        ),
        vec![owner.to_owned().into(), depth.into(), lower.into(), upper.into()],
      )
      .await
  }

  async fn list_descendants(
    &self,
    owner: &str,
    pattern: &PathPattern,
  ) -> Result<Vec<CatalogNode>> {
    // Narrow by the literal prefix with the range index, then match the rest.
    let prefix = pattern.literal_prefix();
    let candidates = if prefix.is_root() {
      self
        .query_nodes(
          format!("SELECT {NODE_COLUMNS} FROM catalog_nodes WHERE owner = ?1 ORDER BY path"),
          vec![owner.to_owned().into()],
        )
        .await?
    } else {
      let (lower, upper) = descendant_bounds(&prefix);
      self
        .query_nodes(
          format!(
            "SELECT {NODE_COLUMNS} FROM catalog_nodes
             WHERE owner = ?1 AND (path = ?2 OR (path >= ?3 AND path < ?4))
             ORDER BY path"
          ),
          vec![
            owner.to_owned().into(),
            encode_path(&prefix).into(),
            lower.into(),
            upper.into(),
          ],
        )
        .await?
    };

    Ok(candidates.into_iter().filter(|n| pattern.matches(&n.path)).collect())
  }

  // ── Ledger ────────────────────────────────────────────────────────────────

  async fn append_event(
    &self,
    owner: &str,
    fact_id: Uuid,
    quantity: Quantity,
  ) -> Result<LedgerEvent> {
    let event = LedgerEvent {
      event_id: Uuid::new_v4(),
      fact_id,
      quantity,
      owner: owner.to_owned(),
      created_at: self.now(),
    };

    let id_str      = encode_uuid(event.event_id);
    let fact_id_str = encode_uuid(fact_id);
    let qty         = quantity.get();
    let owner       = event.owner.clone();
    let at_str      = encode_dt(event.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ledger_events (event_id, fact_id, quantity, owner, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, fact_id_str, qty, owner, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(owner = %event.owner, event_id = %event.event_id, quantity = qty, "appended ledger event");
    Ok(event)
  }

  async fn query_window(&self, owner: &str, window: TimeWindow) -> Result<Vec<LedgerEvent>> {
    let owner = owner.to_owned();
    let start_str = encode_dt(window.start);
    let end_str = encode_dt(window.end);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM ledger_events
           WHERE owner = ?1 AND created_at >= ?2 AND created_at <= ?3
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner, start_str, end_str], RawEvent::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  // ── Preferences ───────────────────────────────────────────────────────────

  async fn get_preferences(&self, owner: &str) -> Result<Option<UserPreferences>> {
    let owner = owner.to_owned();

    let raw: Option<RawPreferences> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT owner, day_boundary, locale FROM user_preferences WHERE owner = ?1",
            rusqlite::params![owner],
            RawPreferences::read,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPreferences::into_preferences).transpose()
  }

  async fn set_day_boundary(&self, owner: &str, boundary: NaiveTime) -> Result<()> {
    let owner = owner.to_owned();
    let boundary_str = encode_time(boundary);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO user_preferences (owner, day_boundary) VALUES (?1, ?2)
           ON CONFLICT (owner) DO UPDATE SET day_boundary = excluded.day_boundary",
          rusqlite::params![owner, boundary_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn set_locale(&self, owner: &str, locale: Locale) -> Result<()> {
    let owner = owner.to_owned();
    let locale_str = locale.as_str();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO user_preferences (owner, locale) VALUES (?1, ?2)
           ON CONFLICT (owner) DO UPDATE SET locale = excluded.locale",
          rusqlite::params![owner, locale_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
