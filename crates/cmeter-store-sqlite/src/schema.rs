//! SQL schema for the C-Meter SQLite store.
//!
//! Executed once at connection startup. The version is recorded in
//! `PRAGMA user_version`; future migrations will be gated on that number.

/// Version written by [`SCHEMA`].
pub const SCHEMA_VERSION: u32 = 1;

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Shared product definitions. Append-only.
CREATE TABLE IF NOT EXISTS nutrition_facts (
    fact_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    energy      INTEGER NOT NULL CHECK (energy > 0),
    protein     INTEGER NOT NULL DEFAULT 0,
    fat         INTEGER NOT NULL DEFAULT 0,
    carbs       INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

-- Consumption events. Append-only; no UPDATE or DELETE is ever issued.
-- fact_id is deliberately not a foreign key: reports tolerate dangling ids.
CREATE TABLE IF NOT EXISTS ledger_events (
    event_id    TEXT PRIMARY KEY,
    fact_id     TEXT NOT NULL,
    quantity    INTEGER NOT NULL CHECK (quantity > 0),
    owner       TEXT NOT NULL,
    created_at  TEXT NOT NULL   -- fixed-width RFC 3339 UTC, sorts lexically
);

-- Materialized-path hierarchy. `path` is the dotted segment list and `depth`
-- its segment count; the parent is not required to exist.
CREATE TABLE IF NOT EXISTS catalog_nodes (
    node_id       TEXT PRIMARY KEY,
    owner         TEXT NOT NULL,
    path          TEXT NOT NULL,
    depth         INTEGER NOT NULL CHECK (depth > 0),
    display_name  TEXT NOT NULL,
    fact_id       TEXT,
    created_at    TEXT NOT NULL,
    UNIQUE (owner, path)
);

CREATE TABLE IF NOT EXISTS user_preferences (
    owner         TEXT PRIMARY KEY,
    day_boundary  TEXT NOT NULL DEFAULT '00:00:00',
    locale        TEXT NOT NULL DEFAULT 'en'
);

CREATE INDEX IF NOT EXISTS ledger_owner_time_idx ON ledger_events(owner, created_at);
CREATE INDEX IF NOT EXISTS catalog_level_idx     ON catalog_nodes(owner, depth, path);

PRAGMA user_version = 1;
";
