//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use cmeter_core::{
  ErrorKind,
  catalog::NewNode,
  ledger::{Quantity, TimeWindow},
  nutrition::NewFact,
  path::{CatalogPath, PathPattern, Segment},
  prefs::Locale,
  report::{ReportWindow, build_report},
  store::IntakeStore,
};
use uuid::Uuid;

use crate::{Error, SqliteStore, schema::SCHEMA_VERSION};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A store whose clock is driven by the returned handle.
async fn store_at(start: DateTime<Utc>) -> (SqliteStore, Arc<Mutex<DateTime<Utc>>>) {
  let now = Arc::new(Mutex::new(start));
  let handle = now.clone();
  let s = store()
    .await
    .with_clock(move || *handle.lock().unwrap());
  (s, now)
}

fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, 7, 8, 0, 0).unwrap() }

fn path(s: &str) -> CatalogPath { CatalogPath::parse(s).unwrap() }

fn seg(s: &str) -> Segment { Segment::new(s).unwrap() }

/// Create a folder at the dotted path `full` for `owner`.
async fn folder(s: &SqliteStore, owner: &str, full: &str) {
  let p = path(full);
  let last = p.last().unwrap().clone();
  s.create_node(NewNode::folder(owner, p.parent(), last))
    .await
    .unwrap();
}

fn paths(nodes: &[cmeter_core::catalog::CatalogNode]) -> Vec<String> {
  nodes.iter().map(|n| n.path.to_string()).collect()
}

// ─── Meta ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn schema_version_is_recorded() {
  let s = store().await;
  assert_eq!(s.schema_version().await.unwrap(), SCHEMA_VERSION);
}

#[tokio::test]
async fn schema_init_is_idempotent() {
  let s = store().await;
  s.init_schema().await.unwrap();
  assert_eq!(s.schema_version().await.unwrap(), SCHEMA_VERSION);
}

// ─── Nutrition facts ─────────────────────────────────────────────────────────

#[tokio::test]
async fn record_and_get_fact() {
  let s = store().await;
  let fact = s
    .record_fact(NewFact::new("Chicken Breast", 165).with_macros(31, 3, 0))
    .await
    .unwrap();

  let fetched = s.get_fact(fact.fact_id).await.unwrap().unwrap();
  assert_eq!(fetched, fact);
  assert_eq!(fetched.protein, 31);
  assert_eq!(fetched.fat, 3);
  assert_eq!(fetched.carbs, 0);
}

#[tokio::test]
async fn get_fact_missing_returns_none() {
  let s = store().await;
  assert!(s.get_fact(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn record_fact_rejects_invalid_input() {
  let s = store().await;
  let err = s.record_fact(NewFact::new("Water", 0)).await.unwrap_err();
  assert!(matches!(err, Error::Core(cmeter_core::Error::InvalidNutrition(_))));
  assert_eq!(cmeter_core::Error::from(err).kind(), ErrorKind::Validation);
}

// ─── Catalog: create ─────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_node() {
  let s = store().await;
  let fact = s.record_fact(NewFact::new("Milk", 64)).await.unwrap();

  folder(&s, "alice", "kitchen").await;
  let leaf = s
    .create_node(
      NewNode::leaf("alice", path("kitchen"), seg("milk"), fact.fact_id)
        .with_display_name("Whole milk"),
    )
    .await
    .unwrap();
  assert_eq!(leaf.path, path("kitchen.milk"));
  assert_eq!(leaf.depth(), 2);

  let fetched = s.get_node("alice", &path("kitchen.milk")).await.unwrap().unwrap();
  assert_eq!(fetched, leaf);
  assert!(fetched.is_leaf());
  assert_eq!(fetched.display_name, "Whole milk");

  assert!(s.get_node("bob", &path("kitchen.milk")).await.unwrap().is_none());
  assert!(s.get_node("alice", &CatalogPath::root()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_path_conflicts() {
  let s = store().await;
  folder(&s, "alice", "kitchen").await;

  let err = s
    .create_node(NewNode::folder("alice", CatalogPath::root(), seg("kitchen")))
    .await
    .unwrap_err();
  assert!(matches!(&err, Error::PathConflict(p) if *p == path("kitchen")));
  assert_eq!(cmeter_core::Error::from(err).kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn same_path_for_different_owners_is_fine() {
  let s = store().await;
  folder(&s, "alice", "kitchen").await;
  folder(&s, "bob", "kitchen").await;

  let bobs = s.list_at_level("bob", &CatalogPath::root()).await.unwrap();
  assert_eq!(bobs.len(), 1);
  assert_eq!(bobs[0].owner, "bob");
}

#[tokio::test]
async fn orphan_nodes_are_tolerated() {
  let s = store().await;
  folder(&s, "alice", "garage.freezer.drawer").await;

  // No ancestor exists, so nothing shows at the root or the middle level.
  assert!(s.list_at_level("alice", &CatalogPath::root()).await.unwrap().is_empty());
  assert!(s.list_at_level("alice", &path("garage")).await.unwrap().is_empty());

  let level = s.list_at_level("alice", &path("garage.freezer")).await.unwrap();
  assert_eq!(paths(&level), ["garage.freezer.drawer"]);
}

#[tokio::test]
async fn racing_creates_resolve_to_one_winner() {
  let s = store().await;
  let a = s.clone();
  let b = s.clone();

  let (first, second) = tokio::join!(
    a.create_node(NewNode::folder("alice", path("kitchen"), seg("fridge"))),
    b.create_node(NewNode::folder("alice", path("kitchen"), seg("fridge"))),
  );

  let outcomes = [first, second];
  let wins = outcomes.iter().filter(|r| r.is_ok()).count();
  let conflicts = outcomes
    .iter()
    .filter(|r| matches!(r, Err(Error::PathConflict(_))))
    .count();
  assert_eq!((wins, conflicts), (1, 1));

  let level = s.list_at_level("alice", &path("kitchen")).await.unwrap();
  assert_eq!(level.len(), 1);
}

// ─── Catalog: listing ────────────────────────────────────────────────────────

#[tokio::test]
async fn list_at_level_returns_direct_children_only() {
  let s = store().await;
  for p in [
    "a",
    "a.b",
    "a.b.c",
    "a.b.c.d",
    "a.b.e",
    "a.bc",
    "a.bc.x",
    "a.b-c",
    "a.b-c.y",
    "ab",
    "ab.b",
  ] {
    folder(&s, "alice", p).await;
  }
  folder(&s, "bob", "a.b.zzz").await;

  let parent = path("a.b");
  let level = s.list_at_level("alice", &parent).await.unwrap();
  assert_eq!(paths(&level), ["a.b.c", "a.b.e"]);
  for node in &level {
    assert_eq!(node.depth(), parent.depth() + 1);
    assert_eq!(node.path.parent(), parent);
    assert_eq!(node.owner, "alice");
  }

  let root = s.list_at_level("alice", &CatalogPath::root()).await.unwrap();
  assert_eq!(paths(&root), ["a", "ab"]);

  let under_a = s.list_at_level("alice", &path("a")).await.unwrap();
  assert_eq!(paths(&under_a), ["a.b", "a.b-c", "a.bc"]);
}

#[tokio::test]
async fn list_at_level_orders_alphabetically_by_segment() {
  let s = store().await;
  for p in ["pantry", "fridge", "cellar", "kitchen"] {
    folder(&s, "alice", p).await;
  }
  let root = s.list_at_level("alice", &CatalogPath::root()).await.unwrap();
  assert_eq!(paths(&root), ["cellar", "fridge", "kitchen", "pantry"]);
}

#[tokio::test]
async fn list_descendants_by_pattern() {
  let s = store().await;
  for p in ["kitchen", "kitchen.fridge", "kitchen.fridge.milk", "kitchen.shelf", "kitchens", "pantry.milk"] {
    folder(&s, "alice", p).await;
  }
  folder(&s, "bob", "kitchen.fridge").await;

  let subtree = s
    .list_descendants("alice", &PathPattern::parse("kitchen.*").unwrap())
    .await
    .unwrap();
  assert_eq!(
    paths(&subtree),
    ["kitchen", "kitchen.fridge", "kitchen.fridge.milk", "kitchen.shelf"]
  );

  let children = s
    .list_descendants("alice", &PathPattern::parse("kitchen.*{1}").unwrap())
    .await
    .unwrap();
  assert_eq!(paths(&children), ["kitchen.fridge", "kitchen.shelf"]);

  let milk = s
    .list_descendants("alice", &PathPattern::parse("*.milk").unwrap())
    .await
    .unwrap();
  assert_eq!(paths(&milk), ["kitchen.fridge.milk", "pantry.milk"]);

  let everything = s
    .list_descendants("alice", &PathPattern::parse("*").unwrap())
    .await
    .unwrap();
  assert_eq!(everything.len(), 6);
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn append_assigns_id_and_timestamp() {
  let (s, _clock) = store_at(t0()).await;
  let fact = s.record_fact(NewFact::new("Apple", 52)).await.unwrap();

  let event = s
    .append_event("alice", fact.fact_id, Quantity::new(3).unwrap())
    .await
    .unwrap();
  assert_eq!(event.created_at, t0());
  assert_eq!(event.quantity.get(), 3);

  let window = TimeWindow::new(t0(), t0());
  let found = s.query_window("alice", window).await.unwrap();
  assert_eq!(found, vec![event]);
}

#[tokio::test]
async fn query_window_is_newest_first_and_inclusive() {
  let (s, clock) = store_at(t0()).await;
  let fact = s.record_fact(NewFact::new("Apple", 52)).await.unwrap();

  let mut appended = Vec::new();
  for minutes in [0, 30, 60, 90] {
    *clock.lock().unwrap() = t0() + TimeDelta::minutes(minutes);
    appended.push(s.append_event("alice", fact.fact_id, Quantity::ONE).await.unwrap());
  }

  let window = TimeWindow::new(t0() + TimeDelta::minutes(30), t0() + TimeDelta::minutes(90));
  let found = s.query_window("alice", window).await.unwrap();
  let ids: Vec<_> = found.iter().map(|e| e.event_id).collect();
  assert_eq!(ids, [appended[3].event_id, appended[2].event_id, appended[1].event_id]);
  assert!(found.windows(2).all(|w| w[0].created_at > w[1].created_at));
}

#[tokio::test]
async fn query_window_breaks_timestamp_ties_by_insertion() {
  let (s, _clock) = store_at(t0()).await;
  let fact = s.record_fact(NewFact::new("Apple", 52)).await.unwrap();
  let first = s.append_event("alice", fact.fact_id, Quantity::ONE).await.unwrap();
  let second = s.append_event("alice", fact.fact_id, Quantity::ONE).await.unwrap();

  let found = s.query_window("alice", TimeWindow::new(t0(), t0())).await.unwrap();
  assert_eq!(found[0].event_id, second.event_id);
  assert_eq!(found[1].event_id, first.event_id);
}

#[tokio::test]
async fn query_window_outside_events_is_empty() {
  let (s, _clock) = store_at(t0()).await;
  let fact = s.record_fact(NewFact::new("Apple", 52)).await.unwrap();
  s.append_event("alice", fact.fact_id, Quantity::ONE).await.unwrap();

  let before = TimeWindow::new(t0() - TimeDelta::days(2), t0() - TimeDelta::microseconds(1));
  assert!(s.query_window("alice", before).await.unwrap().is_empty());

  let after = TimeWindow::new(t0() + TimeDelta::microseconds(1), t0() + TimeDelta::days(2));
  assert!(s.query_window("alice", after).await.unwrap().is_empty());
}

#[tokio::test]
async fn query_window_is_per_owner() {
  let (s, _clock) = store_at(t0()).await;
  let fact = s.record_fact(NewFact::new("Apple", 52)).await.unwrap();
  s.append_event("alice", fact.fact_id, Quantity::ONE).await.unwrap();
  s.append_event("bob", fact.fact_id, Quantity::ONE).await.unwrap();

  let found = s.query_window("bob", TimeWindow::new(t0(), t0())).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].owner, "bob");
}

// ─── Preferences ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn preferences_upsert_independently() {
  let s = store().await;
  assert!(s.get_preferences("alice").await.unwrap().is_none());

  let three = NaiveTime::from_hms_opt(3, 0, 0).unwrap();
  s.set_day_boundary("alice", three).await.unwrap();
  let prefs = s.get_preferences("alice").await.unwrap().unwrap();
  assert_eq!(prefs.day_boundary, three);
  assert_eq!(prefs.locale, Locale::En);

  s.set_locale("alice", Locale::Ru).await.unwrap();
  let prefs = s.get_preferences("alice").await.unwrap().unwrap();
  assert_eq!(prefs.day_boundary, three);
  assert_eq!(prefs.locale, Locale::Ru);

  s.set_locale("bob", Locale::Ru).await.unwrap();
  let bob = s.get_preferences("bob").await.unwrap().unwrap();
  assert_eq!(bob.day_boundary, NaiveTime::MIN);
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn report_multiplies_energy_by_quantity() {
  let (s, clock) = store_at(t0()).await;
  let fact = s
    .record_fact(NewFact::new("Chicken Breast", 165).with_macros(31, 3, 0))
    .await
    .unwrap();
  s.append_event("alice", fact.fact_id, Quantity::new(2).unwrap())
    .await
    .unwrap();

  let now = t0() + TimeDelta::hours(1);
  *clock.lock().unwrap() = now;
  let report = build_report(&s, "alice", ReportWindow::last_days(now, 1).unwrap())
    .await
    .unwrap();

  assert_eq!(report.rows.len(), 1);
  assert_eq!(report.rows[0].energy, 330);
  assert_eq!(report.total_energy, 330);
  let text = report.render();
  assert!(text.contains("07-03 08:00 │ Chicken Breast  │ 330 "), "{text}");
  assert!(text.ends_with("📋 <b>Total: 330 kcal</b>"), "{text}");
}

#[tokio::test]
async fn report_for_empty_day_says_no_records() {
  let s = store().await;
  let report = build_report(&s, "alice", ReportWindow::last_days(t0(), 1).unwrap())
    .await
    .unwrap();
  let text = report.render();
  assert_eq!(text, "No records found for the last 1 days");
  assert!(!text.contains("<pre>"));
  assert!(!text.contains("Total"));
}

#[tokio::test]
async fn report_for_three_days_has_no_total() {
  let (s, clock) = store_at(t0() - TimeDelta::days(2)).await;
  let fact = s.record_fact(NewFact::new("Apple", 52)).await.unwrap();
  s.append_event("alice", fact.fact_id, Quantity::ONE).await.unwrap();
  *clock.lock().unwrap() = t0();
  s.append_event("alice", fact.fact_id, Quantity::ONE).await.unwrap();

  let report = build_report(&s, "alice", ReportWindow::last_days(t0(), 3).unwrap())
    .await
    .unwrap();
  assert_eq!(report.rows.len(), 2);
  assert!(report.rows[0].at < report.rows[1].at);
  let text = report.render();
  assert!(text.starts_with("<b>Records for last 3 days:</b>"));
  assert!(!text.contains("Total"));
}

#[tokio::test]
async fn report_skips_dangling_fact_references() {
  let (s, _clock) = store_at(t0()).await;
  let fact = s.record_fact(NewFact::new("Apple", 52)).await.unwrap();
  s.append_event("alice", Uuid::new_v4(), Quantity::ONE).await.unwrap();
  s.append_event("alice", fact.fact_id, Quantity::new(2).unwrap()).await.unwrap();

  let report = build_report(&s, "alice", ReportWindow::last_days(t0(), 1).unwrap())
    .await
    .unwrap();
  assert_eq!(report.rows.len(), 1);
  assert_eq!(report.skipped, 1);
  assert_eq!(report.total_energy, 104);
}
