//! Consumption reports over a time window.
//!
//! [`build_report`] pulls the ledger events of a window, resolves their
//! nutrition facts and hands both to [`Report::assemble`], which does the
//! arithmetic. [`Report::render`] produces the HTML-marked monospace table
//! sent back to the user.

use std::{collections::HashMap, fmt::Write as _};

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  ledger::{LedgerEvent, TimeWindow},
  nutrition::NutritionFact,
  prefs::UserPreferences,
  store::IntakeStore,
};

/// Width of the name column, in characters.
pub const NAME_WIDTH: usize = 15;

const HEADER: &str = "date & time │      name       │ kcal\n";
const SEPARATOR: &str = "────────────┼─────────────────┼─────\n";

// ─── Window ──────────────────────────────────────────────────────────────────

/// How the report window was chosen; drives the wording and the total line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
  /// The last `n` × 24 hours.
  Days(u32),
  /// Since the owner's most recent day boundary.
  Today,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
  pub range: TimeWindow,
  pub span:  Span,
}

impl ReportWindow {
  /// `[now − days·24h, now]`. `days` must be positive.
  pub fn last_days(now: DateTime<Utc>, days: i64) -> Result<Self> {
    let count = u32::try_from(days)
      .ok()
      .filter(|d| *d > 0)
      .ok_or(Error::InvalidWindow(days))?;
    let start = TimeDelta::try_days(days)
      .and_then(|delta| now.checked_sub_signed(delta))
      .ok_or(Error::InvalidWindow(days))?;
    Ok(Self { range: TimeWindow::new(start, now), span: Span::Days(count) })
  }

  /// From the owner's current day boundary up to `now`.
  pub fn today(now: DateTime<Utc>, prefs: &UserPreferences) -> Self {
    Self {
      range: TimeWindow::new(prefs.current_day_start(now), now),
      span:  Span::Today,
    }
  }

  /// One-day reports carry a total line.
  pub fn is_single_day(&self) -> bool { matches!(self.span, Span::Days(1) | Span::Today) }
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
  pub at:       DateTime<Utc>,
  pub name:     String,
  pub quantity: i64,
  pub energy:   i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
  pub window:       ReportWindow,
  /// Oldest first.
  pub rows:         Vec<ReportRow>,
  pub total_energy: i64,
  /// Events dropped because their fact could not be resolved.
  pub skipped:      usize,
}

impl Report {
  /// Build rows from events given newest first, as the ledger returns them.
  pub fn assemble(
    window: ReportWindow,
    events: &[LedgerEvent],
    facts: &HashMap<Uuid, NutritionFact>,
  ) -> Self {
    let mut rows = Vec::with_capacity(events.len());
    let mut total_energy: i64 = 0;
    let mut skipped = 0;

    for event in events.iter().rev() {
      let Some(fact) = facts.get(&event.fact_id) else {
        tracing::warn!(
          event_id = %event.event_id,
          fact_id = %event.fact_id,
          "skipping ledger event with unresolved nutrition fact"
        );
        skipped += 1;
        continue;
      };
      let energy = fact.energy_for(event.quantity.get());
      total_energy = total_energy.saturating_add(energy);
      rows.push(ReportRow {
        at: event.created_at,
        name: fact.name.clone(),
        quantity: event.quantity.get(),
        energy,
      });
    }

    Self { window, rows, total_energy, skipped }
  }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// HTML-marked text: a title, a `<pre>` table and, for one-day windows, the
  /// total. An empty report is a single "no records" line.
  pub fn render(&self) -> String {
    if self.is_empty() {
      return match self.window.span {
        Span::Days(n) => format!("No records found for the last {n} days"),
        Span::Today => "No records found for today".to_owned(),
      };
    }

    let mut out = String::new();
    if self.window.is_single_day() {
      out.push_str("<b>Today's records:</b>\n\n");
    } else if let Span::Days(n) = self.window.span {
      let _ = write!(out, "<b>Records for last {n} days:</b>\n\n");
    }

    out.push_str("<pre>");
    out.push_str(HEADER);
    out.push_str(SEPARATOR);
    for row in &self.rows {
      let _ = writeln!(
        out,
        "{} │ {} │ {:<4}",
        row.at.format("%d-%m %H:%M"),
        escape_html(&centre(&row.name, NAME_WIDTH)),
        row.energy,
      );
    }
    out.push_str("</pre>");

    if self.window.is_single_day() {
      let _ = write!(out, "\n\n📋 <b>Total: {} kcal</b>", self.total_energy);
    }
    out
  }
}

/// Truncate `name` to `width` characters, then pad it on both sides so the
/// result is exactly `width` characters; the left pad is the smaller half.
pub fn centre(name: &str, width: usize) -> String {
  let truncated: String = name.chars().take(width).collect();
  let len = truncated.chars().count();
  let left = (width - len) / 2;
  let right = width - len - left;
  format!("{:left$}{truncated}{:right$}", "", "")
}

fn escape_html(raw: &str) -> String {
  raw
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Query the window, resolve each distinct fact once, and assemble the report.
///
/// A fact that no longer resolves drops its rows; a storage failure aborts.
pub async fn build_report<S>(
  store: &S,
  owner: &str,
  window: ReportWindow,
) -> Result<Report, S::Error>
where
  S: IntakeStore,
{
  let events = store.query_window(owner, window.range).await?;

  let mut facts: HashMap<Uuid, NutritionFact> = HashMap::new();
  let mut missing: Vec<Uuid> = Vec::new();
  for event in &events {
    if facts.contains_key(&event.fact_id) || missing.contains(&event.fact_id) {
      continue;
    }
    match store.get_fact(event.fact_id).await? {
      Some(fact) => {
        facts.insert(fact.fact_id, fact);
      }
      None => missing.push(event.fact_id),
    }
  }

  let report = Report::assemble(window, &events, &facts);
  tracing::debug!(
    owner,
    rows = report.rows.len(),
    skipped = report.skipped,
    total = report.total_energy,
    "built report"
  );
  Ok(report)
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveTime, TimeZone};

  use super::*;
  use crate::ledger::Quantity;

  fn at(h: u32, m: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, 7, h, m, 0).unwrap() }

  fn fact(name: &str, energy: i64) -> NutritionFact {
    NutritionFact {
      fact_id: Uuid::new_v4(),
      name: name.into(),
      energy,
      protein: 0,
      fat: 0,
      carbs: 0,
      created_at: at(0, 0),
    }
  }

  fn event(fact_id: Uuid, quantity: i64, created_at: DateTime<Utc>) -> LedgerEvent {
    LedgerEvent {
      event_id: Uuid::new_v4(),
      fact_id,
      quantity: Quantity::new(quantity).unwrap(),
      owner: "alice".into(),
      created_at,
    }
  }

  fn index(facts: &[&NutritionFact]) -> HashMap<Uuid, NutritionFact> {
    facts.iter().map(|f| (f.fact_id, (*f).clone())).collect()
  }

  #[test]
  fn centre_pads_left_with_smaller_half() {
    for name in ["", "a", "ab", "Chicken", "fourteen chars"] {
      let out = centre(name, NAME_WIDTH);
      let len = name.chars().count();
      let left = (NAME_WIDTH - len) / 2;
      assert_eq!(out.chars().count(), NAME_WIDTH, "{name:?}");
      assert_eq!(&out[..left], " ".repeat(left), "{name:?}");
      assert_eq!(&out[left..left + name.len()], name);
    }
    assert_eq!(centre("Chicken", NAME_WIDTH), "    Chicken    ");
    assert_eq!(centre("ab", NAME_WIDTH), "      ab       ");
  }

  #[test]
  fn centre_truncates_long_names_by_character() {
    assert_eq!(centre("Chicken breast grilled", NAME_WIDTH), "Chicken breast ");
    assert_eq!(centre("Пельмени домашние сибирские", NAME_WIDTH), "Пельмени домашн");
  }

  #[test]
  fn last_days_window() {
    let now = at(12, 0);
    let w = ReportWindow::last_days(now, 3).unwrap();
    assert_eq!(w.range.end, now);
    assert_eq!(w.range.start, now - TimeDelta::days(3));
    assert!(!w.is_single_day());
    assert!(ReportWindow::last_days(now, 1).unwrap().is_single_day());
  }

  #[test]
  fn last_days_rejects_non_positive_and_huge() {
    let now = at(12, 0);
    assert!(matches!(ReportWindow::last_days(now, 0), Err(Error::InvalidWindow(0))));
    assert!(matches!(ReportWindow::last_days(now, -4), Err(Error::InvalidWindow(-4))));
    assert!(matches!(
      ReportWindow::last_days(now, 999_999_999),
      Err(Error::InvalidWindow(999_999_999))
    ));
    assert!(ReportWindow::last_days(now, i64::MAX).is_err());
  }

  #[test]
  fn today_window_uses_day_boundary() {
    let mut prefs = UserPreferences::defaults("alice");
    prefs.day_boundary = NaiveTime::from_hms_opt(4, 0, 0).unwrap();
    let w = ReportWindow::today(at(2, 0), &prefs);
    assert_eq!(w.range.start, at(4, 0) - TimeDelta::days(1));
    assert!(w.is_single_day());
  }

  #[test]
  fn assemble_orders_oldest_first_and_totals() {
    let chicken = fact("Chicken", 165);
    let apple = fact("Apple", 52);
    let facts = index(&[&chicken, &apple]);
    // newest first, as the ledger returns them
    let events = [event(apple.fact_id, 1, at(9, 30)), event(chicken.fact_id, 2, at(8, 0))];

    let report = Report::assemble(ReportWindow::last_days(at(12, 0), 1).unwrap(), &events, &facts);
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0].name, "Chicken");
    assert_eq!(report.rows[0].energy, 330);
    assert_eq!(report.rows[1].name, "Apple");
    assert_eq!(report.total_energy, 382);
  }

  #[test]
  fn assemble_skips_unresolved_facts() {
    let apple = fact("Apple", 52);
    let facts = index(&[&apple]);
    let events = [event(Uuid::new_v4(), 1, at(10, 0)), event(apple.fact_id, 1, at(9, 0))];

    let report = Report::assemble(ReportWindow::last_days(at(12, 0), 1).unwrap(), &events, &facts);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.total_energy, 52);
  }

  #[test]
  fn render_single_day_with_total() {
    let chicken = fact("Chicken", 165);
    let facts = index(&[&chicken]);
    let events = [event(chicken.fact_id, 2, at(8, 5))];
    let report = Report::assemble(ReportWindow::last_days(at(12, 0), 1).unwrap(), &events, &facts);

    let expected = "<b>Today's records:</b>\n\n<pre>\
      date & time │      name       │ kcal\n\
      ────────────┼─────────────────┼─────\n\
      07-03 08:05 │     Chicken     │ 330 \n\
      </pre>\n\n📋 <b>Total: 330 kcal</b>";
    assert_eq!(report.render(), expected);
  }

  #[test]
  fn render_multi_day_has_no_total() {
    let chicken = fact("Chicken", 165);
    let facts = index(&[&chicken]);
    let events = [event(chicken.fact_id, 1, at(8, 5))];
    let report = Report::assemble(ReportWindow::last_days(at(12, 0), 3).unwrap(), &events, &facts);

    let text = report.render();
    assert!(text.starts_with("<b>Records for last 3 days:</b>"));
    assert!(text.ends_with("</pre>"));
    assert!(!text.contains("Total"));
  }

  #[test]
  fn render_empty_report() {
    let report = Report::assemble(ReportWindow::last_days(at(12, 0), 1).unwrap(), &[], &HashMap::new());
    assert_eq!(report.render(), "No records found for the last 1 days");

    let prefs = UserPreferences::defaults("alice");
    let report = Report::assemble(ReportWindow::today(at(12, 0), &prefs), &[], &HashMap::new());
    assert_eq!(report.render(), "No records found for today");
  }

  #[test]
  fn render_escapes_markup_in_names() {
    let odd = fact("<b>&", 10);
    let facts = index(&[&odd]);
    let events = [event(odd.fact_id, 1, at(8, 0))];
    let report = Report::assemble(ReportWindow::last_days(at(12, 0), 2).unwrap(), &events, &facts);
    assert!(report.render().contains("&lt;b&gt;&amp;"));
  }
}
