//! Slash commands.
//!
//! | Command | Arguments |
//! |---------|-----------|
//! | `/start`, `/help`, `/ping`, `/menu`, `/settings`, `/today` | none |
//! | `/get` | `[days]` |
//! | `/record` | `<name> <kcal> [protein] [fat] [carbs]` |
//! | `/log` | `<fact-id> [quantity]` |
//! | `/folder` | `<path> [label…]` |
//! | `/item` | `<path> <fact-id> [label…]` |
//! | `/set_noon` | `<HH:MM>` |
//! | `/set_lang` | `<en\|ru>` |

use chrono::Utc;
use cmeter_core::{
  Error as CoreError,
  catalog::NewNode,
  ledger::Quantity,
  nav,
  nutrition::NewFact,
  path::{CatalogPath, Segment},
  prefs::{Locale, UserPreferences, parse_time_of_day},
  report::{ReportWindow, build_report},
  store::IntakeStore,
};
use uuid::Uuid;

use super::consume;
use crate::{
  error::{Error, Result},
  transport::Reply,
};

pub const UNKNOWN_COMMAND: &str = "Unknown command. Use /help to see available commands.";

const WELCOME: &str = "Welcome to C-Meter! 👋\n\nUse /help to see available commands.";

const HELP: &str = "Available commands:

/start - Start the bot
/help - Show this help message
/ping - Check database connection and schema version
/get [days] - Get your entries (default: 1 day)
/today - Get today's entries
/record <name> <kcal> [proteins] [fats] [carbs] - Add a food record
/log <fact-id> [quantity] - Log a known food again
/folder <path> [label] - Add a catalog folder
/item <path> <fact-id> [label] - Add a catalog item
/menu - Browse your catalog
/settings - Show your settings
/set_noon <HH:MM> - Set your day flip time (default: 00:00)
/set_lang <lang> - Set your language (ru/en)";

const DAYS_USAGE: &str = "Please provide a valid number of days (positive integer)";
const RECORD_USAGE: &str = "Usage: /record <name> <kcal> [proteins] [fats] [carbs]\nExample: /record \"Chicken Breast\" 165 31 3 0";
const LOG_USAGE: &str = "Usage: /log <fact-id> [quantity]";
const FOLDER_USAGE: &str = "Usage: /folder <path> [label]\nExample: /folder kitchen.fridge \"Fridge\"";
const ITEM_USAGE: &str = "Usage: /item <path> <fact-id> [label]\nExample: /item kitchen.fridge.milk <fact-id> Milk";
const SET_NOON_USAGE: &str = "Usage: /set_noon <HH:MM>\nExample: /set_noon 03:00";
const SET_LANG_USAGE: &str = "Usage: /set_lang <lang>\nExample: /set_lang ru\nSupported: ru, en";

/// Run the command `name` for `owner`. Never fails: errors become replies.
pub async fn run<S: IntakeStore>(store: &S, owner: &str, name: &str, args: &[String]) -> Reply {
  tracing::debug!(owner, command = name, argc = args.len(), "handling command");

  let result = match name {
    "start" => Ok(Reply::text(WELCOME)),
    "help" => Ok(Reply::text(HELP)),
    "ping" => ping(store).await,
    "get" => get(store, owner, args).await,
    "today" => today(store, owner).await,
    "record" => record(store, owner, args).await,
    "log" => log(store, owner, args).await,
    "folder" => folder(store, owner, args).await,
    "item" => item(store, owner, args).await,
    "set_noon" => set_noon(store, owner, args).await,
    "set_lang" => set_lang(store, owner, args).await,
    "settings" => settings(store, owner).await,
    "menu" => Ok(nav::main_menu().into()),
    _ => Ok(Reply::text(UNKNOWN_COMMAND)),
  };

  result.unwrap_or_else(Error::into_reply)
}

// ─── Diagnostics ──────────────────────────────────────────────────────────────

async fn ping<S: IntakeStore>(store: &S) -> Result<Reply> {
  let version = store.schema_version().await.map_err(Error::from_store)?;
  Ok(Reply::text(format!("✅ Database connected\n📦 Schema version: {version}")))
}

// ─── Reports ──────────────────────────────────────────────────────────────────

async fn get<S: IntakeStore>(store: &S, owner: &str, args: &[String]) -> Result<Reply> {
  let days = match args.first() {
    None => 1,
    Some(raw) => raw
      .parse::<i64>()
      .ok()
      .filter(|d| *d > 0)
      .ok_or_else(|| Error::usage(DAYS_USAGE))?,
  };
  report(store, owner, ReportWindow::last_days(Utc::now(), days)?).await
}

async fn today<S: IntakeStore>(store: &S, owner: &str) -> Result<Reply> {
  let prefs = preferences(store, owner).await?;
  report(store, owner, ReportWindow::today(Utc::now(), &prefs)).await
}

async fn report<S: IntakeStore>(store: &S, owner: &str, window: ReportWindow) -> Result<Reply> {
  let report = build_report(store, owner, window).await.map_err(Error::from_store)?;
  let text = report.render();
  Ok(if report.is_empty() { Reply::text(text) } else { Reply::html(text) })
}

// ─── Facts and ledger ─────────────────────────────────────────────────────────

async fn record<S: IntakeStore>(store: &S, owner: &str, args: &[String]) -> Result<Reply> {
  let [name, energy, macros @ ..] = args else {
    return Err(Error::usage(RECORD_USAGE));
  };

  let energy = energy
    .parse::<i64>()
    .ok()
    .filter(|v| *v > 0)
    .ok_or_else(|| Error::usage("Calories must be a positive number"))?;
  let protein = non_negative(macros.first(), "Proteins")?;
  let fat = non_negative(macros.get(1), "Fats")?;
  let carbs = non_negative(macros.get(2), "Carbs")?;

  let fact = store
    .record_fact(NewFact::new(name.as_str(), energy).with_macros(protein, fat, carbs))
    .await
    .map_err(Error::from_store)?;
  let event = store
    .append_event(owner, fact.fact_id, Quantity::ONE)
    .await
    .map_err(Error::from_store)?;

  tracing::info!(owner, fact = %fact.fact_id, event = %event.event_id, "fact recorded");
  Ok(Reply::text(format!(
    "✅ Recorded: {}\n📊 Calories: {}\nID: {}",
    fact.name, fact.energy, fact.fact_id
  )))
}

fn non_negative(raw: Option<&String>, label: &str) -> Result<i64> {
  match raw {
    None => Ok(0),
    Some(raw) => raw
      .parse::<i64>()
      .ok()
      .filter(|v| *v >= 0)
      .ok_or_else(|| Error::usage(format!("{label} must be a non-negative number"))),
  }
}

async fn log<S: IntakeStore>(store: &S, owner: &str, args: &[String]) -> Result<Reply> {
  let Some(raw_id) = args.first() else {
    return Err(Error::usage(LOG_USAGE));
  };
  let fact_id = fact_id(raw_id)?;
  let quantity = match args.get(1) {
    None => Quantity::ONE,
    Some(raw) => raw
      .parse::<i64>()
      .ok()
      .and_then(|q| Quantity::new(q).ok())
      .ok_or_else(|| Error::usage("Quantity must be a positive number"))?,
  };

  let fact = store
    .get_fact(fact_id)
    .await
    .map_err(Error::from_store)?
    .ok_or(CoreError::FactNotFound(fact_id))?;
  Ok(Reply::text(consume(store, owner, &fact, quantity).await?))
}

fn fact_id(raw: &str) -> Result<Uuid> {
  Uuid::parse_str(raw).map_err(|_| Error::usage(format!("Invalid fact id: {raw}")))
}

// ─── Catalog ──────────────────────────────────────────────────────────────────

/// Split a non-root path into its parent and final segment.
fn target(raw: &str, usage: &str) -> Result<(CatalogPath, Segment)> {
  let path = CatalogPath::parse(raw)?;
  let segment = path.last().cloned().ok_or_else(|| Error::usage(usage))?;
  Ok((path.parent(), segment))
}

async fn folder<S: IntakeStore>(store: &S, owner: &str, args: &[String]) -> Result<Reply> {
  let [raw_path, label @ ..] = args else {
    return Err(Error::usage(FOLDER_USAGE));
  };
  let (parent, segment) = target(raw_path, FOLDER_USAGE)?;

  let node = store
    .create_node(NewNode::folder(owner, parent, segment).with_display_name(label.join(" ")))
    .await
    .map_err(Error::from_store)?;
  Ok(Reply::text(format!("✅ Folder created: {}", node.path)))
}

async fn item<S: IntakeStore>(store: &S, owner: &str, args: &[String]) -> Result<Reply> {
  let [raw_path, raw_id, label @ ..] = args else {
    return Err(Error::usage(ITEM_USAGE));
  };
  let (parent, segment) = target(raw_path, ITEM_USAGE)?;
  let fact_id = fact_id(raw_id)?;

  let fact = store
    .get_fact(fact_id)
    .await
    .map_err(Error::from_store)?
    .ok_or(CoreError::FactNotFound(fact_id))?;

  let label = if label.is_empty() { fact.name.clone() } else { label.join(" ") };
  let node = store
    .create_node(NewNode::leaf(owner, parent, segment, fact_id).with_display_name(label))
    .await
    .map_err(Error::from_store)?;
  Ok(Reply::text(format!("✅ Item created: {} → {}", node.path, fact.name)))
}

// ─── Preferences ──────────────────────────────────────────────────────────────

async fn preferences<S: IntakeStore>(store: &S, owner: &str) -> Result<UserPreferences> {
  Ok(
    store
      .get_preferences(owner)
      .await
      .map_err(Error::from_store)?
      .unwrap_or_else(|| UserPreferences::defaults(owner)),
  )
}

async fn set_noon<S: IntakeStore>(store: &S, owner: &str, args: &[String]) -> Result<Reply> {
  let Some(raw) = args.first() else {
    return Err(Error::usage(SET_NOON_USAGE));
  };
  let boundary = parse_time_of_day(raw)
    .map_err(|_| Error::usage("Invalid time format. Use HH:MM (e.g., 03:00)"))?;

  store.set_day_boundary(owner, boundary).await.map_err(Error::from_store)?;
  Ok(Reply::text(format!("✅ Day flip time set to {raw}")))
}

async fn set_lang<S: IntakeStore>(store: &S, owner: &str, args: &[String]) -> Result<Reply> {
  let Some(raw) = args.first() else {
    return Err(Error::usage(SET_LANG_USAGE));
  };
  let locale: Locale = raw
    .parse()
    .map_err(|_| Error::usage("Unsupported language. Available: ru, en"))?;

  store.set_locale(owner, locale).await.map_err(Error::from_store)?;
  Ok(Reply::text(format!("✅ Language set to {locale}")))
}

async fn settings<S: IntakeStore>(store: &S, owner: &str) -> Result<Reply> {
  let prefs = preferences(store, owner).await?;
  Ok(Reply::text(format!(
    "⚙️ Settings\n\nDay flip time: {}\nLanguage: {}",
    prefs.day_boundary.format("%H:%M"),
    prefs.locale
  )))
}
