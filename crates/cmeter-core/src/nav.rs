//! Stateless catalog navigation.
//!
//! The only state is `Level(path)`, and it is never kept between requests:
//! every button carries the path it leads to in its token, and [`decode`]
//! recovers it on the next press. [`enter`] turns one catalog level into a
//! screen of buttons.
//!
//! Token format:
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `menu_locations` | open the root level |
//! | `nav:<path>` | open `<path>` (the empty path is the root) |
//! | `add:<path>` | add an item under `<path>` (reserved) |

use serde::{Deserialize, Serialize};

use crate::{Error, Result, catalog::CatalogNode, path::CatalogPath};

pub const LOCATIONS_TOKEN: &str = "menu_locations";
pub const NAV_PREFIX: &str = "nav:";
pub const ADD_PREFIX: &str = "add:";

const ROOT_TITLE: &str = "📍 Locations";
const EMPTY_NOTE: &str = "\n\n(Empty - click ➕ to add items)";

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// A decoded button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
  /// Show the level below `path`.
  Level(CatalogPath),
  /// Start adding an item under `path`.
  Add(CatalogPath),
}

pub fn nav_token(path: &CatalogPath) -> String { format!("{NAV_PREFIX}{path}") }

pub fn add_token(path: &CatalogPath) -> String { format!("{ADD_PREFIX}{path}") }

/// Parse a button token. Some transports prepend a single control character
/// to button data; it is ignored.
pub fn decode(token: &str) -> Result<NavAction> {
  let cleaned = token
    .strip_prefix(|c: char| u32::from(c) < 32)
    .unwrap_or(token);

  if cleaned == LOCATIONS_TOKEN {
    return Ok(NavAction::Level(CatalogPath::root()));
  }

  let unrecognized = || Error::UnrecognizedAction(cleaned.to_owned());
  if let Some(raw) = cleaned.strip_prefix(NAV_PREFIX) {
    return CatalogPath::parse(raw)
      .map(NavAction::Level)
      .map_err(|_| unrecognized());
  }
  if let Some(raw) = cleaned.strip_prefix(ADD_PREFIX) {
    return CatalogPath::parse(raw)
      .map(NavAction::Add)
      .map_err(|_| unrecognized());
  }
  Err(unrecognized())
}

// ─── Screen ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordanceKind {
  Folder,
  Leaf,
  Add,
  Back,
  Locations,
}

/// One labelled button and the token it sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affordance {
  pub label: String,
  pub token: String,
  pub kind:  AffordanceKind,
}

/// A rendered level: a title and rows of buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
  pub title: String,
  pub rows:  Vec<Vec<Affordance>>,
}

impl Screen {
  pub fn affordances(&self) -> impl Iterator<Item = &Affordance> { self.rows.iter().flatten() }

  pub fn find(&self, kind: AffordanceKind) -> Option<&Affordance> {
    self.affordances().find(|a| a.kind == kind)
  }
}

/// The main menu: a single entry into the locations root.
pub fn main_menu() -> Screen {
  Screen {
    title: "Main Menu:".to_owned(),
    rows:  vec![vec![Affordance {
      label: ROOT_TITLE.to_owned(),
      token: LOCATIONS_TOKEN.to_owned(),
      kind:  AffordanceKind::Locations,
    }]],
  }
}

/// Build the screen for `Level(path)` from the nodes listed at that level.
pub fn enter(path: &CatalogPath, nodes: &[CatalogNode]) -> Screen {
  let mut rows: Vec<Vec<Affordance>> = nodes
    .iter()
    .map(|node| {
      let (icon, kind) = if node.is_leaf() {
        ("🍽️", AffordanceKind::Leaf)
      } else {
        ("📁", AffordanceKind::Folder)
      };
      vec![Affordance {
        label: format!("{icon} {}", node.display_name),
        token: nav_token(&node.path),
        kind,
      }]
    })
    .collect();

  rows.push(vec![Affordance {
    label: "➕ Add item".to_owned(),
    token: add_token(path),
    kind:  AffordanceKind::Add,
  }]);

  if !path.is_root() {
    rows.push(vec![Affordance {
      label: "⬅️ Back".to_owned(),
      token: nav_token(&path.parent()),
      kind:  AffordanceKind::Back,
    }]);
  }

  let mut title = if path.is_root() {
    ROOT_TITLE.to_owned()
  } else {
    format!("📂 {path}")
  };
  if nodes.is_empty() {
    title.push_str(EMPTY_NOTE);
  }

  Screen { title, rows }
}
