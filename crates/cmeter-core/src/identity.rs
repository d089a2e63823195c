//! Identity resolution at the transport boundary.
//!
//! Core operations never see transport users, only the login string computed
//! here.

use serde::{Deserialize, Serialize};

/// The sender of an inbound event as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub id:       i64,
  #[serde(default)]
  pub username: Option<String>,
}

impl Actor {
  /// Stable per-user login: the handle when there is one, otherwise a name
  /// derived from the numeric id.
  pub fn login(&self) -> String {
    match self.username.as_deref() {
      Some(name) if !name.is_empty() => name.to_owned(),
      _ => format!("user_{}", self.id),
    }
  }
}
