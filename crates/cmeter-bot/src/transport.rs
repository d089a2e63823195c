//! JSON shapes exchanged with the chat transport.
//!
//! The transport posts one [`Inbound`] per user action to `POST /events` and
//! relays the returned [`Reply`] to the user.

use cmeter_core::{identity::Actor, nav::Screen};
use serde::{Deserialize, Serialize};

// ─── Inbound ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inbound {
  /// A pre-parsed command: `name` without the leading slash.
  Command {
    actor: Actor,
    name:  String,
    #[serde(default)]
    args:  Vec<String>,
  },
  /// A raw command line such as `/record "Chicken Breast" 165`.
  Message { actor: Actor, text: String },
  /// A button press carrying its token.
  Press { actor: Actor, token: String },
}

impl Inbound {
  pub fn actor(&self) -> &Actor {
    match self {
      Inbound::Command { actor, .. } | Inbound::Message { actor, .. } | Inbound::Press { actor, .. } => {
        actor
      }
    }
  }
}

/// Split a command line into its name and arguments.
///
/// The name loses its leading `/` and any `@bot` suffix. Returns `None` when
/// `text` is not a command.
pub fn parse_command_line(text: &str) -> Option<(String, Vec<String>)> {
  let rest = text.trim_start().strip_prefix('/')?;
  let (head, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
  let name = head.split('@').next().unwrap_or(head);
  if name.is_empty() {
    return None;
  }
  Some((name.to_owned(), split_args(tail)))
}

/// Split on whitespace, keeping double-quoted runs together.
pub fn split_args(raw: &str) -> Vec<String> {
  let mut args = Vec::new();
  let mut current = String::new();
  let mut quoted = false;
  let mut pending = false;

  for c in raw.chars() {
    match c {
      '"' => {
        quoted = !quoted;
        pending = true;
      }
      c if c.is_whitespace() && !quoted => {
        if pending {
          args.push(std::mem::take(&mut current));
          pending = false;
        }
      }
      c => {
        current.push(c);
        pending = true;
      }
    }
  }
  if pending {
    args.push(current);
  }
  args
}

// ─── Outbound ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
  pub label: String,
  pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
  /// A chat message. `html` marks text carrying `<b>`/`<pre>` markup.
  Text { text: String, html: bool },
  /// A message with an inline keyboard.
  Keyboard { text: String, rows: Vec<Vec<Button>> },
  /// A transient acknowledgement of a button press.
  Notice { text: String },
}

impl Reply {
  pub fn text(text: impl Into<String>) -> Self { Reply::Text { text: text.into(), html: false } }

  pub fn html(text: impl Into<String>) -> Self { Reply::Text { text: text.into(), html: true } }

  pub fn notice(text: impl Into<String>) -> Self { Reply::Notice { text: text.into() } }

  pub fn body(&self) -> &str {
    match self {
      Reply::Text { text, .. } | Reply::Keyboard { text, .. } | Reply::Notice { text } => text,
    }
  }
}

impl From<Screen> for Reply {
  fn from(screen: Screen) -> Self {
    Reply::Keyboard {
      text: screen.title,
      rows: screen
        .rows
        .into_iter()
        .map(|row| {
          row
            .into_iter()
            .map(|a| Button { label: a.label, token: a.token })
            .collect()
        })
        .collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quoted_arguments_stay_whole() {
    assert_eq!(split_args(r#""Chicken Breast" 165 31"#), ["Chicken Breast", "165", "31"]);
    assert_eq!(split_args("  a   b "), ["a", "b"]);
    assert_eq!(split_args(r#"x "" y"#), ["x", "", "y"]);
    assert!(split_args("   ").is_empty());
  }

  #[test]
  fn command_line_strips_slash_and_mention() {
    let (name, args) = parse_command_line("/get@cmeter_bot 3").unwrap();
    assert_eq!(name, "get");
    assert_eq!(args, ["3"]);

    let (name, args) = parse_command_line("/today").unwrap();
    assert_eq!(name, "today");
    assert!(args.is_empty());

    assert!(parse_command_line("hello").is_none());
    assert!(parse_command_line("/").is_none());
  }

  #[test]
  fn inbound_wire_shapes() {
    let press: Inbound = serde_json::from_str(
      r#"{"kind":"press","actor":{"id":7,"username":null},"token":"nav:a.b"}"#,
    )
    .unwrap();
    assert_eq!(press.actor().login(), "user_7");

    let cmd: Inbound =
      serde_json::from_str(r#"{"kind":"command","actor":{"id":1,"username":"bob"},"name":"ping"}"#)
        .unwrap();
    assert!(matches!(cmd, Inbound::Command { ref args, .. } if args.is_empty()));
  }

  #[test]
  fn reply_wire_shape() {
    let json = serde_json::to_value(Reply::html("<b>x</b>")).unwrap();
    assert_eq!(json, serde_json::json!({"kind": "text", "text": "<b>x</b>", "html": true}));
  }
}
