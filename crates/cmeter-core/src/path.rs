//! Materialized catalog paths.
//!
//! A path is an ordered list of [`Segment`]s and is stored as the segments
//! joined with `.`. The empty path is the root; it never names a node itself.
//! Because segments cannot contain `.`, every descendant of `a.b` serialises
//! with the prefix `a.b.`, which is what lets backends answer level and
//! subtree queries with a sorted-range scan.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Separator between segments in the serialised form.
pub const SEPARATOR: char = '.';

// ─── Segment ─────────────────────────────────────────────────────────────────

/// One name-safe path token: ASCII letters, digits, `_` and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Segment(String);

impl Segment {
  pub const MAX_LEN: usize = 255;

  pub fn new(raw: impl Into<String>) -> Result<Self> {
    let raw = raw.into();
    let valid = !raw.is_empty()
      && raw.len() <= Self::MAX_LEN
      && raw
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid { Ok(Self(raw)) } else { Err(Error::InvalidSegment(raw)) }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Segment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl FromStr for Segment {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::new(s) }
}

impl TryFrom<String> for Segment {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::new(s) }
}

impl From<Segment> for String {
  fn from(s: Segment) -> Self { s.0 }
}

// ─── CatalogPath ─────────────────────────────────────────────────────────────

/// The address of a catalog node; its length is the node's depth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CatalogPath(Vec<Segment>);

impl CatalogPath {
  pub fn root() -> Self { Self(Vec::new()) }

  /// Parse the dotted form. The empty string is the root.
  pub fn parse(raw: &str) -> Result<Self> {
    if raw.is_empty() {
      return Ok(Self::root());
    }
    raw
      .split(SEPARATOR)
      .map(Segment::new)
      .collect::<Result<Vec<_>>>()
      .map(Self)
  }

  pub fn is_root(&self) -> bool { self.0.is_empty() }

  pub fn depth(&self) -> usize { self.0.len() }

  pub fn segments(&self) -> &[Segment] { &self.0 }

  pub fn last(&self) -> Option<&Segment> { self.0.last() }

  /// This path with `segment` appended.
  pub fn child(&self, segment: Segment) -> Self {
    let mut segments = self.0.clone();
    segments.push(segment);
    Self(segments)
  }

  /// Strip the last segment. The root is its own parent.
  pub fn parent(&self) -> Self {
    let keep = self.0.len().saturating_sub(1);
    Self(self.0[..keep].to_vec())
  }
}

impl fmt::Display for CatalogPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, segment) in self.0.iter().enumerate() {
      if i > 0 {
        write!(f, "{SEPARATOR}")?;
      }
      f.write_str(segment.as_str())?;
    }
    Ok(())
  }
}

impl FromStr for CatalogPath {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for CatalogPath {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<CatalogPath> for String {
  fn from(p: CatalogPath) -> Self { p.to_string() }
}

impl FromIterator<Segment> for CatalogPath {
  fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

// ─── PathPattern ─────────────────────────────────────────────────────────────

/// One item of a [`PathPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternItem {
  Literal(Segment),
  /// `*` — zero or more segments.
  AnyRun,
  /// `*{n}` — exactly `n` segments.
  Exactly(usize),
}

/// A dotted pattern over catalog paths, e.g. `kitchen.*` or `kitchen.*{1}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
  items: Vec<PatternItem>,
}

impl PathPattern {
  pub fn parse(raw: &str) -> Result<Self> {
    if raw.is_empty() {
      return Err(Error::InvalidPattern(raw.to_owned()));
    }
    let items = raw
      .split(SEPARATOR)
      .map(|item| parse_item(item).ok_or_else(|| Error::InvalidPattern(raw.to_owned())))
      .collect::<Result<Vec<_>>>()?;
    Ok(Self { items })
  }

  /// The leading literal segments. Every match lies in this prefix's subtree.
  pub fn literal_prefix(&self) -> CatalogPath {
    self
      .items
      .iter()
      .map_while(|item| match item {
        PatternItem::Literal(s) => Some(s.clone()),
        _ => None,
      })
      .collect()
  }

  pub fn matches(&self, path: &CatalogPath) -> bool {
    matches_from(&self.items, path.segments())
  }
}

fn parse_item(raw: &str) -> Option<PatternItem> {
  if raw == "*" {
    return Some(PatternItem::AnyRun);
  }
  if let Some(count) = raw.strip_prefix("*{").and_then(|r| r.strip_suffix('}')) {
    return count.parse().ok().map(PatternItem::Exactly);
  }
  Segment::new(raw).ok().map(PatternItem::Literal)
}

/// Sweep the items left to right, tracking every segment offset the prefix of
/// the pattern can end at. Linear in `items × segments`.
fn matches_from(items: &[PatternItem], segments: &[Segment]) -> bool {
  let n = segments.len();
  let mut reach = vec![false; n + 1];
  reach[0] = true;

  for item in items {
    let mut next = vec![false; n + 1];
    match item {
      PatternItem::Literal(lit) => {
        for (i, seg) in segments.iter().enumerate() {
          next[i + 1] = reach[i] && seg == lit;
        }
      }
      PatternItem::Exactly(k) => {
        for i in 0..=n {
          if let Some(j) = i.checked_add(*k).filter(|j| *j <= n) {
            next[j] = reach[i];
          }
        }
      }
      PatternItem::AnyRun => {
        let mut seen = false;
        for (slot, reached) in next.iter_mut().zip(&reach) {
          seen |= *reached;
          *slot = seen;
        }
      }
    }
    if !next.contains(&true) {
      return false;
    }
    reach = next;
  }
  reach[n]
}

impl fmt::Display for PathPattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, item) in self.items.iter().enumerate() {
      if i > 0 {
        write!(f, "{SEPARATOR}")?;
      }
      match item {
        PatternItem::Literal(s) => f.write_str(s.as_str())?,
        PatternItem::AnyRun => f.write_str("*")?,
        PatternItem::Exactly(n) => write!(f, "*{{{n}}}")?,
      }
    }
    Ok(())
  }
}

impl FromStr for PathPattern {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}
