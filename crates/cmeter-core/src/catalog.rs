//! Catalog nodes — the entries of a user's location hierarchy.
//!
//! A node bound to a nutrition fact is a leaf (a selectable food item); an
//! unbound node is a folder. Nodes are owned by exactly one login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::path::{CatalogPath, Segment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogNode {
  pub node_id:      Uuid,
  pub owner:        String,
  pub path:         CatalogPath,
  pub display_name: String,
  /// Leaf binding. `None` makes the node a folder.
  pub fact_id:      Option<Uuid>,
  pub created_at:   DateTime<Utc>,
}

impl CatalogNode {
  pub fn is_leaf(&self) -> bool { self.fact_id.is_some() }

  pub fn depth(&self) -> usize { self.path.depth() }
}

/// Input to [`IntakeStore::create_node`](crate::store::IntakeStore::create_node).
#[derive(Debug, Clone)]
pub struct NewNode {
  pub owner:        String,
  pub parent:       CatalogPath,
  pub segment:      Segment,
  pub display_name: String,
  pub fact_id:      Option<Uuid>,
}

impl NewNode {
  /// A folder labelled with its own segment.
  pub fn folder(owner: impl Into<String>, parent: CatalogPath, segment: Segment) -> Self {
    Self {
      owner: owner.into(),
      parent,
      display_name: segment.to_string(),
      segment,
      fact_id: None,
    }
  }

  /// A leaf bound to `fact_id`, labelled with its own segment.
  pub fn leaf(
    owner: impl Into<String>,
    parent: CatalogPath,
    segment: Segment,
    fact_id: Uuid,
  ) -> Self {
    Self { fact_id: Some(fact_id), ..Self::folder(owner, parent, segment) }
  }

  /// Replace the label; a blank label keeps the segment.
  pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
    let name = name.into();
    if !name.trim().is_empty() {
      self.display_name = name.trim().to_owned();
    }
    self
  }

  /// The path the node will occupy.
  pub fn path(&self) -> CatalogPath { self.parent.child(self.segment.clone()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_node_path_and_labels() {
    let parent = CatalogPath::parse("kitchen").unwrap();
    let node = NewNode::folder("alice", parent, Segment::new("fridge").unwrap());
    assert_eq!(node.path().to_string(), "kitchen.fridge");
    assert_eq!(node.display_name, "fridge");

    let node = node.with_display_name("  Big fridge ");
    assert_eq!(node.display_name, "Big fridge");

    let node = node.with_display_name("   ");
    assert_eq!(node.display_name, "Big fridge");
  }

  #[test]
  fn leaf_carries_binding() {
    let fact = Uuid::new_v4();
    let node = NewNode::leaf("alice", CatalogPath::root(), Segment::new("milk").unwrap(), fact);
    assert_eq!(node.fact_id, Some(fact));
    assert_eq!(node.path().depth(), 1);
  }
}
