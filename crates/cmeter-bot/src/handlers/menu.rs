//! Button presses on the catalog menu.

use cmeter_core::{
  Error as CoreError,
  ledger::Quantity,
  nav::{self, NavAction},
  path::CatalogPath,
  store::IntakeStore,
};

use super::consume;
use crate::{
  error::{Error, Result},
  transport::Reply,
};

const LOAD_FAILURE: &str = "Error loading items";
const ADD_PENDING: &str = "Add item feature - coming soon!";

pub async fn press<S: IntakeStore>(store: &S, owner: &str, token: &str) -> Reply {
  match nav::decode(token) {
    Ok(NavAction::Level(path)) => open(store, owner, &path).await,
    Ok(NavAction::Add(path)) => {
      tracing::debug!(owner, %path, "add requested");
      Reply::notice(ADD_PENDING)
    }
    Err(e) => {
      tracing::debug!(owner, token, error = %e, "ignoring press");
      Reply::notice("Unknown action")
    }
  }
}

/// Render `path`, or record one unit when it names a leaf item.
async fn open<S: IntakeStore>(store: &S, owner: &str, path: &CatalogPath) -> Reply {
  if !path.is_root() {
    match store.get_node(owner, path).await {
      Ok(Some(node)) => {
        if let Some(fact_id) = node.fact_id {
          return record_leaf(store, owner, fact_id).await.unwrap_or_else(Error::into_notice);
        }
      }
      Ok(None) => {}
      Err(e) => return load_failure(e),
    }
  }

  match store.list_at_level(owner, path).await {
    Ok(nodes) => nav::enter(path, &nodes).into(),
    Err(e) => load_failure(e),
  }
}

async fn record_leaf<S: IntakeStore>(store: &S, owner: &str, fact_id: uuid::Uuid) -> Result<Reply> {
  let fact = store
    .get_fact(fact_id)
    .await
    .map_err(Error::from_store)?
    .ok_or(CoreError::FactNotFound(fact_id))?;
  Ok(Reply::notice(consume(store, owner, &fact, Quantity::ONE).await?))
}

fn load_failure<E: Into<CoreError>>(e: E) -> Reply {
  let e: CoreError = e.into();
  tracing::error!(error = %e, "failed to load catalog level");
  Reply::notice(LOAD_FAILURE)
}
