//! Event dispatch: commands go to [`commands`], button presses to [`menu`].

pub mod commands;
pub mod menu;

use cmeter_core::{ledger::Quantity, nutrition::NutritionFact, store::IntakeStore};

use crate::{
  error::{Error, Result},
  transport::{Inbound, Reply, parse_command_line},
};

/// Handle one inbound event and produce the reply to send back.
pub async fn dispatch<S: IntakeStore>(store: &S, inbound: Inbound) -> Reply {
  let owner = inbound.actor().login();
  match inbound {
    Inbound::Command { name, args, .. } => commands::run(store, &owner, &name, &args).await,
    Inbound::Message { text, .. } => match parse_command_line(&text) {
      Some((name, args)) => commands::run(store, &owner, &name, &args).await,
      None => Reply::text(commands::UNKNOWN_COMMAND),
    },
    Inbound::Press { token, .. } => menu::press(store, &owner, &token).await,
  }
}

/// Append `quantity` units of `fact` to the owner's ledger and describe it.
pub(crate) async fn consume<S: IntakeStore>(
  store: &S,
  owner: &str,
  fact: &NutritionFact,
  quantity: Quantity,
) -> Result<String> {
  let event = store
    .append_event(owner, fact.fact_id, quantity)
    .await
    .map_err(Error::from_store)?;
  tracing::info!(owner, event = %event.event_id, fact = %fact.fact_id, "consumption recorded");
  Ok(format!("✅ Recorded: {} ({} kcal)", fact.name, fact.energy_for(quantity.get())))
}
