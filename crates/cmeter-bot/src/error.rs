//! Dispatcher errors and their user-facing replies.

use cmeter_core::ErrorKind;
use thiserror::Error;

use crate::transport::Reply;

const STORAGE_FAILURE: &str = "❌ Something went wrong, please try again later";

#[derive(Debug, Error)]
pub enum Error {
  /// The user got the command wrong; the message says how.
  #[error("{0}")]
  Usage(String),

  #[error(transparent)]
  Core(#[from] cmeter_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub fn usage(message: impl Into<String>) -> Self { Error::Usage(message.into()) }

  /// Classify any store error through [`cmeter_core::Error`].
  pub fn from_store<E: Into<cmeter_core::Error>>(e: E) -> Self { Error::Core(e.into()) }

  /// The text shown to the user. Storage failures are logged here.
  pub fn message(&self) -> String {
    match self {
      Error::Usage(message) => message.clone(),
      Error::Core(e) => match e {
        cmeter_core::Error::PathConflict(path) => format!("❌ {path} already exists"),
        cmeter_core::Error::FactNotFound(id) => format!("❌ Fact {id} not found"),
        e => match e.kind() {
          ErrorKind::Storage => {
            tracing::error!(error = %e, "storage failure while handling event");
            STORAGE_FAILURE.to_owned()
          }
          ErrorKind::Unrecognized => "Unknown action".to_owned(),
          _ => format!("❌ {e}"),
        },
      },
    }
  }

  pub fn into_reply(self) -> Reply { Reply::text(self.message()) }

  pub fn into_notice(self) -> Reply { Reply::notice(self.message()) }
}
