//! Error types for `evently-core`.

use thiserror::Error;

use crate::{event::EventId, user::UserId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("event not found: {0}")]
  EventNotFound(EventId),

  /// A field failed validation before reaching the store.
  #[error("{field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  /// A uniqueness constraint rejected the write.
  #[error("{field}: {message}")]
  Conflict {
    field:   &'static str,
    message: String,
  },

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Self::Validation { field, message: message.into() }
  }

  pub fn conflict(field: &'static str, message: impl Into<String>) -> Self {
    Self::Conflict { field, message: message.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
