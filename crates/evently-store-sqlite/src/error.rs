//! Error type for `evently-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] evently_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown rsvp status in database: {0:?}")]
  UnknownStatus(String),

  #[error("rating out of range in database: {0}")]
  BadRating(i64),

  /// A UNIQUE constraint rejected the write.
  #[error("{field}: {message}")]
  Duplicate {
    field:   &'static str,
    message: &'static str,
  },

  /// A foreign key pointed at a user that does not exist.
  #[error("invalid user reference: {0}")]
  UnknownUser(i64),
}

impl From<Error> for evently_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(e) => e,
      Error::Duplicate { field, message } => Self::conflict(field, message),
      Error::UnknownUser(id) => Self::validation(
        "invited",
        format!("Invalid pk \"{id}\" - object does not exist."),
      ),
      other => Self::Storage(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
