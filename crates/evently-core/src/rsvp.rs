//! RSVPs: a user's attendance answer for an event.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, event::EventId, user::UserId};

/// Database identifier of an [`Rsvp`].
pub type RsvpId = i64;

/// The three allowed answers. The wire literals are `"Going"`, `"Maybe"` and
/// `"Not Going"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsvpStatus {
  Going,
  Maybe,
  #[serde(rename = "Not Going")]
  NotGoing,
}

impl RsvpStatus {
  pub const ALLOWED: &'static str = "Status must be 'Going', 'Maybe', or 'Not Going'.";

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Going => "Going",
      Self::Maybe => "Maybe",
      Self::NotGoing => "Not Going",
    }
  }
}

impl FromStr for RsvpStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Going" => Ok(Self::Going),
      "Maybe" => Ok(Self::Maybe),
      "Not Going" => Ok(Self::NotGoing),
      _ => Err(Error::validation("status", Self::ALLOWED)),
    }
  }
}

impl fmt::Display for RsvpStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A stored RSVP. At most one exists per (event, user).
#[derive(Debug, Clone, Serialize)]
pub struct Rsvp {
  pub id:      RsvpId,
  pub event:   EventId,
  #[serde(skip)]
  pub user_id: UserId,
  /// Username of the responding user; read-only on the wire.
  pub user:    String,
  pub status:  RsvpStatus,
}

/// Whether an upsert inserted a new row or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
  Created,
  Updated,
}
