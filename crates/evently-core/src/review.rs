//! Reviews: a rating and optional comment left by a user on an event.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Error, Result, event::EventId, user::UserId};

/// Database identifier of a [`Review`].
pub type ReviewId = i64;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A stored review. Immutable once written; at most one per (event, user).
#[derive(Debug, Clone, Serialize)]
pub struct Review {
  pub id:         ReviewId,
  pub event:      EventId,
  #[serde(skip)]
  pub user_id:    UserId,
  /// Username of the reviewer; read-only on the wire.
  pub user:       String,
  pub rating:     u8,
  pub comment:    String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::EventStore::create_review`]. Event and user are
/// passed separately and never come from the request body.
#[derive(Debug, Clone)]
pub struct NewReview {
  pub rating:  i64,
  pub comment: String,
}

impl NewReview {
  /// Check the rating range and return it narrowed to `u8`.
  pub fn validated_rating(&self) -> Result<u8> {
    u8::try_from(self.rating)
      .ok()
      .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
      .ok_or_else(|| {
        Error::validation(
          "rating",
          format!("Rating must be between {MIN_RATING} and {MAX_RATING}."),
        )
      })
  }
}
