//! Events, the central record. Everything else hangs off an event.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Error, Result, user::UserId};

/// Database identifier of an [`Event`].
pub type EventId = i64;

/// Maximum length of `title` and `location`, in characters.
pub const EVENT_FIELD_MAX_LEN: usize = 100;

/// A stored event with its invited set resolved.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
  pub id:           EventId,
  pub title:        String,
  pub description:  String,
  #[serde(skip)]
  pub organizer_id: UserId,
  /// Username of the organizer; read-only on the wire.
  pub organizer:    String,
  pub location:     String,
  pub start_time:   DateTime<Utc>,
  pub end_time:     DateTime<Utc>,
  pub is_public:    bool,
  /// Ids of invited users, ascending.
  pub invited:      Vec<UserId>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

impl Event {
  pub fn is_organizer(&self, user_id: UserId) -> bool {
    self.organizer_id == user_id
  }

  pub fn is_invited(&self, user_id: UserId) -> bool {
    self.invited.contains(&user_id)
  }
}

/// Input to [`crate::store::EventStore::create_event`].
///
/// There is no organizer field: the store takes the organizer as a separate
/// argument so it can only ever come from the authenticated caller.
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub title:       String,
  pub description: String,
  pub location:    String,
  pub start_time:  DateTime<Utc>,
  pub end_time:    DateTime<Utc>,
  pub is_public:   bool,
  pub invited:     Vec<UserId>,
}

impl NewEvent {
  pub fn validate(&self) -> Result<()> {
    check_text("title", &self.title, Some(EVENT_FIELD_MAX_LEN))?;
    check_text("description", &self.description, None)?;
    check_text("location", &self.location, Some(EVENT_FIELD_MAX_LEN))?;
    check_window(self.start_time, self.end_time)
  }
}

/// A partial update; `None` leaves the stored value untouched.
///
/// `invited: Some(..)` replaces the whole invited set.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub location:    Option<String>,
  pub start_time:  Option<DateTime<Utc>>,
  pub end_time:    Option<DateTime<Utc>>,
  pub is_public:   Option<bool>,
  pub invited:     Option<Vec<UserId>>,
}

impl EventUpdate {
  /// Validate the update as it would apply on top of `current`.
  pub fn validate_against(&self, current: &Event) -> Result<()> {
    if let Some(title) = &self.title {
      check_text("title", title, Some(EVENT_FIELD_MAX_LEN))?;
    }
    if let Some(description) = &self.description {
      check_text("description", description, None)?;
    }
    if let Some(location) = &self.location {
      check_text("location", location, Some(EVENT_FIELD_MAX_LEN))?;
    }
    check_window(
      self.start_time.unwrap_or(current.start_time),
      self.end_time.unwrap_or(current.end_time),
    )
  }

  pub fn is_empty(&self) -> bool {
    self.title.is_none()
      && self.description.is_none()
      && self.location.is_none()
      && self.start_time.is_none()
      && self.end_time.is_none()
      && self.is_public.is_none()
      && self.invited.is_none()
  }
}

fn check_text(field: &'static str, value: &str, max: Option<usize>) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::validation(field, "This field may not be blank."));
  }
  if let Some(max) = max
    && value.chars().count() > max
  {
    return Err(Error::validation(
      field,
      format!("Ensure this field has no more than {max} characters."),
    ));
  }
  Ok(())
}

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
  if end < start {
    return Err(Error::validation("end_time", "End time must not precede start time."));
  }
  Ok(())
}
