//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Booleans are `0`/`1`
//! integers. RSVP statuses are stored as their wire literals.

use chrono::{DateTime, Utc};
use evently_core::{
  event::Event,
  review::Review,
  rsvp::{Rsvp, RsvpStatus},
  user::{User, UserId},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── RsvpStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: RsvpStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<RsvpStatus> {
  s.parse().map_err(|_| Error::UnknownStatus(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "id, username, email, password_hash, full_name, bio, \
                                location, profile_picture, date_joined";

/// Raw values read directly from a `users` row selected with
/// [`USER_COLUMNS`].
pub struct RawUser {
  pub id:              i64,
  pub username:        String,
  pub email:           String,
  pub password_hash:   String,
  pub full_name:       String,
  pub bio:             String,
  pub location:        String,
  pub profile_picture: Option<String>,
  pub date_joined:     String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      username:        row.get(1)?,
      email:           row.get(2)?,
      password_hash:   row.get(3)?,
      full_name:       row.get(4)?,
      bio:             row.get(5)?,
      location:        row.get(6)?,
      profile_picture: row.get(7)?,
      date_joined:     row.get(8)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:              self.id,
      username:        self.username,
      email:           self.email,
      password_hash:   self.password_hash,
      full_name:       self.full_name,
      bio:             self.bio,
      location:        self.location,
      profile_picture: self.profile_picture,
      date_joined:     decode_dt(&self.date_joined)?,
    })
  }
}

pub const EVENT_COLUMNS: &str = "e.id, e.title, e.description, e.organizer_id, u.username, \
                                 e.location, e.start_time, e.end_time, e.is_public, \
                                 e.created_at, e.updated_at";

/// Raw values from an `events` row joined with its organizer, selected with
/// [`EVENT_COLUMNS`]. The invited set is loaded by a separate query.
pub struct RawEvent {
  pub id:           i64,
  pub title:        String,
  pub description:  String,
  pub organizer_id: i64,
  pub organizer:    String,
  pub location:     String,
  pub start_time:   String,
  pub end_time:     String,
  pub is_public:    bool,
  pub created_at:   String,
  pub updated_at:   String,
  pub invited:      Vec<UserId>,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      title:        row.get(1)?,
      description:  row.get(2)?,
      organizer_id: row.get(3)?,
      organizer:    row.get(4)?,
      location:     row.get(5)?,
      start_time:   row.get(6)?,
      end_time:     row.get(7)?,
      is_public:    row.get(8)?,
      created_at:   row.get(9)?,
      updated_at:   row.get(10)?,
      invited:      Vec::new(),
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      id:           self.id,
      title:        self.title,
      description:  self.description,
      organizer_id: self.organizer_id,
      organizer:    self.organizer,
      location:     self.location,
      start_time:   decode_dt(&self.start_time)?,
      end_time:     decode_dt(&self.end_time)?,
      is_public:    self.is_public,
      invited:      self.invited,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

pub const RSVP_COLUMNS: &str = "r.id, r.event_id, r.user_id, u.username, r.status";

/// Raw values from an `rsvps` row joined with its user.
pub struct RawRsvp {
  pub id:       i64,
  pub event_id: i64,
  pub user_id:  i64,
  pub username: String,
  pub status:   String,
}

impl RawRsvp {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:       row.get(0)?,
      event_id: row.get(1)?,
      user_id:  row.get(2)?,
      username: row.get(3)?,
      status:   row.get(4)?,
    })
  }

  pub fn into_rsvp(self) -> Result<Rsvp> {
    Ok(Rsvp {
      id:      self.id,
      event:   self.event_id,
      user_id: self.user_id,
      user:    self.username,
      status:  decode_status(&self.status)?,
    })
  }
}

pub const REVIEW_COLUMNS: &str =
  "r.id, r.event_id, r.user_id, u.username, r.rating, r.comment, r.created_at";

/// Raw values from a `reviews` row joined with its user.
pub struct RawReview {
  pub id:         i64,
  pub event_id:   i64,
  pub user_id:    i64,
  pub username:   String,
  pub rating:     i64,
  pub comment:    String,
  pub created_at: String,
}

impl RawReview {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      event_id:   row.get(1)?,
      user_id:    row.get(2)?,
      username:   row.get(3)?,
      rating:     row.get(4)?,
      comment:    row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_review(self) -> Result<Review> {
    let rating = u8::try_from(self.rating).map_err(|_| Error::BadRating(self.rating))?;
    Ok(Review {
      id:         self.id,
      event:      self.event_id,
      user_id:    self.user_id,
      user:       self.username,
      rating,
      comment:    self.comment,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
