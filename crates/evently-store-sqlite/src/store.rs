//! [`SqliteStore`], the SQLite implementation of [`EventStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use evently_core::{
  event::{Event, EventId, EventUpdate, NewEvent},
  review::{NewReview, Review},
  rsvp::{Rsvp, RsvpStatus, UpsertOutcome},
  store::EventStore,
  user::{NewUser, ProfileUpdate, User, UserId},
};
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use crate::{
  Error, Result,
  encode::{
    EVENT_COLUMNS, RSVP_COLUMNS, REVIEW_COLUMNS, RawEvent, RawReview, RawRsvp, RawUser,
    USER_COLUMNS, encode_dt, encode_status,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Evently store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// are serialised on the connection's dedicated thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Query helpers ───────────────────────────────────────────────────────────
//
// Synchronous helpers run inside `Connection::call` closures, usually within
// a transaction (which derefs to `rusqlite::Connection`).

fn unique_violation(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

/// Return the first id in `ids` with no matching `users` row.
fn missing_user(
  conn: &rusqlite::Connection,
  ids: &[UserId],
) -> rusqlite::Result<Option<UserId>> {
  let mut stmt = conn.prepare_cached("SELECT 1 FROM users WHERE id = ?1")?;
  for &id in ids {
    if !stmt.exists([id])? {
      return Ok(Some(id));
    }
  }
  Ok(None)
}

fn insert_invites(
  conn: &rusqlite::Connection,
  event_id: EventId,
  ids: &[UserId],
) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare_cached(
    "INSERT OR IGNORE INTO event_invites (event_id, user_id) VALUES (?1, ?2)",
  )?;
  for &id in ids {
    stmt.execute([event_id, id])?;
  }
  Ok(())
}

fn load_invites(
  conn: &rusqlite::Connection,
  event_id: EventId,
) -> rusqlite::Result<Vec<UserId>> {
  let mut stmt = conn.prepare_cached(
    "SELECT user_id FROM event_invites WHERE event_id = ?1 ORDER BY user_id",
  )?;
  stmt
    .query_map([event_id], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<_>>>()
}

/// Fetch one event with its invited set; errors with `QueryReturnedNoRows`
/// when absent.
fn fetch_event(conn: &rusqlite::Connection, id: EventId) -> rusqlite::Result<RawEvent> {
  let mut raw = conn.query_row(
    &format!(
      "SELECT {EVENT_COLUMNS}
       FROM events e
       JOIN users u ON u.id = e.organizer_id
       WHERE e.id = ?1"
    ),
    [id],
    RawEvent::from_row,
  )?;
  raw.invited = load_invites(conn, id)?;
  Ok(raw)
}

fn fetch_rsvp(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<RawRsvp> {
  conn.query_row(
    &format!(
      "SELECT {RSVP_COLUMNS}
       FROM rsvps r
       JOIN users u ON u.id = r.user_id
       WHERE r.id = ?1"
    ),
    [id],
    RawRsvp::from_row,
  )
}

fn fetch_review(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<RawReview> {
  conn.query_row(
    &format!(
      "SELECT {REVIEW_COLUMNS}
       FROM reviews r
       JOIN users u ON u.id = r.user_id
       WHERE r.id = ?1"
    ),
    [id],
    RawReview::from_row,
  )
}

fn fetch_user(conn: &rusqlite::Connection, id: UserId) -> rusqlite::Result<RawUser> {
  conn.query_row(
    &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
    [id],
    RawUser::from_row,
  )
}

/// Sort and deduplicate an invited list so stored order is deterministic.
fn normalise_ids(mut ids: Vec<UserId>) -> Vec<UserId> {
  ids.sort_unstable();
  ids.dedup();
  ids
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    input.validate()?;
    let joined_str = encode_dt(Utc::now());

    let raw: RawUser = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (username, email, password_hash, full_name, bio, location, date_joined)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            input.username,
            input.email,
            input.password_hash,
            input.full_name,
            input.bio,
            input.location,
            joined_str,
          ],
        )?;
        Ok(fetch_user(conn, conn.last_insert_rowid())?)
      })
      .await
      .map_err(|e| {
        if unique_violation(&e) {
          Error::Duplicate {
            field:   "username",
            message: "A user with that username already exists.",
          }
        } else {
          Error::Database(e)
        }
      })?;

    raw.into_user()
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| Ok(fetch_user(conn, id).optional()?))
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            [username],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<Option<User>> {
    update.validate()?;
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE users SET
             email     = COALESCE(?2, email),
             full_name = COALESCE(?3, full_name),
             bio       = COALESCE(?4, bio),
             location  = COALESCE(?5, location)
           WHERE id = ?1",
          rusqlite::params![
            id,
            update.email,
            update.full_name,
            update.bio,
            update.location,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(Some(fetch_user(conn, id)?))
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn create_event(&self, organizer: UserId, input: NewEvent) -> Result<Event> {
    input.validate()?;
    let now_str   = encode_dt(Utc::now());
    let start_str = encode_dt(input.start_time);
    let end_str   = encode_dt(input.end_time);
    let invited   = normalise_ids(input.invited);

    let outcome: std::result::Result<RawEvent, UserId> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(missing) = missing_user(&tx, &invited)? {
          return Ok(Err(missing));
        }

        tx.execute(
          "INSERT INTO events (
             title, description, organizer_id, location,
             start_time, end_time, is_public, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
          rusqlite::params![
            input.title,
            input.description,
            organizer,
            input.location,
            start_str,
            end_str,
            input.is_public,
            now_str,
          ],
        )?;
        let id = tx.last_insert_rowid();
        insert_invites(&tx, id, &invited)?;

        let raw = fetch_event(&tx, id)?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    let event = outcome.map_err(Error::UnknownUser)?.into_event()?;
    tracing::debug!(event_id = event.id, organizer, "inserted event");
    Ok(event)
  }

  async fn get_event(&self, id: EventId) -> Result<Option<Event>> {
    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| Ok(fetch_event(conn, id).optional()?))
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn list_public_events(&self) -> Result<Vec<Event>> {
    let raws: Vec<RawEvent> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS}
           FROM events e
           JOIN users u ON u.id = e.organizer_id
           WHERE e.is_public = 1
           ORDER BY e.id"
        ))?;
        let mut rows = stmt
          .query_map([], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        // One pass over the invites of every public event.
        let mut invites: HashMap<EventId, Vec<UserId>> = HashMap::new();
        let mut stmt = conn.prepare(
          "SELECT i.event_id, i.user_id
           FROM event_invites i
           JOIN events e ON e.id = i.event_id
           WHERE e.is_public = 1
           ORDER BY i.event_id, i.user_id",
        )?;
        let pairs = stmt.query_map([], |row| {
          Ok((row.get::<_, EventId>(0)?, row.get::<_, UserId>(1)?))
        })?;
        for pair in pairs {
          let (event_id, user_id) = pair?;
          invites.entry(event_id).or_default().push(user_id);
        }

        for raw in &mut rows {
          raw.invited = invites.remove(&raw.id).unwrap_or_default();
        }
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn update_event(&self, id: EventId, update: EventUpdate) -> Result<Option<Event>> {
    let now_str   = encode_dt(Utc::now());
    let start_str = update.start_time.map(encode_dt);
    let end_str   = update.end_time.map(encode_dt);
    let invited   = update.invited.map(normalise_ids);

    let outcome: Option<std::result::Result<RawEvent, UserId>> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !tx.prepare_cached("SELECT 1 FROM events WHERE id = ?1")?.exists([id])? {
          return Ok(None);
        }
        if let Some(ids) = &invited
          && let Some(missing) = missing_user(&tx, ids)?
        {
          return Ok(Some(Err(missing)));
        }

        tx.execute(
          "UPDATE events SET
             title       = COALESCE(?2, title),
             description = COALESCE(?3, description),
             location    = COALESCE(?4, location),
             start_time  = COALESCE(?5, start_time),
             end_time    = COALESCE(?6, end_time),
             is_public   = COALESCE(?7, is_public),
             updated_at  = ?8
           WHERE id = ?1",
          rusqlite::params![
            id,
            update.title,
            update.description,
            update.location,
            start_str,
            end_str,
            update.is_public,
            now_str,
          ],
        )?;

        if let Some(ids) = &invited {
          tx.execute("DELETE FROM event_invites WHERE event_id = ?1", [id])?;
          insert_invites(&tx, id, ids)?;
        }

        let raw = fetch_event(&tx, id)?;
        tx.commit()?;
        Ok(Some(Ok(raw)))
      })
      .await?;

    match outcome {
      None => Ok(None),
      Some(Err(missing)) => Err(Error::UnknownUser(missing)),
      Some(Ok(raw)) => raw.into_event().map(Some),
    }
  }

  async fn delete_event(&self, id: EventId) -> Result<bool> {
    // RSVPs, reviews and invitations go with it via ON DELETE CASCADE.
    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM events WHERE id = ?1", [id])?))
      .await?;

    Ok(deleted > 0)
  }

  // ── RSVPs ─────────────────────────────────────────────────────────────────

  async fn upsert_rsvp(
    &self,
    event:  EventId,
    user:   UserId,
    status: RsvpStatus,
  ) -> Result<(Rsvp, UpsertOutcome)> {
    let status_str = encode_status(status);

    let (raw, created): (RawRsvp, bool) = self
      .conn
      .call(move |conn| {
        // IMMEDIATE takes the write lock up front, so the existence probe
        // and the upsert observe the same state.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existed = tx
          .prepare_cached("SELECT 1 FROM rsvps WHERE event_id = ?1 AND user_id = ?2")?
          .exists([event, user])?;

        let id: i64 = tx.query_row(
          "INSERT INTO rsvps (event_id, user_id, status) VALUES (?1, ?2, ?3)
           ON CONFLICT (event_id, user_id) DO UPDATE SET status = excluded.status
           RETURNING id",
          rusqlite::params![event, user, status_str],
          |row| row.get(0),
        )?;

        let raw = fetch_rsvp(&tx, id)?;
        tx.commit()?;
        Ok((raw, !existed))
      })
      .await?;

    let outcome = if created { UpsertOutcome::Created } else { UpsertOutcome::Updated };
    Ok((raw.into_rsvp()?, outcome))
  }

  async fn list_rsvps(&self, event: EventId) -> Result<Vec<Rsvp>> {
    let raws: Vec<RawRsvp> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RSVP_COLUMNS}
           FROM rsvps r
           JOIN users u ON u.id = r.user_id
           WHERE r.event_id = ?1
           ORDER BY r.id"
        ))?;
        let rows = stmt
          .query_map([event], RawRsvp::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRsvp::into_rsvp).collect()
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  async fn list_reviews(&self, event: EventId) -> Result<Vec<Review>> {
    let raws: Vec<RawReview> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REVIEW_COLUMNS}
           FROM reviews r
           JOIN users u ON u.id = r.user_id
           WHERE r.event_id = ?1
           ORDER BY r.id"
        ))?;
        let rows = stmt
          .query_map([event], RawReview::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReview::into_review).collect()
  }

  async fn create_review(
    &self,
    event: EventId,
    user:  UserId,
    input: NewReview,
  ) -> Result<Review> {
    let rating  = input.validated_rating()?;
    let comment = input.comment;
    let at_str  = encode_dt(Utc::now());

    let raw: RawReview = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reviews (event_id, user_id, rating, comment, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![event, user, rating, comment, at_str],
        )?;
        Ok(fetch_review(conn, conn.last_insert_rowid())?)
      })
      .await
      .map_err(|e| {
        if unique_violation(&e) {
          Error::Duplicate {
            field:   "non_field_errors",
            message: "The fields event, user must make a unique set.",
          }
        } else {
          Error::Database(e)
        }
      })?;

    raw.into_review()
  }
}
