//! Handlers for `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/events/` | Public events only, ascending id |
//! | `POST`   | `/events/` | Auth required; organizer is the caller |
//! | `GET`    | `/events/{id}/` | Visibility-checked |
//! | `PUT`    | `/events/{id}/` | Organizer only; full body |
//! | `PATCH`  | `/events/{id}/` | Organizer only; partial body |
//! | `DELETE` | `/events/{id}/` | Organizer only; cascades |

use std::sync::Arc;

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use evently_core::{
  access::{self, Action},
  event::{Event, EventId, EventUpdate, NewEvent},
  store::EventStore,
  user::{User, UserId},
};
use serde::Deserialize;

use crate::{
  auth::{Caller, MaybeCaller},
  error::ApiError,
  extract::{Json, Path},
};

const NO_ACCESS: &str = "You do not have access to this event.";
const NOT_ORGANIZER: &str = "Only the organizer may modify this event.";

/// Load an event or fail with `404`.
pub(crate) async fn load_event<S: EventStore>(store: &S, id: EventId) -> Result<Event, ApiError> {
  store
    .get_event(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))
}

/// Load an event the caller is allowed to modify.
async fn load_for_write<S: EventStore>(
  store: &S,
  caller: &User,
  id: EventId,
) -> Result<Event, ApiError> {
  let event = load_event(store, id).await?;
  if !access::can_modify(caller.id, &event) {
    tracing::debug!(event_id = id, user_id = caller.id, "write denied");
    return Err(ApiError::Forbidden(NOT_ORGANIZER));
  }
  Ok(event)
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /events/`. Credentials are optional but must be valid if sent.
pub async fn list<S: EventStore>(
  State(store): State<Arc<S>>,
  _caller: MaybeCaller,
) -> Result<Json<Vec<Event>>, ApiError> {
  let events = store.list_public_events().await.map_err(ApiError::store)?;
  Ok(Json(events))
}

// ─── Create ───────────────────────────────────────────────────────────────────

fn default_public() -> bool { true }

/// JSON body accepted by `POST /events/`. Any `organizer`, `id` or timestamp
/// fields in the body are ignored.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:       String,
  pub description: String,
  pub location:    String,
  pub start_time:  DateTime<Utc>,
  pub end_time:    DateTime<Utc>,
  #[serde(default = "default_public")]
  pub is_public:   bool,
  #[serde(default)]
  pub invited:     Vec<UserId>,
}

impl From<CreateBody> for NewEvent {
  fn from(b: CreateBody) -> Self {
    NewEvent {
      title:       b.title,
      description: b.description,
      location:    b.location,
      start_time:  b.start_time,
      end_time:    b.end_time,
      is_public:   b.is_public,
      invited:     b.invited,
    }
  }
}

/// `POST /events/`: 201 with the stored event.
pub async fn create<S: EventStore>(
  State(store): State<Arc<S>>,
  Caller(user): Caller,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewEvent::from(body);
  input.validate()?;

  let event = store.create_event(user.id, input).await.map_err(ApiError::store)?;
  tracing::info!(event_id = event.id, user_id = user.id, "event created");
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Retrieve ─────────────────────────────────────────────────────────────────

/// `GET /events/{id}/`
pub async fn get_one<S: EventStore>(
  State(store): State<Arc<S>>,
  caller: MaybeCaller,
  Path(id): Path<EventId>,
) -> Result<Json<Event>, ApiError> {
  let event = load_event(store.as_ref(), id).await?;
  if !access::can_access(caller.id(), &event, Action::Read) {
    return Err(ApiError::Forbidden(NO_ACCESS));
  }
  Ok(Json(event))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /events/{id}/`.
///
/// Omitting `is_public` or `invited` leaves them unchanged.
#[derive(Debug, Deserialize)]
pub struct ReplaceBody {
  pub title:       String,
  pub description: String,
  pub location:    String,
  pub start_time:  DateTime<Utc>,
  pub end_time:    DateTime<Utc>,
  pub is_public:   Option<bool>,
  pub invited:     Option<Vec<UserId>>,
}

impl From<ReplaceBody> for EventUpdate {
  fn from(b: ReplaceBody) -> Self {
    EventUpdate {
      title:       Some(b.title),
      description: Some(b.description),
      location:    Some(b.location),
      start_time:  Some(b.start_time),
      end_time:    Some(b.end_time),
      is_public:   b.is_public,
      invited:     b.invited,
    }
  }
}

/// JSON body accepted by `PATCH /events/{id}/`.
#[derive(Debug, Default, Deserialize)]
pub struct PatchBody {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub location:    Option<String>,
  pub start_time:  Option<DateTime<Utc>>,
  pub end_time:    Option<DateTime<Utc>>,
  pub is_public:   Option<bool>,
  pub invited:     Option<Vec<UserId>>,
}

impl From<PatchBody> for EventUpdate {
  fn from(b: PatchBody) -> Self {
    EventUpdate {
      title:       b.title,
      description: b.description,
      location:    b.location,
      start_time:  b.start_time,
      end_time:    b.end_time,
      is_public:   b.is_public,
      invited:     b.invited,
    }
  }
}

async fn apply_update<S: EventStore>(
  store: &S,
  caller: &User,
  id: EventId,
  update: EventUpdate,
) -> Result<Json<Event>, ApiError> {
  let current = load_for_write(store, caller, id).await?;
  if update.is_empty() {
    return Ok(Json(current));
  }
  update.validate_against(&current)?;

  let event = store
    .update_event(id, update)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
  tracing::info!(event_id = id, user_id = caller.id, "event updated");
  Ok(Json(event))
}

/// `PUT /events/{id}/`
pub async fn replace<S: EventStore>(
  State(store): State<Arc<S>>,
  Caller(user): Caller,
  Path(id): Path<EventId>,
  Json(body): Json<ReplaceBody>,
) -> Result<Json<Event>, ApiError> {
  apply_update(store.as_ref(), &user, id, body.into()).await
}

/// `PATCH /events/{id}/`
pub async fn patch<S: EventStore>(
  State(store): State<Arc<S>>,
  Caller(user): Caller,
  Path(id): Path<EventId>,
  Json(body): Json<PatchBody>,
) -> Result<Json<Event>, ApiError> {
  apply_update(store.as_ref(), &user, id, body.into()).await
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /events/{id}/`: 204 on success.
pub async fn delete_one<S: EventStore>(
  State(store): State<Arc<S>>,
  Caller(user): Caller,
  Path(id): Path<EventId>,
) -> Result<StatusCode, ApiError> {
  load_for_write(store.as_ref(), &user, id).await?;

  if !store.delete_event(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("event {id} not found")));
  }
  tracing::info!(event_id = id, user_id = user.id, "event deleted");
  Ok(StatusCode::NO_CONTENT)
}
