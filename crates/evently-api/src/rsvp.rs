//! Handler for `POST /events/{id}/rsvp/`.
//!
//! Body: `{"status": "Going" | "Maybe" | "Not Going"}`. Creates the caller's
//! RSVP (201) or overwrites its status (200). The event comes from the path
//! and the user from the credentials; body fields other than `status` are
//! ignored.

use std::sync::Arc;

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use evently_core::{
  event::EventId,
  rsvp::{RsvpStatus, UpsertOutcome},
  store::EventStore,
};
use serde::Deserialize;

use crate::{
  auth::Caller,
  error::ApiError,
  events::load_event,
  extract::{Json, Path},
};

#[derive(Debug, Deserialize)]
pub struct RsvpBody {
  /// Kept loose so that a missing or non-string status gets the same
  /// message as an unknown literal.
  #[serde(default)]
  pub status: serde_json::Value,
}

/// `POST /events/{id}/rsvp/`
pub async fn upsert<S: EventStore>(
  State(store): State<Arc<S>>,
  Caller(user): Caller,
  Path(event_id): Path<EventId>,
  Json(body): Json<RsvpBody>,
) -> Result<impl IntoResponse, ApiError> {
  let event = load_event(store.as_ref(), event_id).await?;

  let status: RsvpStatus = body.status.as_str().unwrap_or_default().parse()?;

  let (rsvp, outcome) = store
    .upsert_rsvp(event.id, user.id, status)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(event_id, user_id = user.id, %status, ?outcome, "rsvp recorded");
  let code = match outcome {
    UpsertOutcome::Created => StatusCode::CREATED,
    UpsertOutcome::Updated => StatusCode::OK,
  };
  Ok((code, Json(rsvp)))
}
