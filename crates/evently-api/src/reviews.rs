//! Handlers for `/events/{id}/reviews/`.
//!
//! | Method | Notes |
//! |--------|-------|
//! | `GET`  | Open to anyone; ascending id |
//! | `POST` | Auth required; body `{"rating": 1..=5, "comment": "..."}` |

use std::sync::Arc;

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use evently_core::{
  event::EventId,
  review::{NewReview, Review},
  store::EventStore,
};
use serde::Deserialize;

use crate::{
  auth::{Caller, MaybeCaller},
  error::ApiError,
  events::load_event,
  extract::{Json, Path},
};

/// `GET /events/{id}/reviews/`
pub async fn list<S: EventStore>(
  State(store): State<Arc<S>>,
  _caller: MaybeCaller,
  Path(event_id): Path<EventId>,
) -> Result<Json<Vec<Review>>, ApiError> {
  load_event(store.as_ref(), event_id).await?;
  let reviews = store.list_reviews(event_id).await.map_err(ApiError::store)?;
  Ok(Json(reviews))
}

/// JSON body accepted by `POST /events/{id}/reviews/`. Client-supplied
/// `event` and `user` fields are ignored.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub rating:  i64,
  #[serde(default)]
  pub comment: String,
}

/// `POST /events/{id}/reviews/`: 201 with the stored review.
pub async fn create<S: EventStore>(
  State(store): State<Arc<S>>,
  Caller(user): Caller,
  Path(event_id): Path<EventId>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewReview { rating: body.rating, comment: body.comment };
  input.validated_rating()?;

  load_event(store.as_ref(), event_id).await?;
  let review = store
    .create_review(event_id, user.id, input)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(event_id, user_id = user.id, rating = review.rating, "review created");
  Ok((StatusCode::CREATED, Json(review)))
}
