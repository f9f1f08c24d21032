//! Handlers for `/users` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/users/` | Registration; no auth |
//! | `GET`   | `/users/me/` | The caller's profile |
//! | `PATCH` | `/users/me/` | Edit the caller's profile fields |
//! | `GET`   | `/users/{id}/` | Any user's public profile |

use std::sync::Arc;

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use evently_core::{
  store::EventStore,
  user::{NewUser, ProfileUpdate, UserId, UserProfile},
};
use serde::Deserialize;

use crate::{
  auth::{Caller, hash_password},
  error::ApiError,
  extract::{Json, Path},
};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username:  String,
  pub password:  String,
  #[serde(default)]
  pub email:     String,
  #[serde(default)]
  pub full_name: String,
  #[serde(default)]
  pub bio:       String,
  #[serde(default)]
  pub location:  String,
}

/// `POST /users/`: 201 with the new profile.
pub async fn register<S: EventStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.password.is_empty() {
    return Err(ApiError::Validation {
      field:   "password",
      message: "This field may not be blank.".to_owned(),
    });
  }

  let mut input = NewUser {
    username:      body.username.trim().to_owned(),
    email:         body.email,
    password_hash: String::new(),
    full_name:     body.full_name,
    bio:           body.bio,
    location:      body.location,
  };
  // Validate before hashing.
  input.validate()?;
  input.password_hash = hash_password(&body.password)?;

  let user = store.create_user(input).await.map_err(ApiError::store)?;
  tracing::info!(user_id = user.id, username = %user.username, "user registered");
  Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

/// `GET /users/me/`
pub async fn me(Caller(user): Caller) -> Json<UserProfile> {
  Json(UserProfile::from(&user))
}

/// `PATCH /users/me/`. Username and credentials are not editable here.
pub async fn update_me<S: EventStore>(
  State(store): State<Arc<S>>,
  Caller(user): Caller,
  Json(body): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, ApiError> {
  body.validate()?;
  let updated = store
    .update_profile(user.id, body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {} not found", user.id)))?;
  Ok(Json(UserProfile::from(&updated)))
}

/// `GET /users/{id}/`
pub async fn get_one<S: EventStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<UserId>,
) -> Result<Json<UserProfile>, ApiError> {
  let user = store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(UserProfile::from(&user)))
}
