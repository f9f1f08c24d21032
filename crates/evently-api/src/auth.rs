//! HTTP Basic-auth extractors and argon2 password helpers.
//!
//! Credentials are checked against the `users` table on every request; no
//! tokens or sessions are issued.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use evently_core::{
  store::EventStore,
  user::{User, UserId},
};
use rand_core::OsRng;

use crate::error::ApiError;

/// An authenticated caller. Rejects with `401` when credentials are missing
/// or wrong.
pub struct Caller(pub User);

/// An optional caller. An absent `Authorization` header yields an anonymous
/// caller; a present but invalid one still rejects with `401`.
pub struct MaybeCaller(pub Option<User>);

impl MaybeCaller {
  pub fn id(&self) -> Option<UserId> { self.0.as_ref().map(|u| u.id) }
}

/// Hash `password` into an argon2 PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Store(format!("argon2 error: {e}").into()))
}

/// Verify `password` against a stored PHC string.
pub fn verify_password(password: &str, phc: &str) -> Result<(), ApiError> {
  let parsed = PasswordHash::new(phc).map_err(|_| ApiError::Unauthenticated)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| ApiError::Unauthenticated)
}

/// Split a `Basic` authorization header into `(username, password)`.
///
/// Returns `Ok(None)` when no header is present.
fn basic_credentials(headers: &HeaderMap) -> Result<Option<(String, String)>, ApiError> {
  let Some(value) = headers.get(header::AUTHORIZATION) else {
    return Ok(None);
  };

  let encoded = value
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or(ApiError::Unauthenticated)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthenticated)?;
  let creds = String::from_utf8(decoded).map_err(|_| ApiError::Unauthenticated)?;
  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthenticated)?;

  Ok(Some((username.to_owned(), password.to_owned())))
}

/// Resolve the caller from request headers.
pub async fn authenticate<S: EventStore>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Option<User>, ApiError> {
  let Some((username, password)) = basic_credentials(headers)? else {
    return Ok(None);
  };

  let user = store
    .find_user_by_username(&username)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthenticated)?;

  verify_password(&password, &user.password_hash)?;
  Ok(Some(user))
}

impl<S> FromRequestParts<Arc<S>> for Caller
where
  S: EventStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    store: &Arc<S>,
  ) -> Result<Self, Self::Rejection> {
    authenticate(&parts.headers, store.as_ref())
      .await?
      .map(Caller)
      .ok_or(ApiError::Unauthenticated)
  }
}

impl<S> FromRequestParts<Arc<S>> for MaybeCaller
where
  S: EventStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    store: &Arc<S>,
  ) -> Result<Self, Self::Rejection> {
    Ok(MaybeCaller(authenticate(&parts.headers, store.as_ref()).await?))
  }
}
