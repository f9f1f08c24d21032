//! Extractors whose rejections render as [`ApiError`].
//!
//! axum's own `Json` answers malformed or mistyped bodies with `422`; the
//! wrapper here turns every body problem into a `400` with the usual error
//! shape. A path segment that does not parse as an id is a `404`, since no
//! such resource can exist.

use axum::{
  extract::{FromRequest, FromRequestParts},
  response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
  fn into_response(self) -> Response { axum::Json(self.0).into_response() }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);
