//! JSON REST API for Evently.
//!
//! Exposes an axum [`Router`] backed by any [`evently_core::store::EventStore`].
//! Callers identify themselves with HTTP Basic credentials checked against
//! the store; TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = evently_api::api_router(Arc::new(store));
//! ```

pub mod auth;
pub mod error;
pub mod events;
pub mod extract;
pub mod reviews;
pub mod rsvp;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use evently_core::store::EventStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: EventStore + 'static,
{
  Router::new()
    // Events
    .route("/events/", get(events::list::<S>).post(events::create::<S>))
    .route(
      "/events/{id}/",
      get(events::get_one::<S>)
        .put(events::replace::<S>)
        .patch(events::patch::<S>)
        .delete(events::delete_one::<S>),
    )
    .route("/events/{id}/rsvp/", post(rsvp::upsert::<S>))
    .route(
      "/events/{id}/reviews/",
      get(reviews::list::<S>).post(reviews::create::<S>),
    )
    // Users
    .route("/users/", post(users::register::<S>))
    .route("/users/me/", get(users::me).patch(users::update_me::<S>))
    .route("/users/{id}/", get(users::get_one::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
