//! The `EventStore` trait.
//!
//! Implemented by storage backends (e.g. `evently-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  event::{Event, EventId, EventUpdate, NewEvent},
  review::{NewReview, Review},
  rsvp::{Rsvp, RsvpStatus, UpsertOutcome},
  user::{NewUser, ProfileUpdate, User, UserId},
};

/// Abstraction over an Evently storage backend.
///
/// Every method is a single read or write. Uniqueness invariants
/// (usernames, one RSVP and one review per event and user) must be enforced
/// by the backend itself, not by lookup-then-write in callers.
///
/// Backend errors convert into [`crate::Error`] so the HTTP layer can tell
/// conflicts and bad references apart from storage failures.
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Fails with a conflict if the username is taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user by exact username; used to verify credentials.
  fn find_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Apply a profile update. Returns `None` if the user does not exist.
  fn update_profile(
    &self,
    id: UserId,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  /// Persist a new event owned by `organizer`, together with its invited
  /// set. Fails if any invited id does not name an existing user.
  fn create_event(
    &self,
    organizer: UserId,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Retrieve any event by id, regardless of visibility.
  fn get_event(
    &self,
    id: EventId,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// All events with `is_public` set, ordered by id ascending.
  fn list_public_events(
    &self,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  /// Apply `update` and refresh `updated_at`. The organizer never changes.
  /// Returns `None` if the event does not exist.
  fn update_event(
    &self,
    id: EventId,
    update: EventUpdate,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// Delete an event, cascading to its RSVPs, reviews and invitations.
  /// Returns `false` if the event did not exist.
  fn delete_event(
    &self,
    id: EventId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── RSVPs ─────────────────────────────────────────────────────────────

  /// Create the RSVP for (event, user) or overwrite its status in place.
  fn upsert_rsvp(
    &self,
    event: EventId,
    user: UserId,
    status: RsvpStatus,
  ) -> impl Future<Output = Result<(Rsvp, UpsertOutcome), Self::Error>> + Send + '_;

  /// All RSVPs for an event, ordered by id ascending.
  fn list_rsvps(
    &self,
    event: EventId,
  ) -> impl Future<Output = Result<Vec<Rsvp>, Self::Error>> + Send + '_;

  // ── Reviews ───────────────────────────────────────────────────────────

  /// All reviews for an event, ordered by id ascending.
  fn list_reviews(
    &self,
    event: EventId,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + '_;

  /// Persist a review. Fails with a conflict if `user` already reviewed
  /// `event`.
  fn create_review(
    &self,
    event: EventId,
    user: UserId,
    input: NewReview,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;
}
