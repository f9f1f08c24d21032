//! Object-level permission predicates for events.
//!
//! These are pure functions over the caller, the loaded event and the
//! requested action. Handlers evaluate them after fetching the event, so a
//! denial can be reported as `403` rather than `404`.

use crate::{event::Event, user::UserId};

/// What the caller wants to do with the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  /// GET / HEAD / OPTIONS.
  Read,
  /// PUT / PATCH / DELETE.
  Write,
}

impl Action {
  pub fn is_read_only(self) -> bool { matches!(self, Self::Read) }
}

/// Visibility: organizer always; anyone may read a public event; an
/// authenticated invitee may read a private one. Nothing else is granted.
pub fn can_access(caller: Option<UserId>, event: &Event, action: Action) -> bool {
  if caller.is_some_and(|id| event.is_organizer(id)) {
    return true;
  }
  if !action.is_read_only() {
    return false;
  }
  if event.is_public {
    return true;
  }
  caller.is_some_and(|id| event.is_invited(id))
}

/// Organizer-only writes; reads are left to [`can_access`].
pub fn can_modify(caller: UserId, event: &Event) -> bool {
  event.is_organizer(caller)
}
