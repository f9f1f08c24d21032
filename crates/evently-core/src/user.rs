//! User accounts and their public profile representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Database identifier of a [`User`].
pub type UserId = i64;

/// Maximum length of a username, in characters.
pub const USERNAME_MAX_LEN: usize = 150;
/// Maximum length of `full_name` and `location`, in characters.
pub const PROFILE_FIELD_MAX_LEN: usize = 100;

/// A stored user account, including its credential hash.
///
/// Never serialised directly; handlers expose [`UserProfile`] instead.
#[derive(Debug, Clone)]
pub struct User {
  pub id:              UserId,
  pub username:        String,
  pub email:           String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash:   String,
  pub full_name:       String,
  pub bio:             String,
  pub location:        String,
  /// Path of the profile picture relative to the media root, if any.
  pub profile_picture: Option<String>,
  pub date_joined:     DateTime<Utc>,
}

/// The user-facing view of a [`User`]. Credential fields are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
  pub id:        UserId,
  pub username:  String,
  pub email:     String,
  pub full_name: String,
  pub bio:       String,
  pub location:  String,
}

impl From<&User> for UserProfile {
  fn from(u: &User) -> Self {
    Self {
      id:        u.id,
      username:  u.username.clone(),
      email:     u.email.clone(),
      full_name: u.full_name.clone(),
      bio:       u.bio.clone(),
      location:  u.location.clone(),
    }
  }
}

/// Input to [`crate::store::EventStore::create_user`]. The password must
/// already be hashed.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub full_name:     String,
  pub bio:           String,
  pub location:      String,
}

impl NewUser {
  /// Usernames must be non-blank, at most [`USERNAME_MAX_LEN`] characters,
  /// and use only letters, digits and `@.+-_`. Surrounding whitespace is
  /// rejected; callers trim it first.
  pub fn validate(&self) -> Result<()> {
    let username = self.username.as_str();
    if username.trim().is_empty() {
      return Err(Error::validation("username", "This field may not be blank."));
    }
    if !username.chars().all(is_username_char) {
      return Err(Error::validation(
        "username",
        "Enter a valid username. This value may contain only letters, numbers, and \
         @/./+/-/_ characters.",
      ));
    }
    if username.chars().count() > USERNAME_MAX_LEN {
      return Err(Error::validation(
        "username",
        format!("Ensure this field has no more than {USERNAME_MAX_LEN} characters."),
      ));
    }
    check_profile_len("full_name", &self.full_name)?;
    check_profile_len("location", &self.location)
  }
}

fn is_username_char(c: char) -> bool {
  c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

/// Partial update of the owning user's profile fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
  pub email:     Option<String>,
  pub full_name: Option<String>,
  pub bio:       Option<String>,
  pub location:  Option<String>,
}

impl ProfileUpdate {
  pub fn validate(&self) -> Result<()> {
    if let Some(full_name) = &self.full_name {
      check_profile_len("full_name", full_name)?;
    }
    if let Some(location) = &self.location {
      check_profile_len("location", location)?;
    }
    Ok(())
  }
}

fn check_profile_len(field: &'static str, value: &str) -> Result<()> {
  if value.chars().count() > PROFILE_FIELD_MAX_LEN {
    return Err(Error::validation(
      field,
      format!("Ensure this field has no more than {PROFILE_FIELD_MAX_LEN} characters."),
    ));
  }
  Ok(())
}
