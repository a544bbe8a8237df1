//! User — the identity record every other entity hangs off.
//!
//! Users are never physically deleted. Deactivation flips [`User::is_active`];
//! the identifier, email and username never change after registration.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  Error, Result,
  id::UserId,
  validate::{check_optional_text, check_text},
};

pub const EMAIL_MAX_LEN: usize = 120;
pub const USERNAME_MAX_LEN: usize = 50;
pub const FULL_NAME_MAX_LEN: usize = 100;
pub const PROFILE_PICTURE_MAX_LEN: usize = 255;

// ─── Credential ──────────────────────────────────────────────────────────────

/// An opaque password credential. Hashing happens outside Plaza; the store
/// keeps whatever it is given and the value is never serialised or logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
  pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

  pub fn expose(&self) -> &str { &self.0 }
}

impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Credential(***)")
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

/// A registered user.
///
/// The serialised form is the public profile shape consumed by external
/// clients: `{id, email, username, full_name, bio, profile_picture,
/// created_at}`. The credential and the active flag are never emitted.
#[derive(Debug, Clone, Serialize)]
pub struct User {
  pub id:              UserId,
  pub email:           String,
  pub username:        String,
  #[serde(skip)]
  pub password:        Credential,
  #[serde(skip)]
  pub is_active:       bool,
  pub full_name:       Option<String>,
  pub bio:             Option<String>,
  pub profile_picture: Option<String>,
  pub created_at:      DateTime<Utc>,
}

// ─── NewUser ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::SocialStore::create_user`].
/// `created_at` and the id are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:           String,
  pub username:        String,
  pub password:        Credential,
  pub is_active:       bool,
  pub full_name:       Option<String>,
  pub bio:             Option<String>,
  pub profile_picture: Option<String>,
}

impl NewUser {
  /// An active user with no profile fields set.
  pub fn new(
    email: impl Into<String>,
    username: impl Into<String>,
    password: Credential,
  ) -> Self {
    Self {
      email: email.into(),
      username: username.into(),
      password,
      is_active: true,
      full_name: None,
      bio: None,
      profile_picture: None,
    }
  }

  /// Check required fields and column length limits.
  pub fn validate(&self) -> Result<()> {
    check_text("email", &self.email, Some(EMAIL_MAX_LEN), true)?;
    check_text("username", &self.username, Some(USERNAME_MAX_LEN), true)?;
    check_optional_text("full_name", self.full_name.as_deref(), Some(FULL_NAME_MAX_LEN))?;
    check_optional_text(
      "profile_picture",
      self.profile_picture.as_deref(),
      Some(PROFILE_PICTURE_MAX_LEN),
    )?;
    if self.password.expose().is_empty() {
      return Err(Error::InvalidInput("password must not be empty".into()));
    }
    Ok(())
  }
}

// ─── ProfileUpdate ───────────────────────────────────────────────────────────

/// The mutable profile fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
  pub full_name:       Option<String>,
  pub bio:             Option<String>,
  pub profile_picture: Option<String>,
}

impl ProfileUpdate {
  pub fn is_empty(&self) -> bool {
    self.full_name.is_none()
      && self.bio.is_none()
      && self.profile_picture.is_none()
  }

  pub fn validate(&self) -> Result<()> {
    check_optional_text("full_name", self.full_name.as_deref(), Some(FULL_NAME_MAX_LEN))?;
    check_optional_text(
      "profile_picture",
      self.profile_picture.as_deref(),
      Some(PROFILE_PICTURE_MAX_LEN),
    )
  }

  /// Apply the update to a user in place.
  pub fn apply(self, user: &mut User) {
    if let Some(name) = self.full_name {
      user.full_name = Some(name);
    }
    if let Some(bio) = self.bio {
      user.bio = Some(bio);
    }
    if let Some(picture) = self.profile_picture {
      user.profile_picture = Some(picture);
    }
  }
}
