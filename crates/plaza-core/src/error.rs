//! Error types for `plaza-core`.
//!
//! Most variants describe bad caller input or a state conflict and are
//! returned to the caller as-is. [`Error::StorageUnavailable`] wraps
//! infrastructure failures, which a caller may retry; nothing in this crate
//! does. [`Error::CorruptRecord`] is a stored row that cannot be decoded and
//! will fail the same way every time.

use thiserror::Error;

use crate::id::{PostId, UserId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("user {follower_id} already follows user {user_id}")]
  DuplicateEdge { user_id: UserId, follower_id: UserId },

  #[error("user {0} cannot follow themselves")]
  SelfFollow(UserId),

  #[error("user not found: {0}")]
  UnknownUser(UserId),

  #[error("user {follower_id} does not follow user {user_id}")]
  EdgeNotFound { user_id: UserId, follower_id: UserId },

  #[error("post not found: {0}")]
  UnknownPost(PostId),

  #[error("email already registered: {0}")]
  DuplicateEmail(String),

  #[error("username already taken: {0}")]
  DuplicateUsername(String),

  #[error("invalid cursor: {0}")]
  InvalidCursor(String),

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("corrupt stored record: {0}")]
  CorruptRecord(String),

  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Stable snake_case name of the variant, used in API error bodies.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::DuplicateEdge { .. } => "duplicate_edge",
      Self::SelfFollow(_) => "self_follow",
      Self::UnknownUser(_) => "unknown_user",
      Self::EdgeNotFound { .. } => "edge_not_found",
      Self::UnknownPost(_) => "unknown_post",
      Self::DuplicateEmail(_) => "duplicate_email",
      Self::DuplicateUsername(_) => "duplicate_username",
      Self::InvalidCursor(_) => "invalid_cursor",
      Self::InvalidInput(_) => "invalid_input",
      Self::CorruptRecord(_) => "corrupt_record",
      Self::StorageUnavailable(_) => "storage_unavailable",
    }
  }

  /// `true` for infrastructure failures the caller may retry.
  pub fn is_transient(&self) -> bool {
    matches!(self, Self::StorageUnavailable(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
