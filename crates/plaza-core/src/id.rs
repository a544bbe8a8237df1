//! Strongly-typed entity identifiers.
//!
//! Identifiers are store-assigned positive integers. Each entity gets its own
//! newtype so a post id can never be passed where a user id is expected. All
//! of them serialise as bare integers.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl $name {
      /// The raw integer value, as stored in the database.
      pub fn get(self) -> i64 { self.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }

    impl From<i64> for $name {
      fn from(id: i64) -> Self { Self(id) }
    }

    impl From<$name> for i64 {
      fn from(id: $name) -> Self { id.0 }
    }
  };
}

entity_id!(
  /// Identifies a [`User`](crate::user::User).
  UserId
);
entity_id!(
  /// Identifies a [`Post`](crate::post::Post).
  PostId
);
entity_id!(
  /// Identifies a [`Comment`](crate::comment::Comment).
  CommentId
);
entity_id!(
  /// Identifies a [`FollowerEdge`](crate::follower::FollowerEdge).
  EdgeId
);
