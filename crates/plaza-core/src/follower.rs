//! Follower edges — the directed relationships the social graph is made of.

use serde::Serialize;

use crate::{
  Error, Result,
  id::{EdgeId, UserId},
};

/// "`follower_id` follows `user_id`."
///
/// At most one edge exists per ordered pair, and the two ends always differ.
/// Serialises as `{id, user_id, follower_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowerEdge {
  pub id:          EdgeId,
  /// The followed party.
  pub user_id:     UserId,
  /// The following party.
  pub follower_id: UserId,
}

/// Reject self-follows before touching storage.
pub fn check_pair(user_id: UserId, follower_id: UserId) -> Result<()> {
  if user_id == follower_id {
    return Err(Error::SelfFollow(user_id));
  }
  Ok(())
}
