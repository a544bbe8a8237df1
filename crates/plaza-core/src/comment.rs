//! Comment — a reply attached to a post by a user.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  Result,
  id::{CommentId, PostId, UserId},
  validate::{check_text, check_timestamp},
};

/// Serialises as `{id, content, created_at, user_id, post_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
  pub id:         CommentId,
  pub content:    String,
  pub created_at: DateTime<Utc>,
  /// The author.
  pub user_id:    UserId,
  pub post_id:    PostId,
}

/// Input to [`crate::store::SocialStore::create_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
  pub user_id:    UserId,
  pub post_id:    PostId,
  pub content:    String,
  pub created_at: Option<DateTime<Utc>>,
}

impl NewComment {
  pub fn new(user_id: UserId, post_id: PostId, content: impl Into<String>) -> Self {
    Self { user_id, post_id, content: content.into(), created_at: None }
  }

  pub fn validate(&self) -> Result<()> {
    check_text("content", &self.content, None, true)?;
    check_timestamp("created_at", self.created_at)
  }
}
