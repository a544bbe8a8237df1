//! Post — the unit of content that feeds are made of.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  Result,
  feed::FeedCursor,
  id::{PostId, UserId},
  validate::{check_text, check_timestamp},
};

pub const IMAGE_URL_MAX_LEN: usize = 255;

/// A published post. Posts are append-only.
///
/// Serialises as `{id, image_url, description, created_at, user_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
  pub id:          PostId,
  pub image_url:   String,
  pub description: Option<String>,
  pub created_at:  DateTime<Utc>,
  /// The owning user.
  pub user_id:     UserId,
}

impl Post {
  /// This post's position in a feed ordering.
  pub fn position(&self) -> FeedCursor {
    FeedCursor { created_at: self.created_at, post_id: self.id }
  }
}

/// Input to [`crate::store::SocialStore::create_post`].
#[derive(Debug, Clone)]
pub struct NewPost {
  pub user_id:     UserId,
  pub image_url:   String,
  pub description: Option<String>,
  /// Defaults to the store's clock. Supplied only for imports and backfills.
  pub created_at:  Option<DateTime<Utc>>,
}

impl NewPost {
  pub fn new(user_id: UserId, image_url: impl Into<String>) -> Self {
    Self {
      user_id,
      image_url: image_url.into(),
      description: None,
      created_at: None,
    }
  }

  pub fn describe(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
    self.created_at = Some(created_at);
    self
  }

  pub fn validate(&self) -> Result<()> {
    check_text("image_url", &self.image_url, Some(IMAGE_URL_MAX_LEN), true)?;
    check_timestamp("created_at", self.created_at)
  }
}
