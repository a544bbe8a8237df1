//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with exactly six fractional
//! digits and a `Z` suffix. For four-digit years that fixed width makes
//! lexical order equal to chronological order, which the feed queries rely
//! on; record validation rejects any other year. Ids are stored as plain
//! integers.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use plaza_core::{
  CommentId, EdgeId, PostId, UserId,
  comment::Comment,
  follower::FollowerEdge,
  post::Post,
  user::{Credential, User},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Truncate to the precision the store keeps.
pub fn to_stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

pub fn now() -> DateTime<Utc> { to_stored_precision(Utc::now()) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Limits ──────────────────────────────────────────────────────────────────

pub fn encode_limit(limit: usize) -> i64 { i64::try_from(limit).unwrap_or(i64::MAX) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str =
  "id, email, password, is_active, username, full_name, bio, profile_picture, created_at";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:              i64,
  pub email:           String,
  pub password:        String,
  pub is_active:       bool,
  pub username:        String,
  pub full_name:       Option<String>,
  pub bio:             Option<String>,
  pub profile_picture: Option<String>,
  pub created_at:      String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      email:           row.get(1)?,
      password:        row.get(2)?,
      is_active:       row.get(3)?,
      username:        row.get(4)?,
      full_name:       row.get(5)?,
      bio:             row.get(6)?,
      profile_picture: row.get(7)?,
      created_at:      row.get(8)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:              UserId(self.id),
      email:           self.email,
      username:        self.username,
      password:        Credential::new(self.password),
      is_active:       self.is_active,
      full_name:       self.full_name,
      bio:             self.bio,
      profile_picture: self.profile_picture,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawPost::from_row`].
pub const POST_COLUMNS: &str = "id, image_url, description, created_at, user_id";

/// Raw values read directly from a `posts` row.
pub struct RawPost {
  pub id:          i64,
  pub image_url:   String,
  pub description: Option<String>,
  pub created_at:  String,
  pub user_id:     i64,
}

impl RawPost {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      image_url:   row.get(1)?,
      description: row.get(2)?,
      created_at:  row.get(3)?,
      user_id:     row.get(4)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:          PostId(self.id),
      image_url:   self.image_url,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
      user_id:     UserId(self.user_id),
    })
  }
}

/// Column list matching [`RawComment::from_row`].
pub const COMMENT_COLUMNS: &str = "id, content, created_at, user_id, post_id";

/// Raw values read directly from a `comments` row.
pub struct RawComment {
  pub id:         i64,
  pub content:    String,
  pub created_at: String,
  pub user_id:    i64,
  pub post_id:    i64,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      content:    row.get(1)?,
      created_at: row.get(2)?,
      user_id:    row.get(3)?,
      post_id:    row.get(4)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id:         CommentId(self.id),
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
      user_id:    UserId(self.user_id),
      post_id:    PostId(self.post_id),
    })
  }
}

/// Map a `SELECT id, user_id, follower_id FROM followers` row.
pub fn edge_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FollowerEdge> {
  Ok(FollowerEdge {
    id:          EdgeId(row.get(0)?),
    user_id:     UserId(row.get(1)?),
    follower_id: UserId(row.get(2)?),
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let early = Utc.timestamp_opt(1_000, 5_000).unwrap();
    let later = Utc.timestamp_opt(1_000, 600_000_000).unwrap();
    let much_later = Utc.timestamp_opt(20_000_000_000, 0).unwrap();
    assert!(encode_dt(early) < encode_dt(later));
    assert!(encode_dt(later) < encode_dt(much_later));
  }

  #[test]
  fn timestamp_roundtrip_at_stored_precision() {
    let dt = to_stored_precision(Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap());
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
    assert!(encode_dt(dt).ends_with(".123456Z"));
  }

  #[test]
  fn garbage_timestamp_is_an_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
