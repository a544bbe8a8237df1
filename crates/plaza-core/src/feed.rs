//! Feed composition.
//!
//! A feed is the posts of everyone a user follows, newest first, ordered by
//! `(created_at, id)` descending so that equal timestamps still have a total
//! order. Pages are addressed with a [`FeedCursor`] rather than an offset:
//! the cursor names the last post already seen, and the next page starts
//! strictly after it. Posts inserted while a client is paging land at the
//! head of the feed and never shift the pages behind the cursor.

use std::{
  cmp::Ordering,
  collections::{BinaryHeap, HashSet},
  fmt,
  str::FromStr,
};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::{
  Error, Result,
  id::{PostId, UserId},
  post::Post,
  store::{SocialStore, lift},
};

/// Maximum number of authors passed to a single store query.
pub const AUTHOR_BATCH: usize = 500;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// A position in a feed: the `(created_at, id)` of a post.
///
/// Cursors order the same way feeds do, so "strictly before the cursor"
/// means `post.position() < cursor`. On the wire a cursor is an opaque
/// URL-safe base64 token; clients must not interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FeedCursor {
  pub created_at: DateTime<Utc>,
  pub post_id:    PostId,
}

impl FeedCursor {
  /// Encode as an opaque token.
  pub fn encode(&self) -> String {
    let raw = format!("{}:{}", self.created_at.timestamp_micros(), self.post_id);
    URL_SAFE_NO_PAD.encode(raw)
  }

  /// Decode a token produced by [`FeedCursor::encode`].
  pub fn decode(token: &str) -> Result<Self> {
    let invalid = || Error::InvalidCursor(token.to_owned());

    let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
    let raw = String::from_utf8(bytes).map_err(|_| invalid())?;
    let (micros, id) = raw.split_once(':').ok_or_else(invalid)?;

    let micros: i64 = micros.parse().map_err(|_| invalid())?;
    let id: i64 = id.parse().map_err(|_| invalid())?;
    let created_at = DateTime::from_timestamp_micros(micros).ok_or_else(invalid)?;

    Ok(Self { created_at, post_id: PostId(id) })
  }
}

impl fmt::Display for FeedCursor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.encode())
  }
}

impl FromStr for FeedCursor {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::decode(s) }
}

impl Serialize for FeedCursor {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

// ─── Page ────────────────────────────────────────────────────────────────────

/// One page of a feed. `next_cursor` is `None` once the feed is exhausted.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
  pub posts:       Vec<Post>,
  pub next_cursor: Option<FeedCursor>,
}

impl FeedPage {
  pub fn empty() -> Self { Self { posts: Vec::new(), next_cursor: None } }

  pub fn is_end(&self) -> bool { self.next_cursor.is_none() }
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// Heap entry: the head of one batch.
struct Head {
  position: FeedCursor,
  batch:    usize,
  offset:   usize,
}

impl PartialEq for Head {
  fn eq(&self, other: &Self) -> bool { self.position == other.position }
}

impl Eq for Head {}

impl PartialOrd for Head {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Head {
  fn cmp(&self, other: &Self) -> Ordering { self.position.cmp(&other.position) }
}

/// K-way merge of batches that are each already sorted newest first. Returns
/// at most `take` posts, newest first.
pub fn merge_newest_first(batches: Vec<Vec<Post>>, take: usize) -> Vec<Post> {
  let mut heap: BinaryHeap<Head> = batches
    .iter()
    .enumerate()
    .filter_map(|(batch, posts)| {
      posts.first().map(|p| Head { position: p.position(), batch, offset: 0 })
    })
    .collect();

  let mut merged: Vec<Post> = Vec::with_capacity(take.min(
    batches.iter().map(Vec::len).sum(),
  ));
  while merged.len() < take {
    let Some(head) = heap.pop() else { break };
    merged.push(batches[head.batch][head.offset].clone());

    let next = head.offset + 1;
    if let Some(p) = batches[head.batch].get(next) {
      heap.push(Head { position: p.position(), batch: head.batch, offset: next });
    }
  }
  merged
}

// ─── Composition ─────────────────────────────────────────────────────────────

/// Compose one page of the feed made of posts by `followees`.
///
/// Each batch of at most [`AUTHOR_BATCH`] authors is asked for `limit + 1`
/// posts before `cursor`; the extra post tells us whether another page
/// exists. An empty followee set, or a zero `limit`, yields an empty page.
pub async fn compose_feed<S: SocialStore>(
  store: &S,
  followees: &HashSet<UserId>,
  cursor: Option<FeedCursor>,
  limit: usize,
) -> Result<FeedPage> {
  if followees.is_empty() || limit == 0 {
    return Ok(FeedPage::empty());
  }

  let mut authors: Vec<UserId> = followees.iter().copied().collect();
  authors.sort_unstable();

  let fetch = limit.saturating_add(1);
  let mut batches = Vec::with_capacity(authors.len().div_ceil(AUTHOR_BATCH));
  for chunk in authors.chunks(AUTHOR_BATCH) {
    let posts = store
      .posts_by_authors(chunk, cursor, fetch)
      .await
      .map_err(lift)?;
    batches.push(posts);
  }

  let mut posts = merge_newest_first(batches, fetch);
  let next_cursor = if posts.len() > limit {
    posts.truncate(limit);
    posts.last().map(Post::position)
  } else {
    None
  };

  tracing::debug!(
    authors = authors.len(),
    returned = posts.len(),
    more = next_cursor.is_some(),
    "composed feed page"
  );

  Ok(FeedPage { posts, next_cursor })
}
