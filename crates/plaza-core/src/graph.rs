//! In-memory follower graph.
//!
//! [`GraphIndex`] is a derived view over the follower edges held by the
//! store. It owns nothing: it can be thrown away and rebuilt from
//! [`SocialStore::list_follower_edges`](crate::store::SocialStore::list_follower_edges)
//! at any time. Forward and backward adjacency are kept as two maps over the
//! same edge set so both directions answer in O(1).

use std::{
  collections::{HashMap, HashSet},
  sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{follower::FollowerEdge, id::UserId};

#[derive(Debug, Default)]
struct Adjacency {
  /// follower -> users they follow
  followees: HashMap<UserId, HashSet<UserId>>,
  /// user -> users following them
  followers: HashMap<UserId, HashSet<UserId>>,
  edges:     usize,
}

impl Adjacency {
  fn insert(&mut self, user_id: UserId, follower_id: UserId) -> bool {
    let added = self
      .followees
      .entry(follower_id)
      .or_default()
      .insert(user_id);
    self.followers.entry(user_id).or_default().insert(follower_id);
    if added {
      self.edges += 1;
    }
    added
  }

  fn remove(&mut self, user_id: UserId, follower_id: UserId) -> bool {
    let removed = remove_from(&mut self.followees, follower_id, user_id);
    remove_from(&mut self.followers, user_id, follower_id);
    if removed {
      self.edges -= 1;
    }
    removed
  }
}

/// Remove `value` from the set at `key`, dropping the set once empty.
fn remove_from(
  map: &mut HashMap<UserId, HashSet<UserId>>,
  key: UserId,
  value: UserId,
) -> bool {
  let Some(set) = map.get_mut(&key) else {
    return false;
  };
  let removed = set.remove(&value);
  if set.is_empty() {
    map.remove(&key);
  }
  removed
}

/// Forward and backward adjacency over the follower edge set.
///
/// Readers take a shared lock; the lock is never held across an await point.
#[derive(Debug, Default)]
pub struct GraphIndex {
  inner: RwLock<Adjacency>,
}

impl GraphIndex {
  pub fn new() -> Self { Self::default() }

  /// Build an index from a complete edge listing.
  pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a FollowerEdge>) -> Self {
    let index = Self::new();
    index.rebuild(edges);
    index
  }

  fn read(&self) -> RwLockReadGuard<'_, Adjacency> {
    // The maps are always left consistent, so a poisoned lock is still usable.
    self.inner.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, Adjacency> {
    self.inner.write().unwrap_or_else(PoisonError::into_inner)
  }

  /// Replace the whole index with the given edges.
  pub fn rebuild<'a>(&self, edges: impl IntoIterator<Item = &'a FollowerEdge>) {
    let mut fresh = Adjacency::default();
    for edge in edges {
      fresh.insert(edge.user_id, edge.follower_id);
    }
    *self.write() = fresh;
  }

  /// Add an edge. Returns `false` if it was already present.
  pub fn insert(&self, edge: &FollowerEdge) -> bool {
    self.write().insert(edge.user_id, edge.follower_id)
  }

  /// Remove the edge "`follower_id` follows `user_id`". Returns `false` if
  /// it was not present.
  pub fn remove(&self, user_id: UserId, follower_id: UserId) -> bool {
    self.write().remove(user_id, follower_id)
  }

  /// The users `follower_id` follows.
  pub fn followees_of(&self, follower_id: UserId) -> HashSet<UserId> {
    self
      .read()
      .followees
      .get(&follower_id)
      .cloned()
      .unwrap_or_default()
  }

  /// The users following `user_id`.
  pub fn followers_of(&self, user_id: UserId) -> HashSet<UserId> {
    self
      .read()
      .followers
      .get(&user_id)
      .cloned()
      .unwrap_or_default()
  }

  pub fn follows(&self, follower_id: UserId, user_id: UserId) -> bool {
    self
      .read()
      .followees
      .get(&follower_id)
      .is_some_and(|set| set.contains(&user_id))
  }

  pub fn edge_count(&self) -> usize { self.read().edges }
}
