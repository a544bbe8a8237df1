//! [`Network`] — the social-graph service.
//!
//! Holds the explicit store handle and the graph index derived from it.
//! Follow and unfollow go through here so the index observes every edge
//! mutation before the caller does (read-your-writes), and feeds are
//! composed from the index's followee sets.
//!
//! An edge mutation and its index update run together on a spawned task.
//! Dropping the caller's future (a client hanging up mid-request) abandons
//! the wait for the result, never the index update for a committed write.

use std::{collections::HashSet, future::Future, sync::Arc};

use tokio::sync::Mutex;

use crate::{
  Error, Result,
  feed::{FeedCursor, FeedPage, compose_feed},
  follower::{FollowerEdge, check_pair},
  graph::GraphIndex,
  id::UserId,
  store::{SocialStore, lift},
};

pub struct Network<S> {
  store:       Arc<S>,
  index:       Arc<GraphIndex>,
  /// Serialises edge mutations so index updates are applied in commit order.
  edge_writes: Arc<Mutex<()>>,
}

impl<S: SocialStore + 'static> Network<S> {
  /// Wrap `store` and build the graph index from its follower edges.
  pub async fn open(store: Arc<S>) -> Result<Self> {
    let network = Self {
      store,
      index: Arc::new(GraphIndex::new()),
      edge_writes: Arc::new(Mutex::new(())),
    };
    network.rebuild_index().await?;
    Ok(network)
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn index(&self) -> &GraphIndex { &self.index }

  /// Discard the index and rebuild it from storage. Returns the edge count.
  pub async fn rebuild_index(&self) -> Result<usize> {
    let _guard = self.edge_writes.lock().await;
    let edges = self.store.list_follower_edges().await.map_err(lift)?;
    self.index.rebuild(&edges);
    tracing::info!(edges = edges.len(), "graph index rebuilt");
    Ok(edges.len())
  }

  /// Run `mutate` against the store, then `apply` its result to the index,
  /// under the edge-write lock on a task of its own.
  async fn commit_edge<F, Fut>(
    &self,
    mutate: F,
    apply: fn(&GraphIndex, &FollowerEdge),
  ) -> Result<FollowerEdge>
  where
    F: FnOnce(Arc<S>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<FollowerEdge>> + Send + 'static,
  {
    let store = Arc::clone(&self.store);
    let index = Arc::clone(&self.index);
    let writes = Arc::clone(&self.edge_writes);

    let task = tokio::spawn(async move {
      let _guard = writes.lock_owned().await;
      let edge = mutate(store).await?;
      apply(&index, &edge);
      Ok::<_, Error>(edge)
    });
    task
      .await
      .map_err(|e| Error::StorageUnavailable(Box::new(e)))?
  }

  /// `follower_id` starts following `user_id`.
  pub async fn follow(
    &self,
    user_id: UserId,
    follower_id: UserId,
  ) -> Result<FollowerEdge> {
    check_pair(user_id, follower_id)?;

    let edge = self
      .commit_edge(
        move |store| async move {
          store
            .create_follower_edge(user_id, follower_id)
            .await
            .map_err(lift)
        },
        |index, edge| {
          index.insert(edge);
        },
      )
      .await?;

    tracing::info!(%user_id, %follower_id, edge_id = %edge.id, "follow");
    Ok(edge)
  }

  /// `follower_id` stops following `user_id`.
  pub async fn unfollow(
    &self,
    user_id: UserId,
    follower_id: UserId,
  ) -> Result<FollowerEdge> {
    let edge = self
      .commit_edge(
        move |store| async move {
          store
            .remove_follower_edge(user_id, follower_id)
            .await
            .map_err(lift)
        },
        |index, edge| {
          index.remove(edge.user_id, edge.follower_id);
        },
      )
      .await?;

    tracing::info!(%user_id, %follower_id, edge_id = %edge.id, "unfollow");
    Ok(edge)
  }

  pub fn followees_of(&self, follower_id: UserId) -> HashSet<UserId> {
    self.index.followees_of(follower_id)
  }

  pub fn followers_of(&self, user_id: UserId) -> HashSet<UserId> {
    self.index.followers_of(user_id)
  }

  /// One page of `user_id`'s feed. Unknown users get an empty feed.
  pub async fn feed(
    &self,
    user_id: UserId,
    cursor: Option<FeedCursor>,
    limit: usize,
  ) -> Result<FeedPage> {
    let followees = self.index.followees_of(user_id);
    compose_feed(self.store.as_ref(), &followees, cursor, limit).await
  }
}
