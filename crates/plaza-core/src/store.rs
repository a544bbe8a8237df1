//! The `SocialStore` trait — the Entity Store contract.
//!
//! The trait is implemented by storage backends (e.g. `plaza-store-sqlite`).
//! Higher layers (`plaza-api`, `plaza-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  comment::{Comment, NewComment},
  feed::FeedCursor,
  follower::FollowerEdge,
  id::{CommentId, PostId, UserId},
  post::{NewPost, Post},
  user::{NewUser, ProfileUpdate, User},
};

/// Abstraction over a Plaza storage backend.
///
/// Every mutation checks its invariants and writes in one atomic step: a
/// failed call leaves no trace. Domain failures are reported as
/// [`crate::Error`] values wrapped in the backend's own error type, which must
/// convert back into [`crate::Error`] so callers can tell them apart from
/// infrastructure failures.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SocialStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register a user. Fails with `DuplicateEmail` or `DuplicateUsername`.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// All users, active or not, in id order.
  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Overwrite the profile fields set in `update`. Fails with `UnknownUser`.
  fn update_profile(
    &self,
    id: UserId,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Soft (de)activation. Fails with `UnknownUser`.
  fn set_active(
    &self,
    id: UserId,
    active: bool,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Publish a post. Fails with `UnknownUser` if the owner does not exist.
  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// A single user's posts, newest first.
  fn posts_by_user(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  /// Posts by any of `authors` positioned strictly before `before` (or all
  /// of them if `before` is `None`), ordered by `(created_at, id)`
  /// descending, at most `limit`.
  fn posts_by_authors<'a>(
    &'a self,
    authors: &'a [UserId],
    before: Option<FeedCursor>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + 'a;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Attach a comment. Fails with `UnknownUser` or `UnknownPost`.
  fn create_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: CommentId,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// A post's comments, oldest first.
  fn comments_for_post(
    &self,
    post_id: PostId,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  // ── Follower edges ────────────────────────────────────────────────────

  /// Record that `follower_id` follows `user_id`.
  ///
  /// Fails with `SelfFollow` if the ids are equal, `UnknownUser` if either is
  /// absent, and `DuplicateEdge` if the edge already exists. Of two racing
  /// calls for the same pair exactly one succeeds.
  fn create_follower_edge(
    &self,
    user_id: UserId,
    follower_id: UserId,
  ) -> impl Future<Output = Result<FollowerEdge, Self::Error>> + Send + '_;

  /// Delete the edge and return it. Fails with `EdgeNotFound`.
  fn remove_follower_edge(
    &self,
    user_id: UserId,
    follower_id: UserId,
  ) -> impl Future<Output = Result<FollowerEdge, Self::Error>> + Send + '_;

  /// Every edge, in id order. Used to rebuild the graph index.
  fn list_follower_edges(
    &self,
  ) -> impl Future<Output = Result<Vec<FollowerEdge>, Self::Error>> + Send + '_;

  /// Ids of the users following `user_id`, read from storage.
  fn followers_of(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<UserId>, Self::Error>> + Send + '_;

  /// Ids of the users `follower_id` follows, read from storage.
  fn followees_of(
    &self,
    follower_id: UserId,
  ) -> impl Future<Output = Result<Vec<UserId>, Self::Error>> + Send + '_;
}

/// Convert a backend error into the core [`crate::Error`] taxonomy.
///
/// Spelled out as a function so `map_err(lift)` pins the target type.
pub fn lift<E: Into<crate::Error>>(err: E) -> crate::Error { err.into() }
