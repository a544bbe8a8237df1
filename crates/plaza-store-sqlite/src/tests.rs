//! Integration tests for `SqliteStore` (and the `Network` service on top of
//! it) against an in-memory database.

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Duration, TimeZone as _, Utc};
use plaza_core::{
  Error as CoreError, PostId, UserId,
  comment::NewComment,
  network::Network,
  post::{NewPost, Post},
  store::SocialStore,
  user::{Credential, NewUser, ProfileUpdate},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(name: &str) -> NewUser {
  NewUser::new(
    format!("{name}@example.com"),
    name,
    Credential::new(format!("opaque-{name}")),
  )
}

async fn user(s: &SqliteStore, name: &str) -> UserId {
  s.create_user(new_user(name)).await.unwrap().id
}

fn t(secs: i64) -> DateTime<Utc> { Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap() }

async fn post_at(s: &SqliteStore, author: UserId, secs: i64) -> Post {
  s.create_post(NewPost::new(author, format!("https://img.example/{secs}.jpg")).at(t(secs)))
    .await
    .unwrap()
}

fn core(err: Error) -> CoreError { err.into() }

fn ids(posts: &[Post]) -> Vec<PostId> { posts.iter().map(|p| p.id).collect() }

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_user() {
  let s = store().await;

  let created = s.create_user(new_user("alice")).await.unwrap();
  assert!(created.is_active);

  let fetched = s.get_user(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.username, "alice");
  assert_eq!(fetched.email, "alice@example.com");
  assert_eq!(fetched.password.expose(), "opaque-alice");
  assert_eq!(fetched.created_at, created.created_at);
  assert!(fetched.full_name.is_none());
  assert!(fetched.bio.is_none());
  assert!(fetched.profile_picture.is_none());

  let by_name = s.get_user_by_username("alice").await.unwrap().unwrap();
  assert_eq!(by_name.id, created.id);
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(UserId(404)).await.unwrap().is_none());
  assert!(s.get_user_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  user(&s, "alice").await;

  let mut again = new_user("alice2");
  again.email = "alice@example.com".into();
  let err = s.create_user(again).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DuplicateEmail(_))));
  assert_eq!(s.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  user(&s, "alice").await;

  let mut again = new_user("alice");
  again.email = "other@example.com".into();
  let err = s.create_user(again).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DuplicateUsername(_))));
}

#[tokio::test]
async fn invalid_user_input_is_rejected() {
  let s = store().await;
  let mut bad = new_user("alice");
  bad.username = "x".repeat(51);
  let err = s.create_user(bad).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidInput(_))));
}

#[tokio::test]
async fn update_profile_changes_only_given_fields() {
  let s = store().await;
  let id = user(&s, "alice").await;

  let updated = s
    .update_profile(id, ProfileUpdate {
      full_name: Some("Alice Liddell".into()),
      bio: Some("Curiouser and curiouser".into()),
      profile_picture: None,
    })
    .await
    .unwrap();
  assert_eq!(updated.full_name.as_deref(), Some("Alice Liddell"));
  assert_eq!(updated.bio.as_deref(), Some("Curiouser and curiouser"));
  assert_eq!(updated.profile_picture, None);

  let updated = s
    .update_profile(id, ProfileUpdate {
      profile_picture: Some("https://img.example/alice.png".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.full_name.as_deref(), Some("Alice Liddell"));
  assert_eq!(
    updated.profile_picture.as_deref(),
    Some("https://img.example/alice.png")
  );
}

#[tokio::test]
async fn update_profile_unknown_user_errors() {
  let s = store().await;
  let err = s
    .update_profile(UserId(9), ProfileUpdate::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UnknownUser(UserId(9)))));
}

#[tokio::test]
async fn deactivation_is_soft() {
  let s = store().await;
  let id = user(&s, "alice").await;

  let off = s.set_active(id, false).await.unwrap();
  assert!(!off.is_active);
  assert!(s.get_user(id).await.unwrap().is_some());
  assert_eq!(s.list_users().await.unwrap().len(), 1);

  let on = s.set_active(id, true).await.unwrap();
  assert!(on.is_active);

  let err = s.set_active(UserId(77), false).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UnknownUser(_))));
}

// ─── Posts and comments ──────────────────────────────────────────────────────

#[tokio::test]
async fn post_requires_existing_owner() {
  let s = store().await;
  let err = s
    .create_post(NewPost::new(UserId(1), "https://img.example/a.jpg").describe("hi"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UnknownUser(UserId(1)))));
}

#[tokio::test]
async fn post_roundtrip_and_author_listing() {
  let s = store().await;
  let bob = user(&s, "bob").await;

  let first = post_at(&s, bob, 10).await;
  let second = post_at(&s, bob, 20).await;

  let fetched = s.get_post(first.id).await.unwrap().unwrap();
  assert_eq!(fetched, first);
  assert!(s.get_post(PostId(999)).await.unwrap().is_none());

  let listed = s.posts_by_user(bob).await.unwrap();
  assert_eq!(ids(&listed), [second.id, first.id]);
}

#[tokio::test]
async fn unset_description_reads_back_as_none() {
  let s = store().await;
  let bob = user(&s, "bob").await;

  let bare = post_at(&s, bob, 10).await;
  assert_eq!(s.get_post(bare.id).await.unwrap().unwrap().description, None);

  let described = s
    .create_post(NewPost::new(bob, "https://img.example/d.jpg").describe(""))
    .await
    .unwrap();
  let fetched = s.get_post(described.id).await.unwrap().unwrap();
  assert_eq!(fetched.description.as_deref(), Some(""));
}

#[tokio::test]
async fn post_outside_four_digit_years_is_rejected() {
  let s = store().await;
  let bob = user(&s, "bob").await;
  let far = Utc.with_ymd_and_hms(12_000, 1, 1, 0, 0, 0).unwrap();

  let err = s
    .create_post(NewPost::new(bob, "https://img.example/far.jpg").at(far))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidInput(_))));
  assert!(s.posts_by_user(bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn default_post_timestamp_is_store_assigned() {
  let s = store().await;
  let bob = user(&s, "bob").await;
  let before = Utc::now() - Duration::seconds(1);

  let post = s
    .create_post(NewPost::new(bob, "https://img.example/now.jpg"))
    .await
    .unwrap();
  assert!(post.created_at > before);
  assert_eq!(s.get_post(post.id).await.unwrap().unwrap().created_at, post.created_at);
}

#[tokio::test]
async fn comments_attach_to_posts() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let post = post_at(&s, bob, 10).await;

  let c1 = s
    .create_comment(NewComment::new(alice, post.id, "Nice!"))
    .await
    .unwrap();
  let c2 = s
    .create_comment(NewComment::new(bob, post.id, "Thanks"))
    .await
    .unwrap();

  assert_eq!(s.get_comment(c1.id).await.unwrap().unwrap().content, "Nice!");
  let thread = s.comments_for_post(post.id).await.unwrap();
  assert_eq!(thread.iter().map(|c| c.id).collect::<Vec<_>>(), [c1.id, c2.id]);
}

#[tokio::test]
async fn comment_requires_author_and_post() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let post = post_at(&s, alice, 1).await;

  let err = s
    .create_comment(NewComment::new(UserId(50), post.id, "ghost"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UnknownUser(UserId(50)))));

  let err = s
    .create_comment(NewComment::new(alice, PostId(50), "lost"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UnknownPost(PostId(50)))));

  let err = s
    .create_comment(NewComment::new(alice, post.id, "  "))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidInput(_))));
}

// ─── Follower edges ──────────────────────────────────────────────────────────

#[tokio::test]
async fn follow_then_unfollow() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;

  let edge = s.create_follower_edge(a, b).await.unwrap();
  assert_eq!((edge.user_id, edge.follower_id), (a, b));
  assert_eq!(s.followees_of(b).await.unwrap(), [a]);
  assert_eq!(s.followers_of(a).await.unwrap(), [b]);

  let removed = s.remove_follower_edge(a, b).await.unwrap();
  assert_eq!(removed, edge);
  assert!(s.followees_of(b).await.unwrap().is_empty());
}

#[tokio::test]
async fn self_follow_is_rejected() {
  let s = store().await;
  let a = user(&s, "a").await;
  let err = s.create_follower_edge(a, a).await.unwrap_err();
  assert!(matches!(core(err), CoreError::SelfFollow(id) if id == a));
}

#[tokio::test]
async fn follow_unknown_user_is_rejected() {
  let s = store().await;
  let a = user(&s, "a").await;

  let err = s.create_follower_edge(a, UserId(99)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::UnknownUser(UserId(99))));
  let err = s.create_follower_edge(UserId(98), a).await.unwrap_err();
  assert!(matches!(core(err), CoreError::UnknownUser(UserId(98))));
  assert!(s.list_follower_edges().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_follow_is_rejected() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;

  s.create_follower_edge(a, b).await.unwrap();
  let err = s.create_follower_edge(a, b).await.unwrap_err();
  assert!(matches!(core(err), CoreError::DuplicateEdge { .. }));

  // The reverse direction is a different edge.
  s.create_follower_edge(b, a).await.unwrap();
  assert_eq!(s.list_follower_edges().await.unwrap().len(), 2);
}

#[tokio::test]
async fn unfollow_missing_edge_errors() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;
  let err = s.remove_follower_edge(a, b).await.unwrap_err();
  assert!(matches!(core(err), CoreError::EdgeNotFound { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_follows_yield_exactly_one_edge() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;

  let handles: Vec<_> = (0..8)
    .map(|_| {
      let s = s.clone();
      tokio::spawn(async move { s.create_follower_edge(a, b).await })
    })
    .collect();

  let mut successes = 0;
  let mut duplicates = 0;
  for handle in handles {
    match handle.await.unwrap() {
      Ok(_) => successes += 1,
      Err(Error::Core(CoreError::DuplicateEdge { .. })) => duplicates += 1,
      Err(other) => panic!("unexpected error: {other}"),
    }
  }
  assert_eq!(successes, 1);
  assert_eq!(duplicates, 7);
}

// ─── Network: index consistency and feeds ────────────────────────────────────

async fn network(s: &SqliteStore) -> Network<SqliteStore> {
  Network::open(Arc::new(s.clone())).await.unwrap()
}

#[tokio::test]
async fn index_reflects_follow_immediately() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;
  let net = network(&s).await;

  net.follow(a, b).await.unwrap();
  assert!(net.followees_of(b).contains(&a));
  assert!(net.followers_of(a).contains(&b));

  net.unfollow(a, b).await.unwrap();
  assert!(!net.followees_of(b).contains(&a));
  assert!(net.followers_of(a).is_empty());
}

#[tokio::test]
async fn index_is_rebuilt_from_storage_on_open() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;
  let c = user(&s, "c").await;
  s.create_follower_edge(a, b).await.unwrap();
  s.create_follower_edge(c, b).await.unwrap();

  let net = network(&s).await;
  assert_eq!(net.followees_of(b), HashSet::from([a, c]));
  assert_eq!(net.index().edge_count(), 2);
}

#[tokio::test]
async fn failed_follow_leaves_index_untouched() {
  let s = store().await;
  let a = user(&s, "a").await;
  let net = network(&s).await;

  assert!(matches!(net.follow(a, a).await, Err(CoreError::SelfFollow(_))));
  assert!(matches!(net.follow(a, UserId(42)).await, Err(CoreError::UnknownUser(_))));
  assert!(matches!(net.unfollow(a, UserId(42)).await, Err(CoreError::EdgeNotFound { .. })));
  assert_eq!(net.index().edge_count(), 0);
}

/// Poll until both storage and the index report `expected` as
/// `follower`'s followees.
async fn settles_to(
  s: &SqliteStore,
  net: &Network<SqliteStore>,
  follower: UserId,
  expected: HashSet<UserId>,
) -> bool {
  let settle = async {
    loop {
      let stored: HashSet<UserId> =
        s.followees_of(follower).await.unwrap().into_iter().collect();
      if stored == expected && net.followees_of(follower) == expected {
        return;
      }
      tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
  };
  tokio::time::timeout(std::time::Duration::from_secs(2), settle)
    .await
    .is_ok()
}

#[tokio::test]
async fn abandoned_follow_still_reaches_index() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;
  let net = network(&s).await;

  // Dropped after its first poll, while the insert is queued on the
  // connection thread.
  let abandoned = tokio::time::timeout(std::time::Duration::ZERO, net.follow(a, b)).await;
  assert!(abandoned.is_err());

  assert!(
    settles_to(&s, &net, b, HashSet::from([a])).await,
    "store and index diverged"
  );
  assert!(matches!(net.follow(a, b).await, Err(CoreError::DuplicateEdge { .. })));
}

#[tokio::test]
async fn abandoned_unfollow_still_reaches_index() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;
  let net = network(&s).await;
  net.follow(a, b).await.unwrap();

  let abandoned = tokio::time::timeout(std::time::Duration::ZERO, net.unfollow(a, b)).await;
  assert!(abandoned.is_err());

  assert!(
    settles_to(&s, &net, b, HashSet::new()).await,
    "store and index diverged"
  );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_network_follows_yield_one_success() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;
  let net = Arc::new(network(&s).await);

  let (first, second) = tokio::join!(
    tokio::spawn({
      let net = net.clone();
      async move { net.follow(a, b).await }
    }),
    tokio::spawn({
      let net = net.clone();
      async move { net.follow(a, b).await }
    }),
  );
  let results = [first.unwrap(), second.unwrap()];
  assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
  assert!(
    results
      .iter()
      .any(|r| matches!(r, Err(CoreError::DuplicateEdge { .. })))
  );
  assert_eq!(net.index().edge_count(), 1);
}

#[tokio::test]
async fn feed_contains_only_followees_newest_first() {
  // Alice follows Bob. Bob posts P1@10 and P2@20; Carol posts P3@15.
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let carol = user(&s, "carol").await;
  let net = network(&s).await;

  net.follow(bob, alice).await.unwrap();
  let p1 = post_at(&s, bob, 10).await;
  let p2 = post_at(&s, bob, 20).await;
  let _p3 = post_at(&s, carol, 15).await;

  let page = net.feed(alice, None, 10).await.unwrap();
  assert_eq!(ids(&page.posts), [p2.id, p1.id]);
  assert!(page.is_end());
}

#[tokio::test]
async fn feed_without_followees_is_empty() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  post_at(&s, bob, 1).await;
  let net = network(&s).await;

  let page = net.feed(alice, None, 10).await.unwrap();
  assert!(page.posts.is_empty());
  assert!(page.is_end());

  let unknown = net.feed(UserId(12345), None, 10).await.unwrap();
  assert!(unknown.posts.is_empty());
}

#[tokio::test]
async fn feed_respects_limit_and_breaks_ties_by_id() {
  let s = store().await;
  let reader = user(&s, "reader").await;
  let x = user(&s, "x").await;
  let y = user(&s, "y").await;
  let net = network(&s).await;
  net.follow(x, reader).await.unwrap();
  net.follow(y, reader).await.unwrap();

  // Four posts sharing one timestamp, plus one older.
  let mut same_time = Vec::new();
  for author in [x, y, x, y] {
    same_time.push(post_at(&s, author, 50).await.id);
  }
  let older = post_at(&s, x, 40).await.id;

  let page = net.feed(reader, None, 3).await.unwrap();
  assert_eq!(page.posts.len(), 3);
  let expected: Vec<PostId> = same_time.iter().rev().take(3).copied().collect();
  assert_eq!(ids(&page.posts), expected);
  assert!(page.next_cursor.is_some());

  let rest = net.feed(reader, page.next_cursor, 3).await.unwrap();
  assert_eq!(ids(&rest.posts), [same_time[0], older]);
  assert!(rest.is_end());
}

#[tokio::test]
async fn feed_is_strictly_descending() {
  let s = store().await;
  let reader = user(&s, "reader").await;
  let net = network(&s).await;
  for i in 0..4 {
    let author = user(&s, &format!("author{i}")).await;
    net.follow(author, reader).await.unwrap();
    for k in 0..5 {
      post_at(&s, author, (k * 7 + i * 3) % 17).await;
    }
  }

  let page = net.feed(reader, None, 15).await.unwrap();
  assert_eq!(page.posts.len(), 15);
  for pair in page.posts.windows(2) {
    assert!(pair[0].position() > pair[1].position());
  }
}

#[tokio::test]
async fn zero_limit_yields_empty_page() {
  let s = store().await;
  let a = user(&s, "a").await;
  let b = user(&s, "b").await;
  let net = network(&s).await;
  net.follow(b, a).await.unwrap();
  post_at(&s, b, 1).await;

  let page = net.feed(a, None, 0).await.unwrap();
  assert!(page.posts.is_empty());
  assert!(page.is_end());
}

#[tokio::test]
async fn pagination_is_complete_under_concurrent_inserts() {
  let s = store().await;
  let reader = user(&s, "reader").await;
  let net = network(&s).await;

  let mut authors = Vec::new();
  for i in 0..3 {
    let author = user(&s, &format!("author{i}")).await;
    net.follow(author, reader).await.unwrap();
    authors.push(author);
  }
  for k in 0..20 {
    post_at(&s, authors[k % 3], k as i64 / 2).await;
  }

  let unpaginated = net.feed(reader, None, 1_000).await.unwrap();
  assert_eq!(unpaginated.posts.len(), 20);

  let mut collected = Vec::new();
  let mut cursor = None;
  let mut round = 0;
  loop {
    let page = net.feed(reader, cursor, 3).await.unwrap();
    collected.extend(page.posts.iter().map(|p| p.id));

    // New posts arriving mid-pagination are newer than anything paged so far.
    post_at(&s, authors[round % 3], 1_000 + round as i64).await;
    round += 1;

    match page.next_cursor {
      Some(next) => cursor = Some(next),
      None => break,
    }
  }

  assert_eq!(collected, ids(&unpaginated.posts));
  let unique: HashSet<_> = collected.iter().collect();
  assert_eq!(unique.len(), collected.len());
}

#[test]
fn connection_errors_convert_to_unavailable() {
  let core: CoreError = Error::Database(tokio_rusqlite::Error::ConnectionClosed).into();
  assert!(core.is_transient());
  assert_eq!(core.kind(), "storage_unavailable");
}

#[test]
fn undecodable_rows_are_not_retryable() {
  let core: CoreError = Error::DateParse("\"yesterday\"".into()).into();
  assert!(!core.is_transient());
  assert_eq!(core.kind(), "corrupt_record");
}
