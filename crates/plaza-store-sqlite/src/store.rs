//! [`SqliteStore`] — the SQLite implementation of [`SocialStore`].

use std::path::Path;

use plaza_core::{
  CommentId, PostId, UserId,
  comment::{Comment, NewComment},
  feed::FeedCursor,
  follower::{FollowerEdge, check_pair},
  post::{NewPost, Post},
  store::SocialStore,
  user::{NewUser, ProfileUpdate, User},
};
use rusqlite::{OptionalExtension as _, types::Value};

use crate::{
  Result,
  encode::{
    COMMENT_COLUMNS, POST_COLUMNS, RawComment, RawPost, RawUser, USER_COLUMNS,
    edge_from_row, encode_dt, encode_limit, now, to_stored_precision,
  },
  schema::SCHEMA,
};

type CoreError = plaza_core::Error;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Plaza entity store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    tracing::debug!(path = %path.as_ref().display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Query helpers (run on the connection thread) ────────────────────────────

fn row_exists(
  conn: &rusqlite::Connection,
  sql: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<bool> {
  Ok(conn.query_row(sql, params, |_| Ok(())).optional()?.is_some())
}

fn user_exists(conn: &rusqlite::Connection, id: UserId) -> rusqlite::Result<bool> {
  row_exists(conn, "SELECT 1 FROM users WHERE id = ?1", [id.get()])
}

fn select_user(
  conn: &rusqlite::Connection,
  id: UserId,
) -> rusqlite::Result<Option<RawUser>> {
  conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
      [id.get()],
      RawUser::from_row,
    )
    .optional()
}

fn select_edge(
  conn: &rusqlite::Connection,
  user_id: UserId,
  follower_id: UserId,
) -> rusqlite::Result<Option<FollowerEdge>> {
  conn
    .query_row(
      "SELECT id, user_id, follower_id FROM followers
       WHERE user_id = ?1 AND follower_id = ?2",
      [user_id.get(), follower_id.get()],
      edge_from_row,
    )
    .optional()
}

fn select_ids(
  conn: &rusqlite::Connection,
  sql: &str,
  id: UserId,
) -> rusqlite::Result<Vec<UserId>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map([id.get()], |row| row.get(0).map(UserId))?
    .collect()
}

// ─── SocialStore impl ────────────────────────────────────────────────────────

impl SocialStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    input.validate()?;
    let created_at = now();
    let at_str = encode_dt(created_at);

    let user = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if row_exists(&tx, "SELECT 1 FROM users WHERE email = ?1", [&input.email])? {
          return Ok(Err(CoreError::DuplicateEmail(input.email)));
        }
        if row_exists(&tx, "SELECT 1 FROM users WHERE username = ?1", [&input.username])? {
          return Ok(Err(CoreError::DuplicateUsername(input.username)));
        }

        tx.execute(
          "INSERT INTO users (
             email, password, is_active, username,
             full_name, bio, profile_picture, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            input.email,
            input.password.expose(),
            input.is_active,
            input.username,
            input.full_name,
            input.bio,
            input.profile_picture,
            at_str,
          ],
        )?;
        let id = UserId(tx.last_insert_rowid());
        tx.commit()?;

        Ok(Ok(User {
          id,
          email: input.email,
          username: input.username,
          password: input.password,
          is_active: input.is_active,
          full_name: input.full_name,
          bio: input.bio,
          profile_picture: input.profile_picture,
          created_at,
        }))
      })
      .await??;

    tracing::debug!(user_id = %user.id, username = %user.username, "user created");
    Ok(user)
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let raw = self.conn.call(move |conn| Ok(select_user(conn, id)?)).await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            [username],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<User> {
    update.validate()?;

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !user_exists(&tx, id)? {
          return Ok(Err(CoreError::UnknownUser(id)));
        }
        tx.execute(
          "UPDATE users SET
             full_name       = COALESCE(?2, full_name),
             bio             = COALESCE(?3, bio),
             profile_picture = COALESCE(?4, profile_picture)
           WHERE id = ?1",
          rusqlite::params![
            id.get(),
            update.full_name,
            update.bio,
            update.profile_picture,
          ],
        )?;
        let raw = select_user(&tx, id)?;
        tx.commit()?;
        Ok(raw.ok_or(CoreError::UnknownUser(id)))
      })
      .await??;

    raw.into_user()
  }

  async fn set_active(&self, id: UserId, active: bool) -> Result<User> {
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE users SET is_active = ?2 WHERE id = ?1",
          rusqlite::params![id.get(), active],
        )?;
        if changed == 0 {
          return Ok(Err(CoreError::UnknownUser(id)));
        }
        let raw = select_user(&tx, id)?;
        tx.commit()?;
        Ok(raw.ok_or(CoreError::UnknownUser(id)))
      })
      .await??;

    tracing::info!(user_id = %id, active, "user activation changed");
    raw.into_user()
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    input.validate()?;
    let created_at = input.created_at.map(to_stored_precision).unwrap_or_else(now);
    let at_str = encode_dt(created_at);

    let post = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !user_exists(&tx, input.user_id)? {
          return Ok(Err(CoreError::UnknownUser(input.user_id)));
        }
        tx.execute(
          "INSERT INTO posts (image_url, description, created_at, user_id)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            input.image_url,
            input.description,
            at_str,
            input.user_id.get(),
          ],
        )?;
        let id = PostId(tx.last_insert_rowid());
        tx.commit()?;

        Ok(Ok(Post {
          id,
          image_url: input.image_url,
          description: input.description,
          created_at,
          user_id: input.user_id,
        }))
      })
      .await??;

    Ok(post)
  }

  async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
            [id.get()],
            RawPost::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn posts_by_user(&self, user_id: UserId) -> Result<Vec<Post>> {
    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLUMNS} FROM posts
           WHERE user_id = ?1
           ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map([user_id.get()], RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  async fn posts_by_authors(
    &self,
    authors: &[UserId],
    before:  Option<FeedCursor>,
    limit:   usize,
  ) -> Result<Vec<Post>> {
    if authors.is_empty() || limit == 0 {
      return Ok(Vec::new());
    }

    // Build the statement with numbered placeholders: authors first, then
    // the optional cursor pair, then the limit.
    let mut params: Vec<Value> =
      authors.iter().map(|a| Value::Integer(a.get())).collect();
    let placeholders = (1..=authors.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");

    let mut sql = format!(
      "SELECT {POST_COLUMNS} FROM posts WHERE user_id IN ({placeholders})"
    );
    if let Some(cursor) = before {
      let at = params.len() + 1;
      let id = params.len() + 2;
      sql.push_str(&format!(
        " AND (created_at < ?{at} OR (created_at = ?{at} AND id < ?{id}))"
      ));
      params.push(Value::Text(encode_dt(cursor.created_at)));
      params.push(Value::Integer(cursor.post_id.get()));
    }
    sql.push_str(&format!(
      " ORDER BY created_at DESC, id DESC LIMIT ?{}",
      params.len() + 1
    ));
    params.push(Value::Integer(encode_limit(limit)));

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn create_comment(&self, input: NewComment) -> Result<Comment> {
    input.validate()?;
    let created_at = input.created_at.map(to_stored_precision).unwrap_or_else(now);
    let at_str = encode_dt(created_at);

    let comment = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !user_exists(&tx, input.user_id)? {
          return Ok(Err(CoreError::UnknownUser(input.user_id)));
        }
        if !row_exists(&tx, "SELECT 1 FROM posts WHERE id = ?1", [input.post_id.get()])? {
          return Ok(Err(CoreError::UnknownPost(input.post_id)));
        }
        tx.execute(
          "INSERT INTO comments (content, created_at, user_id, post_id)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            input.content,
            at_str,
            input.user_id.get(),
            input.post_id.get(),
          ],
        )?;
        let id = CommentId(tx.last_insert_rowid());
        tx.commit()?;

        Ok(Ok(Comment {
          id,
          content: input.content,
          created_at,
          user_id: input.user_id,
          post_id: input.post_id,
        }))
      })
      .await??;

    Ok(comment)
  }

  async fn get_comment(&self, id: CommentId) -> Result<Option<Comment>> {
    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"),
            [id.get()],
            RawComment::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn comments_for_post(&self, post_id: PostId) -> Result<Vec<Comment>> {
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments
           WHERE post_id = ?1
           ORDER BY created_at, id"
        ))?;
        let rows = stmt
          .query_map([post_id.get()], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  // ── Follower edges ────────────────────────────────────────────────────────

  async fn create_follower_edge(
    &self,
    user_id:     UserId,
    follower_id: UserId,
  ) -> Result<FollowerEdge> {
    check_pair(user_id, follower_id)?;

    let edge = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for id in [user_id, follower_id] {
          if !user_exists(&tx, id)? {
            return Ok(Err(CoreError::UnknownUser(id)));
          }
        }
        if select_edge(&tx, user_id, follower_id)?.is_some() {
          return Ok(Err(CoreError::DuplicateEdge { user_id, follower_id }));
        }
        tx.execute(
          "INSERT INTO followers (user_id, follower_id) VALUES (?1, ?2)",
          [user_id.get(), follower_id.get()],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Ok(FollowerEdge { id: id.into(), user_id, follower_id }))
      })
      .await??;

    Ok(edge)
  }

  async fn remove_follower_edge(
    &self,
    user_id:     UserId,
    follower_id: UserId,
  ) -> Result<FollowerEdge> {
    let edge = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(edge) = select_edge(&tx, user_id, follower_id)? else {
          return Ok(Err(CoreError::EdgeNotFound { user_id, follower_id }));
        };
        tx.execute("DELETE FROM followers WHERE id = ?1", [edge.id.get()])?;
        tx.commit()?;
        Ok(Ok(edge))
      })
      .await??;

    Ok(edge)
  }

  async fn list_follower_edges(&self) -> Result<Vec<FollowerEdge>> {
    let edges = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, user_id, follower_id FROM followers ORDER BY id")?;
        let rows = stmt
          .query_map([], edge_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(edges)
  }

  async fn followers_of(&self, user_id: UserId) -> Result<Vec<UserId>> {
    let ids = self
      .conn
      .call(move |conn| {
        Ok(select_ids(
          conn,
          "SELECT follower_id FROM followers WHERE user_id = ?1 ORDER BY follower_id",
          user_id,
        )?)
      })
      .await?;
    Ok(ids)
  }

  async fn followees_of(&self, follower_id: UserId) -> Result<Vec<UserId>> {
    let ids = self
      .conn
      .call(move |conn| {
        Ok(select_ids(
          conn,
          "SELECT user_id FROM followers WHERE follower_id = ?1 ORDER BY user_id",
          follower_id,
        )?)
      })
      .await?;
    Ok(ids)
  }
}
