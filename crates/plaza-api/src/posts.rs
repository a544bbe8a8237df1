//! Handlers for `/posts` and `/comments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/posts` | Body: [`NewPostBody`]; 201, or 404 if the owner is unknown |
//! | `GET`  | `/posts/:id` | Single post |
//! | `GET`  | `/posts/:id/comments` | Comments, oldest first |
//! | `POST` | `/comments` | Body: [`NewCommentBody`]; 201 |
//! | `GET`  | `/comments/:id` | Single comment |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use plaza_core::{
  CommentId, PostId, UserId,
  comment::{Comment, NewComment},
  post::{NewPost, Post},
  store::{SocialStore, lift},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── Posts ────────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /posts`.
#[derive(Debug, Deserialize)]
pub struct NewPostBody {
  pub user_id:     UserId,
  pub image_url:   String,
  pub description: Option<String>,
  /// Backfill timestamp; defaults to now.
  pub created_at:  Option<DateTime<Utc>>,
}

impl From<NewPostBody> for NewPost {
  fn from(b: NewPostBody) -> Self {
    NewPost {
      user_id:     b.user_id,
      image_url:   b.image_url,
      description: b.description,
      created_at:  b.created_at,
    }
  }
}

/// `POST /posts` — returns 201 + the stored [`Post`].
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewPostBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SocialStore + 'static,
{
  let post = state
    .store()
    .create_post(NewPost::from(body))
    .await
    .map_err(lift)?;
  Ok((StatusCode::CREATED, Json(post)))
}

async fn load<S: SocialStore>(store: &S, id: PostId) -> Result<Post, ApiError> {
  store
    .get_post(id)
    .await
    .map_err(lift)?
    .ok_or_else(|| ApiError::NotFound(format!("post {id} not found")))
}

/// `GET /posts/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<PostId>,
) -> Result<Json<Post>, ApiError>
where
  S: SocialStore + 'static,
{
  Ok(Json(load(state.store().as_ref(), id).await?))
}

/// `GET /posts/:id/comments`
pub async fn comments<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<PostId>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: SocialStore + 'static,
{
  let store = state.store();
  load(store.as_ref(), id).await?;
  let comments = store.comments_for_post(id).await.map_err(lift)?;
  Ok(Json(comments))
}

// ─── Comments ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /comments`.
#[derive(Debug, Deserialize)]
pub struct NewCommentBody {
  pub user_id: UserId,
  pub post_id: PostId,
  pub content: String,
}

/// `POST /comments` — returns 201 + the stored [`Comment`].
pub async fn create_comment<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewCommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SocialStore + 'static,
{
  let comment = state
    .store()
    .create_comment(NewComment::new(body.user_id, body.post_id, body.content))
    .await
    .map_err(lift)?;
  Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /comments/:id`
pub async fn get_comment<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<CommentId>,
) -> Result<Json<Comment>, ApiError>
where
  S: SocialStore + 'static,
{
  let comment = state
    .store()
    .get_comment(id)
    .await
    .map_err(lift)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {id} not found")))?;
  Ok(Json(comment))
}
