//! Handlers for `/users` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/users` | All users |
//! | `POST`  | `/users` | Body: [`CreateUserBody`]; 201, or 409 on duplicate email/username |
//! | `GET`   | `/users/:id` | 404 if not found |
//! | `PATCH` | `/users/:id` | Body: [`ProfileBody`] |
//! | `POST`  | `/users/:id/activate`, `/users/:id/deactivate` | Soft (de)activation |
//! | `GET`   | `/users/:id/posts` | The user's posts, newest first |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use plaza_core::{
  UserId,
  post::Post,
  store::{SocialStore, lift},
  user::{Credential, NewUser, ProfileUpdate, User},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<User>>, ApiError>
where
  S: SocialStore + 'static,
{
  let users = state.store().list_users().await.map_err(lift)?;
  Ok(Json(users))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
  pub email:           String,
  pub username:        String,
  /// Stored as given; hashing is the caller's concern.
  pub password:        String,
  pub full_name:       Option<String>,
  pub bio:             Option<String>,
  pub profile_picture: Option<String>,
  pub is_active:       Option<bool>,
}

impl From<CreateUserBody> for NewUser {
  fn from(b: CreateUserBody) -> Self {
    NewUser {
      email:           b.email,
      username:        b.username,
      password:        Credential::new(b.password),
      is_active:       b.is_active.unwrap_or(true),
      full_name:       b.full_name,
      bio:             b.bio,
      profile_picture: b.profile_picture,
    }
  }
}

/// `POST /users` — returns 201 + the serialised [`User`].
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<CreateUserBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SocialStore + 'static,
{
  let user = state
    .store()
    .create_user(NewUser::from(body))
    .await
    .map_err(lift)?;
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

async fn load<S: SocialStore>(store: &S, id: UserId) -> Result<User, ApiError> {
  store
    .get_user(id)
    .await
    .map_err(lift)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))
}

/// `GET /users/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError>
where
  S: SocialStore + 'static,
{
  Ok(Json(load(state.store().as_ref(), id).await?))
}

// ─── Profile ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `PATCH /users/:id`. Absent fields are left alone.
#[derive(Debug, Deserialize)]
pub struct ProfileBody {
  pub full_name:       Option<String>,
  pub bio:             Option<String>,
  pub profile_picture: Option<String>,
}

/// `PATCH /users/:id`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<UserId>,
  Json(body): Json<ProfileBody>,
) -> Result<Json<User>, ApiError>
where
  S: SocialStore + 'static,
{
  let update = ProfileUpdate {
    full_name:       body.full_name,
    bio:             body.bio,
    profile_picture: body.profile_picture,
  };
  let user = state.store().update_profile(id, update).await.map_err(lift)?;
  Ok(Json(user))
}

/// `POST /users/:id/activate`
pub async fn activate<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError>
where
  S: SocialStore + 'static,
{
  let user = state.store().set_active(id, true).await.map_err(lift)?;
  Ok(Json(user))
}

/// `POST /users/:id/deactivate`
pub async fn deactivate<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError>
where
  S: SocialStore + 'static,
{
  let user = state.store().set_active(id, false).await.map_err(lift)?;
  Ok(Json(user))
}

// ─── Posts ────────────────────────────────────────────────────────────────────

/// `GET /users/:id/posts`
pub async fn posts<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<UserId>,
) -> Result<Json<Vec<Post>>, ApiError>
where
  S: SocialStore + 'static,
{
  let store = state.store();
  load(store.as_ref(), id).await?;
  let posts = store.posts_by_user(id).await.map_err(lift)?;
  Ok(Json(posts))
}
