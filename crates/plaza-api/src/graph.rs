//! Handlers for the follower graph.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/follow` | Body: [`EdgeBody`]; 201 + edge; 409 duplicate, 422 self-follow, 404 unknown user |
//! | `POST` | `/unfollow` | Body: [`EdgeBody`]; 200 + removed edge; 404 if absent |
//! | `GET`  | `/users/:id/followers` | Ids of users following `:id` |
//! | `GET`  | `/users/:id/following` | Ids of users `:id` follows |
//!
//! Reads are answered from the in-memory graph index.

use std::collections::HashSet;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use plaza_core::{UserId, follower::FollowerEdge, store::SocialStore};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

/// JSON body accepted by `POST /follow` and `POST /unfollow`:
/// "`follower_id` (un)follows `user_id`".
#[derive(Debug, Deserialize)]
pub struct EdgeBody {
  pub user_id:     UserId,
  pub follower_id: UserId,
}

/// `POST /follow`
pub async fn follow<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<EdgeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SocialStore + 'static,
{
  let edge = state.network.follow(body.user_id, body.follower_id).await?;
  Ok((StatusCode::CREATED, Json(edge)))
}

/// `POST /unfollow`
pub async fn unfollow<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<EdgeBody>,
) -> Result<Json<FollowerEdge>, ApiError>
where
  S: SocialStore + 'static,
{
  let edge = state.network.unfollow(body.user_id, body.follower_id).await?;
  Ok(Json(edge))
}

fn sorted(ids: HashSet<UserId>) -> Vec<UserId> {
  let mut ids: Vec<UserId> = ids.into_iter().collect();
  ids.sort_unstable();
  ids
}

/// `GET /users/:id/followers`
pub async fn followers<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<UserId>,
) -> Json<Vec<UserId>>
where
  S: SocialStore + 'static,
{
  Json(sorted(state.network.followers_of(id)))
}

/// `GET /users/:id/following`
pub async fn following<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<UserId>,
) -> Json<Vec<UserId>>
where
  S: SocialStore + 'static,
{
  Json(sorted(state.network.followees_of(id)))
}
