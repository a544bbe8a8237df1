//! Handler for `GET /feed/:user_id`.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use plaza_core::{
  UserId,
  feed::{FeedCursor, FeedPage},
  store::SocialStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct FeedParams {
  /// Opaque token from a previous page's `next_cursor`.
  pub cursor: Option<String>,
  /// Page size; clamped to the configured maximum.
  pub limit:  Option<usize>,
}

/// `GET /feed/:user_id[?cursor=...][&limit=...]`
///
/// Returns `{"posts": [...], "next_cursor": "..." | null}`.
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Path(user_id): Path<UserId>,
  Query(params): Query<FeedParams>,
) -> Result<Json<FeedPage>, ApiError>
where
  S: SocialStore + 'static,
{
  let cursor = params
    .cursor
    .as_deref()
    .filter(|c| !c.is_empty())
    .map(FeedCursor::decode)
    .transpose()?;
  let limit = state.feed.clamp(params.limit);

  let page = state.network.feed(user_id, cursor, limit).await?;
  Ok(Json(page))
}
