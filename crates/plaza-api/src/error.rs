//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use plaza_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error(transparent)]
  Domain(#[from] CoreError),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Domain(e) => match e {
        CoreError::DuplicateEdge { .. }
        | CoreError::DuplicateEmail(_)
        | CoreError::DuplicateUsername(_) => StatusCode::CONFLICT,
        CoreError::SelfFollow(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::UnknownUser(_)
        | CoreError::UnknownPost(_)
        | CoreError::EdgeNotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::InvalidCursor(_) | CoreError::InvalidInput(_) => {
          StatusCode::BAD_REQUEST
        }
        CoreError::CorruptRecord(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CoreError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      },
    }
  }

  fn kind(&self) -> &'static str {
    match self {
      ApiError::NotFound(_) => "not_found",
      ApiError::Domain(e) => e.kind(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    } else {
      tracing::warn!(error = %self, "request rejected");
    }
    let body = json!({ "error": self.to_string(), "kind": self.kind() });
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn corrupt_rows_are_server_errors() {
    let err = ApiError::from(CoreError::CorruptRecord("posts.created_at".into()));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.kind(), "corrupt_record");
  }

  #[test]
  fn self_follow_is_unprocessable() {
    let err = ApiError::from(CoreError::SelfFollow(plaza_core::UserId(1)));
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }
}
