//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("invalid request body: {}", .0.body_text())]
  InvalidBody(#[from] JsonRejection),

  #[error("invalid query string: {}", .0.body_text())]
  InvalidQuery(#[from] QueryRejection),

  #[error(transparent)]
  Core(#[from] kindred_core::Error),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match &self {
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m, "kind": "not_found" })))
          .into_response()
      }
      ApiError::InvalidBody(rejection) => {
        (rejection.status(), Json(json!({ "error": self.to_string(), "kind": "invalid_body" })))
          .into_response()
      }
      ApiError::InvalidQuery(rejection) => {
        (rejection.status(), Json(json!({ "error": self.to_string(), "kind": "invalid_query" })))
          .into_response()
      }
      ApiError::Core(e) => match e.field_errors() {
        Some(fields) => (
          StatusCode::UNPROCESSABLE_ENTITY,
          Json(json!({ "error": e.to_string(), "kind": e.kind(), "fields": fields })),
        )
          .into_response(),
        None => {
          tracing::error!(kind = e.kind(), error = %e, "request failed");
          (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string(), "kind": e.kind() })),
          )
            .into_response()
        }
      },
    }
  }
}
