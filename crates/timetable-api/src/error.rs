//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use timetable_scheduler::Error as SchedulerError;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// Anything the caller cannot fix. Logged, never echoed back.
  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<SchedulerError> for ApiError {
  fn from(err: SchedulerError) -> Self {
    match err {
      SchedulerError::Validation(e) => Self::BadRequest(e.to_string()),
      SchedulerError::SlotNotFound(id) => Self::NotFound(format!("slot {id} not found")),
      e @ (SchedulerError::OverlapConflict { .. }
      | SchedulerError::PeriodNumberConflict(_)
      | SchedulerError::InvalidTransition { .. }) => Self::Conflict(e.to_string()),
      e @ (SchedulerError::PartialGeneration { .. } | SchedulerError::Store(_)) => {
        Self::Internal(Box::new(e))
      }
    }
  }
}

/// `"outer: inner: innermost"` for logging.
fn chain(err: &(dyn std::error::Error + 'static)) -> String {
  let mut out = err.to_string();
  let mut next = err.source();
  while let Some(e) = next {
    out.push_str(": ");
    out.push_str(&e.to_string());
    next = e.source();
  }
  out
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Internal(e) => {
        error!(error = %chain(e.as_ref()), "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
