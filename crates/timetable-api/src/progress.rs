//! Handlers for `/slots/:id/taught`.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde_json::{Value, json};
use timetable_core::store::SlotStore;
use timetable_scheduler::Scheduler;

use crate::{SlotPath, error::ApiError};

/// `GET /slots/:id/taught`: `{"taught": bool}`.
pub async fn is_taught<S: SlotStore>(
  State(scheduler): State<Scheduler<S>>,
  Path(path): Path<SlotPath>,
) -> Result<Json<Value>, ApiError> {
  let (day, id) = path.split();
  let taught = scheduler.is_taught(&day, id).await?;
  Ok(Json(json!({ "taught": taught })))
}

/// `POST /slots/:id/taught`: returns 201 + the progress record.
pub async fn mark<S: SlotStore>(
  State(scheduler): State<Scheduler<S>>,
  Path(path): Path<SlotPath>,
) -> Result<impl IntoResponse, ApiError> {
  let (day, id) = path.split();
  let record = scheduler.mark_taught(&day, id).await?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `DELETE /slots/:id/taught`: `{"removed": n}`. Removing nothing is not
/// an error.
pub async fn unmark<S: SlotStore>(
  State(scheduler): State<Scheduler<S>>,
  Path(path): Path<SlotPath>,
) -> Result<Json<Value>, ApiError> {
  let (day, id) = path.split();
  let removed = scheduler.unmark_taught(&day, id).await?;
  Ok(Json(json!({ "removed": removed })))
}
