//! Handlers for `/slots` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/slots` | Body: [`SlotInput`]; returns 201 + stored slot |
//! | `PATCH`  | `/slots/:id` | Body: [`SlotPatch`]; returns `{"value": slot, "warnings": [...]}` |
//! | `DELETE` | `/slots/:id` | Returns 204 |
//! | `PUT`    | `/slots/:id/status` | Body: `{"status":"done"}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use timetable_core::{
  ClassDay,
  slot::{SlotInput, SlotPatch, SlotStatus, TimetableSlot},
  store::SlotStore,
};
use timetable_scheduler::{Outcome, Scheduler};

use crate::{DayPath, SlotPath, error::ApiError};

/// `POST /slots`: returns 201 + the stored [`TimetableSlot`].
pub async fn create<S: SlotStore>(
  State(scheduler): State<Scheduler<S>>,
  Path(path): Path<DayPath>,
  Json(input): Json<SlotInput>,
) -> Result<impl IntoResponse, ApiError> {
  let slot = scheduler.create_slot(&ClassDay::from(path), input).await?;
  Ok((StatusCode::CREATED, Json(slot)))
}

/// `PATCH /slots/:id`
///
/// Neighbor adjustments that could not be made come back in `warnings`
/// with a 200; the edit itself was applied.
pub async fn update<S: SlotStore>(
  State(scheduler): State<Scheduler<S>>,
  Path(path): Path<SlotPath>,
  Json(patch): Json<SlotPatch>,
) -> Result<Json<Outcome<TimetableSlot>>, ApiError> {
  let (day, id) = path.split();
  let outcome = scheduler.update_slot(&day, id, patch).await?;
  Ok(Json(outcome))
}

/// `DELETE /slots/:id`
pub async fn delete<S: SlotStore>(
  State(scheduler): State<Scheduler<S>>,
  Path(path): Path<SlotPath>,
) -> Result<StatusCode, ApiError> {
  let (day, id) = path.split();
  scheduler.delete_slot(&day, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: SlotStatus,
}

/// `PUT /slots/:id/status`
pub async fn set_status<S: SlotStore>(
  State(scheduler): State<Scheduler<S>>,
  Path(path): Path<SlotPath>,
  Json(body): Json<StatusBody>,
) -> Result<Json<TimetableSlot>, ApiError> {
  let (day, id) = path.split();
  let slot = scheduler.update_slot_status(&day, id, body.status).await?;
  Ok(Json(slot))
}
