//! Handlers for whole-day endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Ordered slots plus the ids of taught slots |
//! | `POST` | `/generate` | Body: [`GenerateBody`]; replaces the day, returns 201 |
//! | `POST` | `/renumber` | Returns `{"renumbered": n}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use timetable_core::{ClassDay, store::SlotStore};
use timetable_scheduler::{DayView, DaySpec, Scheduler};

use crate::{DayPath, error::ApiError};

/// `GET /`
pub async fn view<S: SlotStore>(
  State(scheduler): State<Scheduler<S>>,
  Path(path): Path<DayPath>,
) -> Result<Json<DayView>, ApiError> {
  let view = scheduler.day(&ClassDay::from(path)).await?;
  Ok(Json(view))
}

// ─── Generate ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
  #[serde(flatten)]
  pub spec:    DaySpec,
  /// Must be `true`. Generation deletes every existing slot of the day,
  /// including ones already marked done.
  #[serde(default)]
  pub confirm: bool,
}

/// `POST /generate`: returns 201 + the generated slots.
pub async fn generate<S: SlotStore>(
  State(scheduler): State<Scheduler<S>>,
  Path(path): Path<DayPath>,
  Json(body): Json<GenerateBody>,
) -> Result<impl IntoResponse, ApiError> {
  if !body.confirm {
    return Err(ApiError::BadRequest(
      "generation replaces every slot of the day; resend with \"confirm\": true".into(),
    ));
  }

  let slots = scheduler
    .quick_generate(&ClassDay::from(path), &body.spec)
    .await?;
  Ok((StatusCode::CREATED, Json(slots)))
}

/// `POST /renumber`
pub async fn renumber<S: SlotStore>(
  State(scheduler): State<Scheduler<S>>,
  Path(path): Path<DayPath>,
) -> Result<Json<Value>, ApiError> {
  let renumbered = scheduler.renumber(&ClassDay::from(path)).await?;
  Ok(Json(json!({ "renumbered": renumbered })))
}
