//! JSON REST API for the timetable scheduler.
//!
//! Exposes an axum [`Router`] backed by a [`Scheduler`] over any
//! [`SlotStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! Every route is scoped to one class day:
//!
//! ```text
//! /schools/{school}/classes/{class}/days/{date}/...
//! ```
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", timetable_api::api_router(scheduler.clone()))
//! ```

pub mod days;
pub mod error;
pub mod progress;
pub mod slots;

use axum::{
  Router,
  routing::{get, patch, post, put},
};
use chrono::NaiveDate;
use serde::Deserialize;
use timetable_core::{ClassDay, slot::SlotId, store::SlotStore};
use timetable_scheduler::Scheduler;
use uuid::Uuid;

pub use error::ApiError;

const DAY: &str = "/schools/{school}/classes/{class}/days/{date}";

// ─── Path parameters ──────────────────────────────────────────────────────────

/// The class-day prefix shared by every route.
#[derive(Debug, Deserialize)]
pub struct DayPath {
  pub school: String,
  pub class:  Uuid,
  pub date:   NaiveDate,
}

impl From<DayPath> for ClassDay {
  fn from(p: DayPath) -> Self { ClassDay::new(p.school, p.class, p.date) }
}

/// [`DayPath`] plus a slot id.
#[derive(Debug, Deserialize)]
pub struct SlotPath {
  pub school: String,
  pub class:  Uuid,
  pub date:   NaiveDate,
  pub id:     SlotId,
}

impl SlotPath {
  pub fn split(self) -> (ClassDay, SlotId) {
    (ClassDay::new(self.school, self.class, self.date), self.id)
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `scheduler`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(scheduler: Scheduler<S>) -> Router<()>
where
  S: SlotStore + 'static,
{
  Router::new()
    .route(DAY, get(days::view::<S>))
    .route(&format!("{DAY}/generate"), post(days::generate::<S>))
    .route(&format!("{DAY}/renumber"), post(days::renumber::<S>))
    // Slots
    .route(&format!("{DAY}/slots"), post(slots::create::<S>))
    .route(
      &format!("{DAY}/slots/{{id}}"),
      patch(slots::update::<S>).delete(slots::delete::<S>),
    )
    .route(&format!("{DAY}/slots/{{id}}/status"), put(slots::set_status::<S>))
    // Progress
    .route(
      &format!("{DAY}/slots/{{id}}/taught"),
      get(progress::is_taught::<S>)
        .post(progress::mark::<S>)
        .delete(progress::unmark::<S>),
    )
    .with_state(scheduler)
}

#[cfg(test)]
mod tests;
