//! The daily timetable slot scheduler.
//!
//! [`Scheduler`] wraps any [`SlotStore`] and keeps each class day consistent:
//! period numbers stay dense and follow start-time order, time edits pull the
//! adjacent slot along, whole days can be generated from a compact spec, and
//! periods can be marked taught in the syllabus progress ledger.
//!
//! Operations are grouped by concern:
//!
//! | Module | Operations |
//! |--------|------------|
//! | [`invariant`] | `renumber` |
//! | [`mutation`] | `create_slot`, `update_slot`, `delete_slot`, `update_slot_status` |
//! | [`generator`] | `quick_generate` |
//! | [`ledger`] | `mark_taught`, `unmark_taught`, `is_taught` |
//!
//! Every call is a sequence of independent store round trips. Nothing is
//! wrapped in a transaction across steps; see [`Error::PartialGeneration`].

pub mod error;
pub mod generator;
pub mod invariant;
pub mod ledger;
pub mod mutation;

use std::{collections::HashSet, sync::Arc};

use serde::{Deserialize, Serialize};
use timetable_core::{
  ClassDay,
  progress::ProgressKeying,
  slot::{SlotId, TimetableSlot},
  store::SlotStore,
};

pub use error::{Error, Result};
pub use generator::{BreakSpec, DaySpec};
pub use mutation::{Outcome, Side, Warning};

/// Period number written by `create_slot` before the renumbering pass
/// assigns the real one. Larger than any plausible number of slots in a day.
pub const PLACEHOLDER_PERIOD_NUMBER: u32 = 9999;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Tunables, usually read from the `[scheduler]` table of the server config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
  /// How `unmark_taught` finds the records to remove.
  pub progress_keying:           ProgressKeying,
  pub placeholder_period_number: u32,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self {
      progress_keying:           ProgressKeying::default(),
      placeholder_period_number: PLACEHOLDER_PERIOD_NUMBER,
    }
  }
}

// ─── Read model ───────────────────────────────────────────────────────────────

/// Everything a caller needs to render one class day.
#[derive(Debug, Clone, Serialize)]
pub struct DayView {
  pub day:    ClassDay,
  /// Ordered by start time; `period_number` is `1..=slots.len()`.
  pub slots:  Vec<TimetableSlot>,
  /// Ids of the slots that have a progress record.
  pub taught: HashSet<SlotId>,
}

// ─── Scheduler ────────────────────────────────────────────────────────────────

/// Scheduling operations over a [`SlotStore`].
///
/// Cheap to clone; the store is shared behind an [`Arc`].
pub struct Scheduler<S> {
  store:  Arc<S>,
  config: SchedulerConfig,
}

impl<S> Clone for Scheduler<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), config: self.config.clone() }
  }
}

impl<S: SlotStore> Scheduler<S> {
  pub fn new(store: Arc<S>) -> Self { Self::with_config(store, SchedulerConfig::default()) }

  pub fn with_config(store: Arc<S>, config: SchedulerConfig) -> Self { Self { store, config } }

  pub fn store(&self) -> &S { &self.store }

  pub fn config(&self) -> &SchedulerConfig { &self.config }

  /// The day's ordered slots together with the taught-slot set.
  pub async fn day(&self, day: &ClassDay) -> Result<DayView> {
    let slots = self.store.list_slots(day).await.map_err(Error::from_store)?;
    let taught = self
      .store
      .list_progress_slot_ids(day)
      .await
      .map_err(Error::from_store)?;
    Ok(DayView { day: day.clone(), slots, taught })
  }

  /// Load a slot or fail with [`Error::SlotNotFound`].
  pub(crate) async fn fetch(&self, day: &ClassDay, id: SlotId) -> Result<TimetableSlot> {
    self
      .store
      .get_slot(day, id)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::SlotNotFound(id))
  }
}
