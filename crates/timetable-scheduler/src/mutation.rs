//! Slot mutations: create, update with neighbor cascade, delete, status.
//!
//! Every mutation ends with a renumbering pass so that period numbers stay
//! dense and ordered.

use serde::Serialize;
use timetable_core::{
  ClassDay,
  slot::{SlotId, SlotInput, SlotPatch, SlotStatus, TimetableSlot, check_range},
  store::SlotStore,
};
use tracing::{debug, warn};

use crate::{Error, Result, Scheduler};

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Which neighbor of an edited slot a cascade step targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
  Previous,
  Next,
}

/// A step that failed without failing the operation it belonged to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
  /// A neighbor's boundary could not be moved to meet the edited slot; the
  /// gap or overlap between them is left as it was.
  AdjacentAdjustmentFailure {
    neighbor: SlotId,
    side:     Side,
    message:  String,
  },

  /// The day could not be re-read after the edit, so no neighbor was
  /// adjusted.
  NeighborLookupFailure { message: String },
}

/// The result of a mutation plus anything that went wrong on the side.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
  pub value:    T,
  pub warnings: Vec<Warning>,
}

impl<T> Outcome<T> {
  pub fn is_clean(&self) -> bool { self.warnings.is_empty() }
}

// ─── Operations ──────────────────────────────────────────────────────────────

impl<S: SlotStore> Scheduler<S> {
  /// Validate and insert a slot, then renumber the day.
  ///
  /// The slot is first written under the configured placeholder number and
  /// only receives its real one from the renumbering pass. If that pass
  /// fails the slot stays under the placeholder until the next mutation of
  /// the day renumbers it.
  pub async fn create_slot(&self, day: &ClassDay, input: SlotInput) -> Result<TimetableSlot> {
    input.validate()?;

    let placeholder = self.config.placeholder_period_number;
    let created = self
      .store
      .insert_slot(input.into_new_slot(day.clone(), placeholder))
      .await
      .map_err(Error::from_store)?;

    self.renumber(day).await?;

    let slot = self.fetch(day, created.slot_id).await?;
    debug!(
      %day,
      slot = %slot.slot_id,
      period_number = slot.period_number,
      slot_type = slot.kind.discriminant(),
      "created slot"
    );
    Ok(slot)
  }

  /// Apply `patch` to a slot.
  ///
  /// A status in the patch is held to the same transitions as
  /// [`update_slot_status`](Self::update_slot_status).
  ///
  /// When the start or end time moves, the immediately previous or next slot
  /// is adjusted to meet the new boundary. That adjustment is best-effort:
  /// a failure is logged and returned as a [`Warning`] rather than failing
  /// the update. The day is renumbered afterwards regardless.
  pub async fn update_slot(
    &self,
    day: &ClassDay,
    id: SlotId,
    patch: SlotPatch,
  ) -> Result<Outcome<TimetableSlot>> {
    let current = self.fetch(day, id).await?;
    if let Some(status) = patch.status
      && !current.status.can_become(status)
    {
      return Err(Error::InvalidTransition { current: current.status, requested: status });
    }

    let mut merged = current.clone();
    merged.apply(&patch);
    merged.kind.check_shape()?;
    check_range(merged.start_time, merged.end_time)?;

    let touches_times = patch.touches_times();
    let updated = self
      .store
      .update_slot(day, id, patch)
      .await
      .map_err(Error::from_store)?;

    let start_moved = updated.start_time != current.start_time;
    let end_moved   = updated.end_time != current.end_time;
    let warnings = if touches_times && (start_moved || end_moved) {
      self.adjust_neighbors(day, &updated, start_moved, end_moved).await
    } else {
      Vec::new()
    };

    self.renumber(day).await?;

    let value = self.fetch(day, id).await?;
    Ok(Outcome { value, warnings })
  }

  /// Delete a slot and renumber the rest. Neighbor times are left alone, so
  /// a gap remains where the slot was.
  pub async fn delete_slot(&self, day: &ClassDay, id: SlotId) -> Result<()> {
    self.store.delete_slot(day, id).await.map_err(Error::from_store)?;
    self.renumber(day).await?;
    debug!(%day, slot = %id, "deleted slot");
    Ok(())
  }

  /// Move a slot to `status`.
  ///
  /// Allowed: `planned → done`, `planned → cancelled`, `done → planned`, and
  /// staying put. Anything else, including every move out of `cancelled`,
  /// fails with [`Error::InvalidTransition`].
  pub async fn update_slot_status(
    &self,
    day: &ClassDay,
    id: SlotId,
    status: SlotStatus,
  ) -> Result<TimetableSlot> {
    let current = self.fetch(day, id).await?;
    if !current.status.can_become(status) {
      return Err(Error::InvalidTransition { current: current.status, requested: status });
    }
    if current.status == status {
      return Ok(current);
    }

    self
      .store
      .update_slot(day, id, SlotPatch::status(status))
      .await
      .map_err(Error::from_store)
  }

  // ── Cascade ─────────────────────────────────────────────────────────────

  /// Pull the immediate neighbors of `edited` onto its new boundaries. Does
  /// not propagate any further than one slot on each side. Never fails:
  /// every problem comes back as a [`Warning`].
  async fn adjust_neighbors(
    &self,
    day: &ClassDay,
    edited: &TimetableSlot,
    start_moved: bool,
    end_moved: bool,
  ) -> Vec<Warning> {
    let slots = match self.store.list_slots(day).await {
      Ok(slots) => slots,
      Err(e) => return vec![lookup_failed(edited, &Error::from_store(e))],
    };
    let Some(pos) = slots.iter().position(|s| s.slot_id == edited.slot_id) else {
      return Vec::new();
    };

    let mut warnings = Vec::new();

    if end_moved
      && let Some(next) = slots.get(pos + 1)
      && next.start_time != edited.end_time
    {
      let patch = SlotPatch::start_time(edited.end_time);
      if let Err(e) = self.adjust_neighbor(day, next, patch).await {
        warnings.push(neighbor_failed(edited, next, Side::Next, &e));
      }
    }

    if start_moved
      && let Some(prev) = pos.checked_sub(1).and_then(|i| slots.get(i))
      && prev.end_time != edited.start_time
    {
      let patch = SlotPatch::end_time(edited.start_time);
      if let Err(e) = self.adjust_neighbor(day, prev, patch).await {
        warnings.push(neighbor_failed(edited, prev, Side::Previous, &e));
      }
    }

    warnings
  }

  async fn adjust_neighbor(
    &self,
    day: &ClassDay,
    neighbor: &TimetableSlot,
    patch: SlotPatch,
  ) -> Result<TimetableSlot> {
    self
      .store
      .update_slot(day, neighbor.slot_id, patch)
      .await
      .map_err(Error::from_store)
  }
}

fn neighbor_failed(
  edited: &TimetableSlot,
  neighbor: &TimetableSlot,
  side: Side,
  err: &Error,
) -> Warning {
  warn!(
    slot = %edited.slot_id,
    neighbor = %neighbor.slot_id,
    ?side,
    error = %err,
    "adjacent slot adjustment failed; keeping the update"
  );
  Warning::AdjacentAdjustmentFailure {
    neighbor: neighbor.slot_id,
    side,
    message: err.to_string(),
  }
}

fn lookup_failed(edited: &TimetableSlot, err: &Error) -> Warning {
  warn!(
    slot = %edited.slot_id,
    error = %err,
    "could not list the day for the neighbor cascade; keeping the update"
  );
  Warning::NeighborLookupFailure { message: err.to_string() }
}
