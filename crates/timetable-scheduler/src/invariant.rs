//! Renumbering: the single source of slot ordering.
//!
//! Overlap is not checked here: the store rejects overlapping writes
//! atomically and the rejection surfaces as [`Error::OverlapConflict`].
//!
//! [`Error::OverlapConflict`]: crate::Error::OverlapConflict

use timetable_core::{
  ClassDay,
  slot::{SlotId, TimetableSlot},
  store::SlotStore,
};
use tracing::debug;

use crate::{Error, Result, Scheduler};

/// The number changes that make `slots` dense in start-time order.
///
/// Ties on start time keep their current relative numbering. Only slots
/// whose number actually changes are returned.
pub fn plan_renumber(slots: &[TimetableSlot]) -> Vec<(SlotId, u32)> {
  let mut ordered: Vec<&TimetableSlot> = slots.iter().collect();
  ordered.sort_by_key(|s| (s.start_time, s.period_number));

  ordered
    .into_iter()
    .zip(1u32..)
    .filter(|(slot, number)| slot.period_number != *number)
    .map(|(slot, number)| (slot.slot_id, number))
    .collect()
}

impl<S: SlotStore> Scheduler<S> {
  /// Rewrite the day's period numbers to `1..=N` in start-time order.
  ///
  /// Returns how many slots were renumbered; zero for an empty or already
  /// dense day, in which case nothing is written.
  pub async fn renumber(&self, day: &ClassDay) -> Result<usize> {
    let slots   = self.store.list_slots(day).await.map_err(Error::from_store)?;
    let changes = plan_renumber(&slots);
    if changes.is_empty() {
      return Ok(0);
    }

    let changed = changes.len();
    self
      .store
      .assign_period_numbers(day, changes)
      .await
      .map_err(Error::from_store)?;

    debug!(%day, changed, total = slots.len(), "renumbered slots");
    Ok(changed)
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, NaiveTime, Utc};
  use timetable_core::slot::{SlotKind, SlotStatus};
  use uuid::Uuid;

  use super::*;

  fn slot(number: u32, start: &str, end: &str) -> TimetableSlot {
    TimetableSlot {
      slot_id:           Uuid::new_v4(),
      school_code:       "SCH01".into(),
      class_instance_id: Uuid::nil(),
      class_date:        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
      period_number:     number,
      kind:              SlotKind::empty_period(),
      start_time:        NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
      end_time:          NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
      status:            SlotStatus::Planned,
      created_at:        Utc::now(),
      updated_at:        Utc::now(),
    }
  }

  #[test]
  fn dense_day_needs_no_changes() {
    let slots = vec![slot(1, "08:00", "08:45"), slot(2, "08:45", "09:30")];
    assert!(plan_renumber(&slots).is_empty());
    assert!(plan_renumber(&[]).is_empty());
  }

  #[test]
  fn placeholder_slot_is_pulled_into_place() {
    let early = slot(9999, "07:15", "08:00");
    let slots = vec![slot(1, "08:00", "08:45"), slot(2, "08:45", "09:30"), early.clone()];

    let plan = plan_renumber(&slots);
    assert_eq!(
      plan,
      vec![(early.slot_id, 1), (slots[0].slot_id, 2), (slots[1].slot_id, 3)]
    );
  }

  #[test]
  fn gap_after_delete_is_closed() {
    let slots = vec![slot(1, "08:00", "08:45"), slot(3, "09:30", "10:15")];
    assert_eq!(plan_renumber(&slots), vec![(slots[1].slot_id, 2)]);
  }

  #[test]
  fn order_follows_start_time_not_current_numbers() {
    let slots = vec![slot(1, "10:00", "10:45"), slot(2, "08:00", "08:45")];
    assert_eq!(
      plan_renumber(&slots),
      vec![(slots[1].slot_id, 1), (slots[0].slot_id, 2)]
    );
  }
}
