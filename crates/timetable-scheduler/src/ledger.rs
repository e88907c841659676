//! Marking periods as taught in the syllabus progress ledger.

use timetable_core::{
  ClassDay,
  progress::{NewProgressRecord, ProgressKey, ProgressKeying, ProgressMatch, ProgressRecord},
  slot::SlotId,
  store::SlotStore,
};
use tracing::debug;

use crate::{Error, Result, Scheduler};

impl<S: SlotStore> Scheduler<S> {
  /// Record that the slot's content was taught.
  ///
  /// The slot must be a period with subject and teacher assigned. Marking
  /// twice appends a second record.
  pub async fn mark_taught(&self, day: &ClassDay, id: SlotId) -> Result<ProgressRecord> {
    let slot = self.fetch(day, id).await?;
    let record = NewProgressRecord::for_slot(&slot)?;

    let created = self
      .store
      .insert_progress_record(record)
      .await
      .map_err(Error::from_store)?;
    debug!(%day, slot = %id, progress = %created.progress_id, "marked taught");
    Ok(created)
  }

  /// Remove the progress records for a slot. Returns how many went away;
  /// zero is not an error.
  ///
  /// With [`ProgressKeying::Slot`] the records are found by slot id, so
  /// this still works after the slot was edited or deleted. With
  /// [`ProgressKeying::Content`] they are found by the slot's current
  /// subject, teacher, chapter and topic, which requires the slot to exist.
  pub async fn unmark_taught(&self, day: &ClassDay, id: SlotId) -> Result<usize> {
    let matching = match self.config.progress_keying {
      ProgressKeying::Slot => ProgressMatch::Slot(id),
      ProgressKeying::Content => {
        let slot = self.fetch(day, id).await?;
        ProgressMatch::Content(ProgressKey::of_slot(&slot)?)
      }
    };

    let removed = self
      .store
      .delete_progress_records(day, matching)
      .await
      .map_err(Error::from_store)?;
    debug!(%day, slot = %id, removed, "unmarked taught");
    Ok(removed)
  }

  /// Whether any progress record references the slot.
  pub async fn is_taught(&self, day: &ClassDay, id: SlotId) -> Result<bool> {
    let taught = self
      .store
      .list_progress_slot_ids(day)
      .await
      .map_err(Error::from_store)?;
    Ok(taught.contains(&id))
  }
}
