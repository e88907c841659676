//! Progress records: "this was taught" facts in the syllabus ledger.
//!
//! A record is written when a period is marked taught. It is decoupled from
//! the slot's lifetime: deleting or regenerating the day leaves history in
//! place.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  ClassDay, ValidationError,
  slot::{SlotId, TimetableSlot},
};

/// The content tuple a record describes, minus the partition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressKey {
  pub subject_id:          Uuid,
  pub teacher_id:          Uuid,
  pub syllabus_chapter_id: Option<Uuid>,
  pub syllabus_topic_id:   Option<Uuid>,
}

impl ProgressKey {
  /// The key of a slot's *current* content. Only assigned periods have one.
  pub fn of_slot(slot: &TimetableSlot) -> Result<Self, ValidationError> {
    let period = slot.kind.period().ok_or(ValidationError::NotAPeriod)?;
    Ok(Self {
      subject_id:          period.subject_id.ok_or(ValidationError::MissingSubject)?,
      teacher_id:          period.teacher_id.ok_or(ValidationError::MissingTeacher)?,
      syllabus_chapter_id: period.syllabus_chapter_id,
      syllabus_topic_id:   period.syllabus_topic_id,
    })
  }
}

/// A persisted progress record. Never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
  pub progress_id:       Uuid,
  pub school_code:       String,
  pub class_instance_id: Uuid,
  pub date:              NaiveDate,
  #[serde(flatten)]
  pub key:               ProgressKey,
  /// The slot the record was created from. The slot may since have been
  /// edited or deleted.
  pub timetable_slot_id: Option<SlotId>,
  pub recorded_at:       DateTime<Utc>,
}

/// Input to [`crate::store::SlotStore::insert_progress_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProgressRecord {
  pub day:               ClassDay,
  pub key:               ProgressKey,
  pub timetable_slot_id: Option<SlotId>,
}

impl NewProgressRecord {
  pub fn for_slot(slot: &TimetableSlot) -> Result<Self, ValidationError> {
    Ok(Self {
      day:               slot.day(),
      key:               ProgressKey::of_slot(slot)?,
      timetable_slot_id: Some(slot.slot_id),
    })
  }
}

/// Which records a delete targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressMatch {
  /// Every record created from this slot.
  Slot(SlotId),
  /// Every record whose content tuple equals this key, regardless of slot.
  Content(ProgressKey),
}

/// How the scheduler finds the records to remove on unmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressKeying {
  /// Match on the stored slot id. Survives edits to the slot.
  #[default]
  Slot,
  /// Match on the slot's current content. Records created before an edit
  /// to subject, teacher, chapter or topic are left behind.
  Content,
}
