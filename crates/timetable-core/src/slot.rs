//! Timetable slots: the rows that make up one class's school day.
//!
//! A slot is either a teaching period or a break. The two variants carry only
//! the fields that make sense for them; the flat `slot_type` column with its
//! nullable companions exists only at the storage boundary.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ClassDay, Error, ValidationError, time::clock};

pub type SlotId = Uuid;

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Curriculum assignment of a teaching period.
///
/// Subject and teacher are optional here because generated days start out as
/// empty scaffolding; [`SlotInput::validate`] insists on them for slots
/// created by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDetails {
  pub subject_id:          Option<Uuid>,
  pub teacher_id:          Option<Uuid>,
  pub syllabus_chapter_id: Option<Uuid>,
  /// Must belong to the chapter's subject; only checked for presence of the
  /// chapter here.
  pub syllabus_topic_id:   Option<Uuid>,
  /// Free-text lesson note.
  pub plan_text:           Option<String>,
}

/// What a slot is used for. Serialised with a `slot_type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "slot_type", rename_all = "snake_case")]
pub enum SlotKind {
  Period(PeriodDetails),
  Break { name: String },
}

impl SlotKind {
  /// The discriminant stored in the `slot_type` column.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Period(_) => "period",
      Self::Break { .. } => "break",
    }
  }

  pub fn is_period(&self) -> bool { matches!(self, Self::Period(_)) }

  pub fn period(&self) -> Option<&PeriodDetails> {
    match self {
      Self::Period(p) => Some(p),
      Self::Break { .. } => None,
    }
  }

  /// An unassigned period, as emitted by the day generator.
  pub fn empty_period() -> Self { Self::Period(PeriodDetails::default()) }

  /// Checks that hold for every stored slot, scaffolding included.
  pub fn check_shape(&self) -> Result<(), ValidationError> {
    match self {
      Self::Break { name } if name.trim().is_empty() => {
        Err(ValidationError::MissingBreakName)
      }
      Self::Period(p)
        if p.syllabus_topic_id.is_some() && p.syllabus_chapter_id.is_none() =>
      {
        Err(ValidationError::TopicWithoutChapter)
      }
      _ => Ok(()),
    }
  }

  /// [`check_shape`](Self::check_shape) plus the subject and teacher a
  /// hand-made period requires.
  pub fn check_assigned(&self) -> Result<(), ValidationError> {
    self.check_shape()?;
    if let Self::Period(p) = self {
      if p.subject_id.is_none() {
        return Err(ValidationError::MissingSubject);
      }
      if p.teacher_id.is_none() {
        return Err(ValidationError::MissingTeacher);
      }
    }
    Ok(())
  }
}

pub fn check_range(start: NaiveTime, end: NaiveTime) -> Result<(), ValidationError> {
  if start < end {
    Ok(())
  } else {
    Err(ValidationError::EmptyRange { start, end })
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
  #[default]
  Planned,
  Done,
  Cancelled,
}

impl SlotStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Planned => "planned",
      Self::Done => "done",
      Self::Cancelled => "cancelled",
    }
  }

  /// The transitions the scheduler performs. Staying put is always allowed;
  /// nothing leaves `cancelled`.
  pub fn can_become(self, next: SlotStatus) -> bool {
    use SlotStatus::*;
    self == next
      || matches!(
        (self, next),
        (Planned, Done) | (Planned, Cancelled) | (Done, Planned)
      )
  }
}

impl fmt::Display for SlotStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for SlotStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "planned" => Ok(Self::Planned),
      "done" => Ok(Self::Done),
      "cancelled" => Ok(Self::Cancelled),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

// ─── Slot ────────────────────────────────────────────────────────────────────

/// One persisted slot of a class's day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableSlot {
  pub slot_id:           SlotId,
  pub school_code:       String,
  pub class_instance_id: Uuid,
  pub class_date:        NaiveDate,
  /// Dense `1..=N` within the day, in start-time order. Assigned only by
  /// the renumbering pass.
  pub period_number:     u32,
  #[serde(flatten)]
  pub kind:              SlotKind,
  #[serde(with = "clock")]
  pub start_time:        NaiveTime,
  #[serde(with = "clock")]
  pub end_time:          NaiveTime,
  pub status:            SlotStatus,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl TimetableSlot {
  pub fn day(&self) -> ClassDay {
    ClassDay::new(self.school_code.clone(), self.class_instance_id, self.class_date)
  }

  /// Overlay `patch` onto this slot in memory. Does not touch
  /// `updated_at`; the store owns that.
  pub fn apply(&mut self, patch: &SlotPatch) {
    if let Some(start) = patch.start_time {
      self.start_time = start;
    }
    if let Some(end) = patch.end_time {
      self.end_time = end;
    }
    if let Some(kind) = &patch.kind {
      self.kind = kind.clone();
    }
    if let Some(status) = patch.status {
      self.status = status;
    }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Caller input to `create_slot`: everything except the id and the period
/// number, which the store and the renumbering pass own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotInput {
  #[serde(flatten)]
  pub kind:       SlotKind,
  #[serde(with = "clock")]
  pub start_time: NaiveTime,
  #[serde(with = "clock")]
  pub end_time:   NaiveTime,
  #[serde(default)]
  pub status:     SlotStatus,
}

impl SlotInput {
  pub fn new(kind: SlotKind, start_time: NaiveTime, end_time: NaiveTime) -> Self {
    Self { kind, start_time, end_time, status: SlotStatus::default() }
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    self.kind.check_assigned()?;
    check_range(self.start_time, self.end_time)
  }

  pub fn into_new_slot(self, day: ClassDay, period_number: u32) -> NewSlot {
    NewSlot {
      day,
      period_number,
      kind: self.kind,
      start_time: self.start_time,
      end_time: self.end_time,
      status: self.status,
    }
  }
}

/// Input to [`crate::store::SlotStore::insert_slot`]. `slot_id` and the
/// timestamps are set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSlot {
  pub day:           ClassDay,
  pub period_number: u32,
  pub kind:          SlotKind,
  pub start_time:    NaiveTime,
  pub end_time:      NaiveTime,
  pub status:        SlotStatus,
}

/// A partial update. `None` leaves the field unchanged; `kind` replaces the
/// whole variant payload when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPatch {
  #[serde(default, with = "clock::option", skip_serializing_if = "Option::is_none")]
  pub start_time: Option<NaiveTime>,
  #[serde(default, with = "clock::option", skip_serializing_if = "Option::is_none")]
  pub end_time:   Option<NaiveTime>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub kind:       Option<SlotKind>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:     Option<SlotStatus>,
}

impl SlotPatch {
  pub fn start_time(start: NaiveTime) -> Self {
    Self { start_time: Some(start), ..Self::default() }
  }

  pub fn end_time(end: NaiveTime) -> Self {
    Self { end_time: Some(end), ..Self::default() }
  }

  pub fn status(status: SlotStatus) -> Self {
    Self { status: Some(status), ..Self::default() }
  }

  pub fn touches_times(&self) -> bool {
    self.start_time.is_some() || self.end_time.is_some()
  }
}
