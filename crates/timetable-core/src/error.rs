//! Error types for `timetable-core`.

use chrono::NaiveTime;
use thiserror::Error;
use uuid::Uuid;

use crate::time::TimeRange;

/// Decoding failures for values that cross a text boundary.
#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown slot type discriminant: {0:?}")]
  UnknownSlotType(String),

  #[error("unknown slot status: {0:?}")]
  UnknownStatus(String),

  #[error("invalid time of day {0:?}; expected HH:MM or HH:MM:SS")]
  InvalidTime(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Input that can never be persisted, detected before any store call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("a period needs a subject")]
  MissingSubject,

  #[error("a period needs a teacher")]
  MissingTeacher,

  #[error("a break needs a name")]
  MissingBreakName,

  #[error("a syllabus topic was given without its chapter")]
  TopicWithoutChapter,

  #[error("start time {start} must be before end time {end}")]
  EmptyRange { start: NaiveTime, end: NaiveTime },

  #[error("a generated day needs at least one period")]
  NoPeriods,

  #[error("durations must be at least one minute")]
  ZeroDuration,

  #[error("break placed after period {after_period} but the day has {num_periods} periods")]
  BreakOutOfRange { after_period: u32, num_periods: u32 },

  #[error("the generated day runs past midnight")]
  DayOverflow,

  #[error("only periods can be marked as taught")]
  NotAPeriod,
}

/// A write the store refused on domain grounds, as opposed to an
/// infrastructure failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
  #[error("time range {requested} overlaps existing slot {existing}")]
  Overlap {
    requested: TimeRange,
    existing:  TimeRange,
  },

  #[error("period number {0} is already taken")]
  DuplicatePeriodNumber(u32),

  #[error("start time {start} must be before end time {end}")]
  InvalidRange { start: NaiveTime, end: NaiveTime },

  #[error("slot not found: {0}")]
  SlotNotFound(Uuid),
}
