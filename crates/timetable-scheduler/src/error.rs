//! Error type for `timetable-scheduler`.

use std::fmt;

use thiserror::Error;
use timetable_core::{
  Rejection, TimeRange, ValidationError,
  slot::{SlotId, SlotStatus},
  store::StoreError,
};

/// Where a [`Error::PartialGeneration`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
  /// Nothing was removed yet, or only some of the old slots were.
  ClearingDay,
  /// The old slots are gone; some or none of the new ones were written.
  InsertingSlots,
  /// All new slots were written; numbering may not be dense.
  Renumbering,
}

impl fmt::Display for GenerationStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::ClearingDay => "clearing the day",
      Self::InsertingSlots => "inserting generated slots",
      Self::Renumbering => "renumbering",
    })
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  Validation(#[from] ValidationError),

  #[error("time range {requested} overlaps existing slot {existing}")]
  OverlapConflict {
    requested: TimeRange,
    existing:  TimeRange,
  },

  #[error("period number {0} is already taken")]
  PeriodNumberConflict(u32),

  #[error("slot not found: {0}")]
  SlotNotFound(SlotId),

  #[error("cannot change status from {current} to {requested}")]
  InvalidTransition {
    current:   SlotStatus,
    requested: SlotStatus,
  },

  /// A multi-step generation stopped partway. Earlier steps are not rolled
  /// back; the day may be empty or partially populated until the caller
  /// retries.
  #[error("day generation failed while {stage}")]
  PartialGeneration {
    stage:  GenerationStage,
    #[source]
    source: Box<Error>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Lift a backend error, keeping domain rejections typed.
  pub fn from_store<E: StoreError>(err: E) -> Self {
    match err.rejection() {
      Some(Rejection::Overlap { requested, existing }) => {
        Self::OverlapConflict { requested: *requested, existing: *existing }
      }
      Some(Rejection::DuplicatePeriodNumber(n)) => Self::PeriodNumberConflict(*n),
      Some(Rejection::InvalidRange { start, end }) => {
        Self::Validation(ValidationError::EmptyRange { start: *start, end: *end })
      }
      Some(Rejection::SlotNotFound(id)) => Self::SlotNotFound(*id),
      None => Self::Store(Box::new(err)),
    }
  }

  pub(crate) fn partial(stage: GenerationStage, source: Error) -> Self {
    Self::PartialGeneration { stage, source: Box::new(source) }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
