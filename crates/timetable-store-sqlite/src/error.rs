//! Error type for `timetable-store-sqlite`.

use thiserror::Error;
use timetable_core::{Rejection, store::StoreError};

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] timetable_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("invalid column value: {0}")]
  InvalidColumn(String),

  /// The write conflicts with the day's existing slots.
  #[error(transparent)]
  Rejected(#[from] Rejection),
}

impl StoreError for Error {
  fn rejection(&self) -> Option<&Rejection> {
    match self {
      Self::Rejected(r) => Some(r),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
