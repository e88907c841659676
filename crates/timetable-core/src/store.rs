//! The `SlotStore` trait: the persistence contract the scheduler consumes.
//!
//! The trait is implemented by storage backends (e.g.
//! `timetable-store-sqlite`). The scheduler depends on this abstraction, not
//! on any concrete backend.

use std::{collections::HashSet, future::Future};

use crate::{
  ClassDay, Rejection,
  progress::{NewProgressRecord, ProgressMatch, ProgressRecord},
  slot::{NewSlot, SlotId, SlotPatch, TimetableSlot},
};

/// Lets callers tell a domain refusal apart from an infrastructure failure
/// without knowing the backend's error type.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `Some` when the store refused the write on domain grounds.
  fn rejection(&self) -> Option<&Rejection>;
}

/// Abstraction over a slot store backend.
///
/// Every method is scoped by a [`ClassDay`]; a slot id from another day is
/// treated as missing.
///
/// Each individual call is atomic. In particular the overlap check and the
/// write it guards happen together, and [`assign_period_numbers`] never
/// leaves the day with a duplicate number. Sequences of calls are not.
///
/// [`assign_period_numbers`]: SlotStore::assign_period_numbers
pub trait SlotStore: Send + Sync {
  type Error: StoreError;

  // ── Slot reads ─────────────────────────────────────────────────────

  /// All slots of the day, ordered by `start_time` ascending.
  fn list_slots<'a>(
    &'a self,
    day: &'a ClassDay,
  ) -> impl Future<Output = Result<Vec<TimetableSlot>, Self::Error>> + Send + 'a;

  /// A single slot. Returns `None` if it does not exist within `day`.
  fn get_slot<'a>(
    &'a self,
    day: &'a ClassDay,
    id: SlotId,
  ) -> impl Future<Output = Result<Option<TimetableSlot>, Self::Error>> + Send + 'a;

  // ── Slot writes ────────────────────────────────────────────────────

  /// Persist a new slot.
  ///
  /// Rejects with [`Rejection::Overlap`] if the range intersects another
  /// slot of the day and with [`Rejection::DuplicatePeriodNumber`] if the
  /// number is taken.
  fn insert_slot(
    &self,
    slot: NewSlot,
  ) -> impl Future<Output = Result<TimetableSlot, Self::Error>> + Send + '_;

  /// Persist a batch of slots. Each insert is checked like
  /// [`insert_slot`](SlotStore::insert_slot); the batch as a whole is not
  /// atomic, so a failure leaves the earlier rows in place.
  fn insert_slots(
    &self,
    slots: Vec<NewSlot>,
  ) -> impl Future<Output = Result<Vec<TimetableSlot>, Self::Error>> + Send + '_;

  /// Apply `patch` and return the updated slot.
  ///
  /// Rejects with [`Rejection::SlotNotFound`], [`Rejection::InvalidRange`]
  /// or [`Rejection::Overlap`] (the slot itself is excluded from the
  /// overlap check).
  fn update_slot<'a>(
    &'a self,
    day: &'a ClassDay,
    id: SlotId,
    patch: SlotPatch,
  ) -> impl Future<Output = Result<TimetableSlot, Self::Error>> + Send + 'a;

  /// Rewrite the period numbers of the listed slots in one step.
  fn assign_period_numbers<'a>(
    &'a self,
    day: &'a ClassDay,
    numbers: Vec<(SlotId, u32)>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove a slot. Rejects with [`Rejection::SlotNotFound`].
  fn delete_slot<'a>(
    &'a self,
    day: &'a ClassDay,
    id: SlotId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove every slot of the day. Returns how many were removed.
  fn delete_all_slots<'a>(
    &'a self,
    day: &'a ClassDay,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  // ── Progress ledger ───────────────────────────────────────────────────

  /// Append a progress record. No uniqueness check is made.
  fn insert_progress_record(
    &self,
    record: NewProgressRecord,
  ) -> impl Future<Output = Result<ProgressRecord, Self::Error>> + Send + '_;

  /// Remove the day's records selected by `matching`. Returns how many were
  /// removed.
  fn delete_progress_records<'a>(
    &'a self,
    day: &'a ClassDay,
    matching: ProgressMatch,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Ids of the day's slots that have at least one progress record.
  fn list_progress_slot_ids<'a>(
    &'a self,
    day: &'a ClassDay,
  ) -> impl Future<Output = Result<HashSet<SlotId>, Self::Error>> + Send + 'a;

  /// All of the day's progress records, oldest first.
  fn list_progress_records<'a>(
    &'a self,
    day: &'a ClassDay,
  ) -> impl Future<Output = Result<Vec<ProgressRecord>, Self::Error>> + Send + 'a;
}
