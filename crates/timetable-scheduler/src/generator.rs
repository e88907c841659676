//! Quick generation of a whole day from a compact spec.
//!
//! Generation is destructive: the day's existing slots are removed first,
//! including any that were already marked `done`. Progress records are not
//! touched.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use timetable_core::{
  ClassDay, ValidationError,
  slot::{NewSlot, SlotKind, SlotStatus, TimetableSlot},
  store::SlotStore,
  time::clock,
};
use tracing::info;

use crate::{Error, Result, Scheduler, error::GenerationStage};

/// A break inserted after a given period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSpec {
  /// 1-based index of the period the break follows.
  pub after_period: u32,
  pub duration_min: u32,
  pub name:         String,
}

/// The shape of a generated day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySpec {
  #[serde(with = "clock")]
  pub start_time:          NaiveTime,
  pub num_periods:         u32,
  pub period_duration_min: u32,
  #[serde(default)]
  pub breaks:              Vec<BreakSpec>,
}

impl DaySpec {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.num_periods == 0 {
      return Err(ValidationError::NoPeriods);
    }
    if self.period_duration_min == 0 {
      return Err(ValidationError::ZeroDuration);
    }
    for b in &self.breaks {
      if b.duration_min == 0 {
        return Err(ValidationError::ZeroDuration);
      }
      if b.name.trim().is_empty() {
        return Err(ValidationError::MissingBreakName);
      }
      if b.after_period == 0 || b.after_period > self.num_periods {
        return Err(ValidationError::BreakOutOfRange {
          after_period: b.after_period,
          num_periods:  self.num_periods,
        });
      }
    }
    Ok(())
  }
}

fn advance(clock: NaiveTime, minutes: u32) -> Result<NaiveTime, ValidationError> {
  let (next, wrapped) = clock.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
  if wrapped != 0 {
    return Err(ValidationError::DayOverflow);
  }
  Ok(next)
}

/// Lay out the day described by `spec` without touching any store.
///
/// Periods are emitted on a running clock from `start_time`. After period
/// `i`, every break with `after_period == i` follows in the order given.
/// Numbers run `1, 2, 3, …` across periods and breaks alike. Periods come
/// out unassigned: no subject, teacher or plan.
pub fn plan_day(day: &ClassDay, spec: &DaySpec) -> Result<Vec<NewSlot>, ValidationError> {
  spec.validate()?;

  let mut slots = Vec::new();
  let mut clock = spec.start_time;
  let mut emit = |kind: SlotKind, clock: &mut NaiveTime, minutes: u32| {
    let start = *clock;
    let end = advance(start, minutes)?;
    let period_number = slots.len() as u32 + 1;
    slots.push(NewSlot {
      day: day.clone(),
      period_number,
      kind,
      start_time: start,
      end_time: end,
      status: SlotStatus::Planned,
    });
    *clock = end;
    Ok::<_, ValidationError>(())
  };

  for i in 1..=spec.num_periods {
    emit(SlotKind::empty_period(), &mut clock, spec.period_duration_min)?;
    for b in spec.breaks.iter().filter(|b| b.after_period == i) {
      emit(SlotKind::Break { name: b.name.clone() }, &mut clock, b.duration_min)?;
    }
  }

  Ok(slots)
}

impl<S: SlotStore> Scheduler<S> {
  /// Replace the whole day with the layout from [`plan_day`].
  ///
  /// Runs as three independent steps: clear the day, insert the new slots,
  /// renumber. A failure in any of them is reported as
  /// [`Error::PartialGeneration`] naming the step; nothing is rolled back.
  /// Invalid specs are rejected before anything is deleted.
  pub async fn quick_generate(
    &self,
    day: &ClassDay,
    spec: &DaySpec,
  ) -> Result<Vec<TimetableSlot>> {
    let planned = plan_day(day, spec)?;

    let cleared = self
      .store
      .delete_all_slots(day)
      .await
      .map_err(|e| Error::partial(GenerationStage::ClearingDay, Error::from_store(e)))?;
    info!(%day, cleared, "cleared day for generation");

    let inserted = self
      .store
      .insert_slots(planned)
      .await
      .map_err(|e| Error::partial(GenerationStage::InsertingSlots, Error::from_store(e)))?;

    self
      .renumber(day)
      .await
      .map_err(|e| Error::partial(GenerationStage::Renumbering, e))?;

    let slots = self.store.list_slots(day).await.map_err(Error::from_store)?;
    info!(%day, generated = inserted.len(), "generated day");
    Ok(slots)
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use uuid::Uuid;

  use super::*;

  fn t(hhmm: &str) -> NaiveTime { NaiveTime::parse_from_str(hhmm, "%H:%M").unwrap() }

  fn day() -> ClassDay {
    ClassDay::new("SCH01", Uuid::new_v4(), NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
  }

  fn spec(breaks: Vec<BreakSpec>) -> DaySpec {
    DaySpec {
      start_time: t("08:00"),
      num_periods: 3,
      period_duration_min: 45,
      breaks,
    }
  }

  fn brk(after_period: u32, duration_min: u32, name: &str) -> BreakSpec {
    BreakSpec { after_period, duration_min, name: name.into() }
  }

  #[test]
  fn three_periods_with_a_break_after_the_second() {
    let slots = plan_day(&day(), &spec(vec![brk(2, 15, "Break")])).unwrap();

    let layout: Vec<_> = slots
      .iter()
      .map(|s| (s.period_number, s.kind.discriminant(), s.start_time, s.end_time))
      .collect();
    assert_eq!(
      layout,
      vec![
        (1, "period", t("08:00"), t("08:45")),
        (2, "period", t("08:45"), t("09:30")),
        (3, "break", t("09:30"), t("09:45")),
        (4, "period", t("09:45"), t("10:30")),
      ]
    );
    assert_eq!(slots[2].kind, SlotKind::Break { name: "Break".into() });
    assert!(slots.iter().filter(|s| s.kind.is_period()).all(|s| s.kind == SlotKind::empty_period()));
  }

  #[test]
  fn breaks_sharing_a_period_keep_configured_order() {
    let slots = plan_day(
      &day(),
      &spec(vec![brk(1, 5, "Stretch"), brk(1, 10, "Snack"), brk(3, 30, "Lunch")]),
    )
    .unwrap();

    let names: Vec<_> = slots
      .iter()
      .filter_map(|s| match &s.kind {
        SlotKind::Break { name } => Some(name.as_str()),
        SlotKind::Period(_) => None,
      })
      .collect();
    assert_eq!(names, vec!["Stretch", "Snack", "Lunch"]);
    assert_eq!(slots.last().unwrap().end_time, t("11:00"));
  }

  #[test]
  fn rejects_break_after_missing_period() {
    let err = plan_day(&day(), &spec(vec![brk(4, 10, "Late")])).unwrap_err();
    assert_eq!(err, ValidationError::BreakOutOfRange { after_period: 4, num_periods: 3 });
  }

  #[test]
  fn rejects_degenerate_specs() {
    let mut s = spec(vec![]);
    s.num_periods = 0;
    assert_eq!(plan_day(&day(), &s).unwrap_err(), ValidationError::NoPeriods);

    let mut s = spec(vec![]);
    s.period_duration_min = 0;
    assert_eq!(plan_day(&day(), &s).unwrap_err(), ValidationError::ZeroDuration);

    let s = spec(vec![brk(1, 10, "  ")]);
    assert_eq!(plan_day(&day(), &s).unwrap_err(), ValidationError::MissingBreakName);
  }

  #[test]
  fn rejects_days_past_midnight() {
    let mut s = spec(vec![]);
    s.start_time = t("22:30");
    assert_eq!(plan_day(&day(), &s).unwrap_err(), ValidationError::DayOverflow);
  }
}
