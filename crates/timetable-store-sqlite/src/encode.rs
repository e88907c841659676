//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339, calendar dates `YYYY-MM-DD`, times of day
//! `HH:MM:SS`. UUIDs are stored as hyphenated lowercase strings. A
//! [`SlotKind`] is spread across `slot_type` plus its nullable columns.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use timetable_core::{
  ClassDay,
  progress::{ProgressKey, ProgressRecord},
  slot::{PeriodDetails, SlotKind, SlotStatus, TimetableSlot},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate / NaiveTime ───────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

/// Fixed-width so that SQL text comparison matches time order.
pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ClassDay ────────────────────────────────────────────────────────────────

/// The three scope columns, in `(school_code, class_instance_id, date)`
/// order, ready to be moved into a connection closure.
#[derive(Debug, Clone)]
pub struct DayKey {
  pub school_code: String,
  pub class_id:    String,
  pub date:        String,
}

impl From<&ClassDay> for DayKey {
  fn from(day: &ClassDay) -> Self {
    Self {
      school_code: day.school_code.clone(),
      class_id:    encode_uuid(day.class_instance_id),
      date:        encode_date(day.class_date),
    }
  }
}

// ─── SlotKind ────────────────────────────────────────────────────────────────

/// The column values a [`SlotKind`] occupies.
#[derive(Debug, Clone)]
pub struct KindColumns {
  pub slot_type:           &'static str,
  pub name:                Option<String>,
  pub subject_id:          Option<String>,
  pub teacher_id:          Option<String>,
  pub syllabus_chapter_id: Option<String>,
  pub syllabus_topic_id:   Option<String>,
  pub plan_text:           Option<String>,
}

impl From<&SlotKind> for KindColumns {
  fn from(kind: &SlotKind) -> Self {
    match kind {
      SlotKind::Period(p) => Self {
        slot_type:           kind.discriminant(),
        name:                None,
        subject_id:          p.subject_id.map(encode_uuid),
        teacher_id:          p.teacher_id.map(encode_uuid),
        syllabus_chapter_id: p.syllabus_chapter_id.map(encode_uuid),
        syllabus_topic_id:   p.syllabus_topic_id.map(encode_uuid),
        plan_text:           p.plan_text.clone(),
      },
      SlotKind::Break { name } => Self {
        slot_type:           kind.discriminant(),
        name:                Some(name.clone()),
        subject_id:          None,
        teacher_id:          None,
        syllabus_chapter_id: None,
        syllabus_topic_id:   None,
        plan_text:           None,
      },
    }
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSlot::from_row`].
pub const SLOT_COLUMNS: &str = "slot_id, school_code, class_instance_id, class_date,
  period_number, slot_type, name, start_time, end_time,
  subject_id, teacher_id, syllabus_chapter_id, syllabus_topic_id, plan_text,
  status, created_at, updated_at";

/// Raw values read directly from a `timetable_slots` row.
pub struct RawSlot {
  pub slot_id:             String,
  pub school_code:         String,
  pub class_instance_id:   String,
  pub class_date:          String,
  pub period_number:       i64,
  pub slot_type:           String,
  pub name:                Option<String>,
  pub start_time:          String,
  pub end_time:            String,
  pub subject_id:          Option<String>,
  pub teacher_id:          Option<String>,
  pub syllabus_chapter_id: Option<String>,
  pub syllabus_topic_id:   Option<String>,
  pub plan_text:           Option<String>,
  pub status:              String,
  pub created_at:          String,
  pub updated_at:          String,
}

impl RawSlot {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      slot_id:             row.get(0)?,
      school_code:         row.get(1)?,
      class_instance_id:   row.get(2)?,
      class_date:          row.get(3)?,
      period_number:       row.get(4)?,
      slot_type:           row.get(5)?,
      name:                row.get(6)?,
      start_time:          row.get(7)?,
      end_time:            row.get(8)?,
      subject_id:          row.get(9)?,
      teacher_id:          row.get(10)?,
      syllabus_chapter_id: row.get(11)?,
      syllabus_topic_id:   row.get(12)?,
      plan_text:           row.get(13)?,
      status:              row.get(14)?,
      created_at:          row.get(15)?,
      updated_at:          row.get(16)?,
    })
  }

  pub fn into_slot(self) -> Result<TimetableSlot> {
    let kind = match self.slot_type.as_str() {
      "period" => SlotKind::Period(PeriodDetails {
        subject_id:          decode_opt_uuid(self.subject_id)?,
        teacher_id:          decode_opt_uuid(self.teacher_id)?,
        syllabus_chapter_id: decode_opt_uuid(self.syllabus_chapter_id)?,
        syllabus_topic_id:   decode_opt_uuid(self.syllabus_topic_id)?,
        plan_text:           self.plan_text,
      }),
      "break" => SlotKind::Break { name: self.name.unwrap_or_default() },
      other => {
        return Err(timetable_core::Error::UnknownSlotType(other.to_owned()).into());
      }
    };

    let period_number = u32::try_from(self.period_number).map_err(|_| {
      Error::InvalidColumn(format!("period number out of range: {}", self.period_number))
    })?;

    Ok(TimetableSlot {
      slot_id: decode_uuid(&self.slot_id)?,
      school_code: self.school_code,
      class_instance_id: decode_uuid(&self.class_instance_id)?,
      class_date: decode_date(&self.class_date)?,
      period_number,
      kind,
      start_time: decode_time(&self.start_time)?,
      end_time: decode_time(&self.end_time)?,
      status: self.status.parse::<SlotStatus>()?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawProgressRecord::from_row`].
pub const PROGRESS_COLUMNS: &str = "progress_id, school_code, class_instance_id, date,
  subject_id, teacher_id, syllabus_chapter_id, syllabus_topic_id,
  timetable_slot_id, recorded_at";

/// Raw values read directly from a `syllabus_progress` row.
pub struct RawProgressRecord {
  pub progress_id:         String,
  pub school_code:         String,
  pub class_instance_id:   String,
  pub date:                String,
  pub subject_id:          String,
  pub teacher_id:          String,
  pub syllabus_chapter_id: Option<String>,
  pub syllabus_topic_id:   Option<String>,
  pub timetable_slot_id:   Option<String>,
  pub recorded_at:         String,
}

impl RawProgressRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      progress_id:         row.get(0)?,
      school_code:         row.get(1)?,
      class_instance_id:   row.get(2)?,
      date:                row.get(3)?,
      subject_id:          row.get(4)?,
      teacher_id:          row.get(5)?,
      syllabus_chapter_id: row.get(6)?,
      syllabus_topic_id:   row.get(7)?,
      timetable_slot_id:   row.get(8)?,
      recorded_at:         row.get(9)?,
    })
  }

  pub fn into_record(self) -> Result<ProgressRecord> {
    Ok(ProgressRecord {
      progress_id:       decode_uuid(&self.progress_id)?,
      school_code:       self.school_code,
      class_instance_id: decode_uuid(&self.class_instance_id)?,
      date:              decode_date(&self.date)?,
      key:               ProgressKey {
        subject_id:          decode_uuid(&self.subject_id)?,
        teacher_id:          decode_uuid(&self.teacher_id)?,
        syllabus_chapter_id: decode_opt_uuid(self.syllabus_chapter_id)?,
        syllabus_topic_id:   decode_opt_uuid(self.syllabus_topic_id)?,
      },
      timetable_slot_id: decode_opt_uuid(self.timetable_slot_id)?,
      recorded_at:       decode_dt(&self.recorded_at)?,
    })
  }
}
