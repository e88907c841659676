//! [`SqliteStore`]: the SQLite implementation of [`SlotStore`].

use std::{collections::HashSet, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use timetable_core::{
  ClassDay, Rejection, TimeRange,
  progress::{NewProgressRecord, ProgressMatch, ProgressRecord},
  slot::{NewSlot, SlotId, SlotPatch, TimetableSlot},
  store::SlotStore,
};

use crate::{
  Error, Result,
  encode::{
    DayKey, KindColumns, PROGRESS_COLUMNS, RawProgressRecord, RawSlot, SLOT_COLUMNS,
    decode_time, decode_uuid, encode_date, encode_dt, encode_time, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Guarded writes ──────────────────────────────────────────────────────────

/// A refusal detected on the connection thread, still in column form.
enum Refusal {
  Overlap {
    requested: (String, String),
    existing:  (String, String),
  },
  DuplicateNumber(u32),
  InvalidRange {
    start: String,
    end:   String,
  },
  NotFound(Uuid),
}

type Guarded<T> = std::result::Result<T, Refusal>;

fn decode_range((start, end): &(String, String)) -> Result<TimeRange> {
  Ok(TimeRange::new(decode_time(start)?, decode_time(end)?))
}

fn refused(refusal: Refusal) -> Error {
  let rejection = match refusal {
    Refusal::Overlap { requested, existing } => {
      match (decode_range(&requested), decode_range(&existing)) {
        (Ok(requested), Ok(existing)) => Rejection::Overlap { requested, existing },
        (Err(e), _) | (_, Err(e)) => return e,
      }
    }
    Refusal::DuplicateNumber(n) => Rejection::DuplicatePeriodNumber(n),
    Refusal::InvalidRange { start, end } => {
      match (decode_time(&start), decode_time(&end)) {
        (Ok(start), Ok(end)) => Rejection::InvalidRange { start, end },
        (Err(e), _) | (_, Err(e)) => return e,
      }
    }
    Refusal::NotFound(id) => Rejection::SlotNotFound(id),
  };
  Error::Rejected(rejection)
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

/// First slot of the day intersecting `[start, end)`, ignoring `except`.
fn find_overlap(
  conn:   &rusqlite::Connection,
  key:    &DayKey,
  start:  &str,
  end:    &str,
  except: Option<&str>,
) -> rusqlite::Result<Option<(String, String)>> {
  conn
    .query_row(
      "SELECT start_time, end_time FROM timetable_slots
       WHERE school_code = ?1 AND class_instance_id = ?2 AND class_date = ?3
         AND start_time < ?4 AND end_time > ?5
         AND slot_id IS NOT ?6
       ORDER BY start_time
       LIMIT 1",
      rusqlite::params![key.school_code, key.class_id, key.date, end, start, except],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .optional()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A timetable slot store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SlotStore impl ──────────────────────────────────────────────────────────

impl SlotStore for SqliteStore {
  type Error = Error;

  // ── Slot reads ─────────────────────────────────────────────────────────

  async fn list_slots<'a>(&'a self, day: &'a ClassDay) -> Result<Vec<TimetableSlot>> {
    let key = DayKey::from(day);

    let raws: Vec<RawSlot> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SLOT_COLUMNS} FROM timetable_slots
           WHERE school_code = ?1 AND class_instance_id = ?2 AND class_date = ?3
           ORDER BY start_time, period_number"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![key.school_code, key.class_id, key.date],
            RawSlot::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSlot::into_slot).collect()
  }

  async fn get_slot<'a>(
    &'a self,
    day: &'a ClassDay,
    id:  SlotId,
  ) -> Result<Option<TimetableSlot>> {
    let key    = DayKey::from(day);
    let id_str = encode_uuid(id);

    let raw: Option<RawSlot> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SLOT_COLUMNS} FROM timetable_slots
                 WHERE slot_id = ?1
                   AND school_code = ?2 AND class_instance_id = ?3 AND class_date = ?4"
              ),
              rusqlite::params![id_str, key.school_code, key.class_id, key.date],
              RawSlot::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSlot::into_slot).transpose()
  }

  // ── Slot writes ────────────────────────────────────────────────────────

  async fn insert_slot(&self, input: NewSlot) -> Result<TimetableSlot> {
    let now  = Utc::now();
    let slot = TimetableSlot {
      slot_id:           Uuid::new_v4(),
      school_code:       input.day.school_code.clone(),
      class_instance_id: input.day.class_instance_id,
      class_date:        input.day.class_date,
      period_number:     input.period_number,
      kind:              input.kind,
      start_time:        input.start_time,
      end_time:          input.end_time,
      status:            input.status,
      created_at:        now,
      updated_at:        now,
    };

    let key     = DayKey::from(&input.day);
    let id_str  = encode_uuid(slot.slot_id);
    let number  = slot.period_number;
    let start   = encode_time(slot.start_time);
    let end     = encode_time(slot.end_time);
    let cols    = KindColumns::from(&slot.kind);
    let status  = slot.status.as_str();
    let at_str  = encode_dt(now);

    let outcome: Guarded<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if let Some(existing) = find_overlap(&tx, &key, &start, &end, None)? {
          return Ok(Err(Refusal::Overlap { requested: (start, end), existing }));
        }

        let inserted = tx.execute(
          "INSERT INTO timetable_slots (
             slot_id, school_code, class_instance_id, class_date, period_number,
             slot_type, name, start_time, end_time,
             subject_id, teacher_id, syllabus_chapter_id, syllabus_topic_id, plan_text,
             status, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
          rusqlite::params![
            id_str,
            key.school_code,
            key.class_id,
            key.date,
            number,
            cols.slot_type,
            cols.name,
            start,
            end,
            cols.subject_id,
            cols.teacher_id,
            cols.syllabus_chapter_id,
            cols.syllabus_topic_id,
            cols.plan_text,
            status,
            at_str,
          ],
        );
        match inserted {
          Err(e) if is_unique_violation(&e) => {
            return Ok(Err(Refusal::DuplicateNumber(number)));
          }
          other => {
            other?;
          }
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome.map_err(refused)?;
    Ok(slot)
  }

  async fn insert_slots(&self, slots: Vec<NewSlot>) -> Result<Vec<TimetableSlot>> {
    let mut inserted = Vec::with_capacity(slots.len());
    for slot in slots {
      inserted.push(self.insert_slot(slot).await?);
    }
    Ok(inserted)
  }

  async fn update_slot<'a>(
    &'a self,
    day:   &'a ClassDay,
    id:    SlotId,
    patch: SlotPatch,
  ) -> Result<TimetableSlot> {
    let key       = DayKey::from(day);
    let id_str    = encode_uuid(id);
    let new_start = patch.start_time.map(encode_time);
    let new_end   = patch.end_time.map(encode_time);
    let status    = patch.status.map(|s| s.as_str());
    let kind      = patch.kind.as_ref().map(KindColumns::from);
    let at_str    = encode_dt(Utc::now());

    let outcome: Guarded<RawSlot> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current: Option<(String, String)> = tx
          .query_row(
            "SELECT start_time, end_time FROM timetable_slots
             WHERE slot_id = ?1
               AND school_code = ?2 AND class_instance_id = ?3 AND class_date = ?4",
            rusqlite::params![id_str, key.school_code, key.class_id, key.date],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;
        let Some((cur_start, cur_end)) = current else {
          return Ok(Err(Refusal::NotFound(id)));
        };

        let start = new_start.unwrap_or(cur_start);
        let end   = new_end.unwrap_or(cur_end);
        if start >= end {
          return Ok(Err(Refusal::InvalidRange { start, end }));
        }
        if let Some(existing) = find_overlap(&tx, &key, &start, &end, Some(&id_str))? {
          return Ok(Err(Refusal::Overlap { requested: (start, end), existing }));
        }

        tx.execute(
          "UPDATE timetable_slots
           SET start_time = ?1, end_time = ?2, status = COALESCE(?3, status), updated_at = ?4
           WHERE slot_id = ?5",
          rusqlite::params![start, end, status, at_str, id_str],
        )?;

        if let Some(k) = kind {
          tx.execute(
            "UPDATE timetable_slots
             SET slot_type = ?1, name = ?2, subject_id = ?3, teacher_id = ?4,
                 syllabus_chapter_id = ?5, syllabus_topic_id = ?6, plan_text = ?7
             WHERE slot_id = ?8",
            rusqlite::params![
              k.slot_type,
              k.name,
              k.subject_id,
              k.teacher_id,
              k.syllabus_chapter_id,
              k.syllabus_topic_id,
              k.plan_text,
              id_str,
            ],
          )?;
        }

        let raw = tx.query_row(
          &format!("SELECT {SLOT_COLUMNS} FROM timetable_slots WHERE slot_id = ?1"),
          rusqlite::params![id_str],
          RawSlot::from_row,
        )?;

        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    outcome.map_err(refused)?.into_slot()
  }

  async fn assign_period_numbers<'a>(
    &'a self,
    day:     &'a ClassDay,
    numbers: Vec<(SlotId, u32)>,
  ) -> Result<()> {
    if numbers.is_empty() {
      return Ok(());
    }

    let key = DayKey::from(day);
    let numbers: Vec<(Uuid, String, u32)> = numbers
      .into_iter()
      .map(|(id, n)| (id, encode_uuid(id), n))
      .collect();

    let outcome: Guarded<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Park every target on its negated number first so that swapping two
        // numbers never collides with the UNIQUE constraint.
        for (id, id_str, n) in &numbers {
          let changed = tx.execute(
            "UPDATE timetable_slots SET period_number = ?1
             WHERE slot_id = ?2
               AND school_code = ?3 AND class_instance_id = ?4 AND class_date = ?5",
            rusqlite::params![-i64::from(*n), id_str, key.school_code, key.class_id, key.date],
          )?;
          if changed == 0 {
            return Ok(Err(Refusal::NotFound(*id)));
          }
        }

        for (_, id_str, n) in &numbers {
          let written = tx.execute(
            "UPDATE timetable_slots SET period_number = ?1 WHERE slot_id = ?2",
            rusqlite::params![n, id_str],
          );
          match written {
            Err(e) if is_unique_violation(&e) => {
              return Ok(Err(Refusal::DuplicateNumber(*n)));
            }
            other => {
              other?;
            }
          }
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome.map_err(refused)
  }

  async fn delete_slot<'a>(&'a self, day: &'a ClassDay, id: SlotId) -> Result<()> {
    let key    = DayKey::from(day);
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM timetable_slots
           WHERE slot_id = ?1
             AND school_code = ?2 AND class_instance_id = ?3 AND class_date = ?4",
          rusqlite::params![id_str, key.school_code, key.class_id, key.date],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(Rejection::SlotNotFound(id).into());
    }
    Ok(())
  }

  async fn delete_all_slots<'a>(&'a self, day: &'a ClassDay) -> Result<usize> {
    let key = DayKey::from(day);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM timetable_slots
           WHERE school_code = ?1 AND class_instance_id = ?2 AND class_date = ?3",
          rusqlite::params![key.school_code, key.class_id, key.date],
        )?)
      })
      .await?;

    Ok(removed)
  }

  // ── Progress ledger ───────────────────────────────────────────────────────

  async fn insert_progress_record(&self, input: NewProgressRecord) -> Result<ProgressRecord> {
    let record = ProgressRecord {
      progress_id:       Uuid::new_v4(),
      school_code:       input.day.school_code.clone(),
      class_instance_id: input.day.class_instance_id,
      date:              input.day.class_date,
      key:               input.key,
      timetable_slot_id: input.timetable_slot_id,
      recorded_at:       Utc::now(),
    };

    let id_str      = encode_uuid(record.progress_id);
    let school_code = record.school_code.clone();
    let class_str   = encode_uuid(record.class_instance_id);
    let date_str    = encode_date(record.date);
    let subject_str = encode_uuid(record.key.subject_id);
    let teacher_str = encode_uuid(record.key.teacher_id);
    let chapter_str = record.key.syllabus_chapter_id.map(encode_uuid);
    let topic_str   = record.key.syllabus_topic_id.map(encode_uuid);
    let slot_str    = record.timetable_slot_id.map(encode_uuid);
    let at_str      = encode_dt(record.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO syllabus_progress (
             progress_id, school_code, class_instance_id, date,
             subject_id, teacher_id, syllabus_chapter_id, syllabus_topic_id,
             timetable_slot_id, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            school_code,
            class_str,
            date_str,
            subject_str,
            teacher_str,
            chapter_str,
            topic_str,
            slot_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn delete_progress_records<'a>(
    &'a self,
    day:      &'a ClassDay,
    matching: ProgressMatch,
  ) -> Result<usize> {
    let key = DayKey::from(day);

    let removed = match matching {
      ProgressMatch::Slot(slot_id) => {
        let slot_str = encode_uuid(slot_id);
        self
          .conn
          .call(move |conn| {
            Ok(conn.execute(
              "DELETE FROM syllabus_progress
               WHERE school_code = ?1 AND class_instance_id = ?2 AND date = ?3
                 AND timetable_slot_id = ?4",
              rusqlite::params![key.school_code, key.class_id, key.date, slot_str],
            )?)
          })
          .await?
      }
      ProgressMatch::Content(content) => {
        let subject_str = encode_uuid(content.subject_id);
        let teacher_str = encode_uuid(content.teacher_id);
        let chapter_str = content.syllabus_chapter_id.map(encode_uuid);
        let topic_str   = content.syllabus_topic_id.map(encode_uuid);
        self
          .conn
          .call(move |conn| {
            Ok(conn.execute(
              "DELETE FROM syllabus_progress
               WHERE school_code = ?1 AND class_instance_id = ?2 AND date = ?3
                 AND subject_id = ?4 AND teacher_id = ?5
                 AND syllabus_chapter_id IS ?6 AND syllabus_topic_id IS ?7",
              rusqlite::params![
                key.school_code,
                key.class_id,
                key.date,
                subject_str,
                teacher_str,
                chapter_str,
                topic_str,
              ],
            )?)
          })
          .await?
      }
    };

    Ok(removed)
  }

  async fn list_progress_slot_ids<'a>(&'a self, day: &'a ClassDay) -> Result<HashSet<SlotId>> {
    let key = DayKey::from(day);

    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT timetable_slot_id FROM syllabus_progress
           WHERE school_code = ?1 AND class_instance_id = ?2 AND date = ?3
             AND timetable_slot_id IS NOT NULL",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![key.school_code, key.class_id, key.date],
            |r| r.get(0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_uuid(s)).collect()
  }

  async fn list_progress_records<'a>(
    &'a self,
    day: &'a ClassDay,
  ) -> Result<Vec<ProgressRecord>> {
    let key = DayKey::from(day);

    let raws: Vec<RawProgressRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROGRESS_COLUMNS} FROM syllabus_progress
           WHERE school_code = ?1 AND class_instance_id = ?2 AND date = ?3
           ORDER BY recorded_at, rowid"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![key.school_code, key.class_id, key.date],
            RawProgressRecord::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProgressRecord::into_record).collect()
  }
}
