//! SQL schema for the timetable SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per period or break of a class's day.
-- Times are 'HH:MM:SS' so text comparison orders them correctly.
CREATE TABLE IF NOT EXISTS timetable_slots (
    slot_id             TEXT PRIMARY KEY,
    school_code         TEXT NOT NULL,
    class_instance_id   TEXT NOT NULL,
    class_date          TEXT NOT NULL,   -- YYYY-MM-DD
    period_number       INTEGER NOT NULL,
    slot_type           TEXT NOT NULL,   -- 'period' | 'break'
    name                TEXT,            -- breaks only
    start_time          TEXT NOT NULL,
    end_time            TEXT NOT NULL,
    subject_id          TEXT,            -- periods only, from here down
    teacher_id          TEXT,
    syllabus_chapter_id TEXT,
    syllabus_topic_id   TEXT,
    plan_text           TEXT,
    status              TEXT NOT NULL DEFAULT 'planned',
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL,
    UNIQUE (school_code, class_instance_id, class_date, period_number),
    CHECK  (start_time < end_time),
    CHECK  (slot_type IN ('period', 'break')),
    CHECK  (status IN ('planned', 'done', 'cancelled')),
    CHECK  (slot_type = 'break' OR name IS NULL),
    CHECK  (slot_type = 'period' OR (name IS NOT NULL
            AND subject_id IS NULL AND teacher_id IS NULL
            AND syllabus_chapter_id IS NULL AND syllabus_topic_id IS NULL
            AND plan_text IS NULL))
);

-- Append-only ledger of taught periods. No foreign key to timetable_slots:
-- records outlive the slot they came from.
CREATE TABLE IF NOT EXISTS syllabus_progress (
    progress_id         TEXT PRIMARY KEY,
    school_code         TEXT NOT NULL,
    class_instance_id   TEXT NOT NULL,
    date                TEXT NOT NULL,
    subject_id          TEXT NOT NULL,
    teacher_id          TEXT NOT NULL,
    syllabus_chapter_id TEXT,
    syllabus_topic_id   TEXT,
    timetable_slot_id   TEXT,
    recorded_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS timetable_slots_day_idx
    ON timetable_slots(school_code, class_instance_id, class_date, start_time);
CREATE INDEX IF NOT EXISTS syllabus_progress_day_idx
    ON syllabus_progress(school_code, class_instance_id, date);
CREATE INDEX IF NOT EXISTS syllabus_progress_slot_idx
    ON syllabus_progress(timetable_slot_id);

PRAGMA user_version = 1;
";
