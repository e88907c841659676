//! Time-of-day helpers.
//!
//! Slots carry wall-clock times with no date or timezone component. On the
//! wire they are written as `HH:MM` (or `HH:MM:SS` when seconds are set) and
//! both forms are accepted on input.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
  let s = s.trim();
  NaiveTime::parse_from_str(s, "%H:%M:%S")
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
    .map_err(|_| Error::InvalidTime(s.to_owned()))
}

/// Format as `HH:MM`, or `HH:MM:SS` if the seconds are non-zero.
pub fn format_time(t: NaiveTime) -> String {
  if t.second() == 0 {
    t.format("%H:%M").to_string()
  } else {
    t.format("%H:%M:%S").to_string()
  }
}

/// A half-open `[start, end)` span within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
  #[serde(with = "clock")]
  pub start: NaiveTime,
  #[serde(with = "clock")]
  pub end:   NaiveTime,
}

impl TimeRange {
  pub fn new(start: NaiveTime, end: NaiveTime) -> Self { Self { start, end } }

  /// Whether the two spans share any instant. Touching boundaries
  /// (`a.end == b.start`) do not count.
  pub fn overlaps(&self, other: &TimeRange) -> bool {
    self.start < other.end && other.start < self.end
  }
}

impl fmt::Display for TimeRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", format_time(self.start), format_time(self.end))
  }
}

/// `#[serde(with = "clock")]` for [`NaiveTime`] fields.
pub mod clock {
  use chrono::NaiveTime;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&super::format_time(*t))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(d)?;
    super::parse_time(&raw).map_err(D::Error::custom)
  }

  /// Same as the parent module, for `Option<NaiveTime>`.
  pub mod option {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(
      t: &Option<NaiveTime>,
      s: S,
    ) -> Result<S::Ok, S::Error> {
      match t {
        Some(t) => s.serialize_some(&super::super::format_time(*t)),
        None => s.serialize_none(),
      }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
      d: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
      Option::<String>::deserialize(d)?
        .map(|raw| super::super::parse_time(&raw).map_err(D::Error::custom))
        .transpose()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn t(s: &str) -> NaiveTime { parse_time(s).unwrap() }

  #[test]
  fn parses_both_forms() {
    assert_eq!(t("08:05"), NaiveTime::from_hms_opt(8, 5, 0).unwrap());
    assert_eq!(t("08:05:30"), NaiveTime::from_hms_opt(8, 5, 30).unwrap());
    assert!(parse_time("8 o'clock").is_err());
  }

  #[test]
  fn touching_ranges_do_not_overlap() {
    let a = TimeRange::new(t("08:00"), t("08:45"));
    let b = TimeRange::new(t("08:45"), t("09:30"));
    assert!(!a.overlaps(&b));
    assert!(!b.overlaps(&a));
  }

  #[test]
  fn nested_and_partial_ranges_overlap() {
    let outer = TimeRange::new(t("08:00"), t("09:00"));
    assert!(outer.overlaps(&TimeRange::new(t("08:30"), t("09:00"))));
    assert!(outer.overlaps(&TimeRange::new(t("07:30"), t("08:01"))));
    assert!(outer.overlaps(&TimeRange::new(t("07:00"), t("10:00"))));
  }

  #[test]
  fn display_drops_zero_seconds() {
    let r = TimeRange::new(t("08:00"), t("08:45:30"));
    assert_eq!(r.to_string(), "08:00-08:45:30");
  }
}
