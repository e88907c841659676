//! The partition key every query and mutation is scoped by.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One class's school day: `(school_code, class_instance_id, class_date)`.
///
/// Passed explicitly to every store and scheduler call; nothing is read from
/// ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassDay {
  pub school_code:       String,
  pub class_instance_id: Uuid,
  pub class_date:        NaiveDate,
}

impl ClassDay {
  pub fn new(
    school_code: impl Into<String>,
    class_instance_id: Uuid,
    class_date: NaiveDate,
  ) -> Self {
    Self { school_code: school_code.into(), class_instance_id, class_date }
  }
}

impl fmt::Display for ClassDay {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}/{}", self.school_code, self.class_instance_id, self.class_date)
  }
}
