//! HTTP server wiring for the timetable scheduler.
//!
//! The binary in `main.rs` loads a [`ServerConfig`], opens the SQLite store
//! and serves [`app`].

use std::path::{Path, PathBuf};

use axum::Router;
use serde::Deserialize;
use timetable_scheduler::{Scheduler, SchedulerConfig};
use timetable_store_sqlite::SqliteStore;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TIMETABLE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub scheduler:  SchedulerConfig,
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `TIMETABLE_*` variables.
  ///
  /// Nested keys use a double underscore, e.g.
  /// `TIMETABLE_SCHEDULER__PROGRESS_KEYING=content`.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("TIMETABLE")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API under `/api`, with request tracing.
pub fn app(scheduler: Scheduler<SqliteStore>) -> Router {
  Router::new()
    .nest("/api", timetable_api::api_router(scheduler))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use timetable_core::progress::ProgressKeying;

  use super::*;

  fn write_config(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("timetable-{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
  }

  #[test]
  fn loads_scheduler_table() {
    let path = write_config(
      r#"
port = 9000
store_path = "/tmp/timetable.db"

[scheduler]
progress_keying = "content"
"#,
    );

    let cfg = ServerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.scheduler.progress_keying, ProgressKeying::Content);
    assert_eq!(cfg.scheduler.placeholder_period_number, 9999);
  }

  #[test]
  fn missing_store_path_is_an_error() {
    let missing = std::env::temp_dir().join("timetable-does-not-exist.toml");
    assert!(ServerConfig::load(&missing).is_err());
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/data/timetable.db")),
      PathBuf::from(home).join("data/timetable.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs")), PathBuf::from("/abs"));
  }
}
