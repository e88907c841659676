//! SQLite backend for the timetable slot store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Guarded writes (overlap check plus
//! insert or update, batched renumbering) run inside a single transaction on
//! that thread.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
