//! Core types and trait definitions for the timetable slot scheduler.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The scheduler, the storage backends and the API all depend on it.

pub mod error;
pub mod progress;
pub mod scope;
pub mod slot;
pub mod store;
pub mod time;

pub use error::{Error, Rejection, Result, ValidationError};
pub use scope::ClassDay;
pub use time::TimeRange;
