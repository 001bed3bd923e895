//! An append-only, segmented commit log.
//!
//! A [`Log`] is a directory of segments, each pairing a [`Store`] (a framed,
//! append-only byte log) with an [`Index`] (a memory-mapped offset-to-position
//! mapping). Records are appended to whichever segment is currently active
//! and are assigned monotonically increasing offsets; once a segment reaches
//! either of its configured byte caps, the log rolls over to a new one.
//!
//! This crate does not configure logging on your behalf -- it emits
//! diagnostics through the `log` crate's macros and leaves initializing a
//! logger (`env_logger`, or whatever the embedding binary prefers) up to the
//! caller.

mod config;
pub mod error;
mod index;
mod log;
mod record;
mod segment;
mod store;

pub use crate::config::Config;
pub use crate::error::{DecodeError, IndexError, ReadError};
pub use crate::log::{Log, Reader};
pub use crate::record::Record;
