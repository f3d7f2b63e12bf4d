//! Atomic operations over JSONL journal files.
//!
//! A journal is a UTF-8 text file holding one self-contained JSON value
//! per line. Two operations exist, and both take the journal's lock (see
//! [`crate::lock`]) so they are mutually exclusive across processes:
//!
//! - [`append`] adds one record to the end of the journal.
//! - [`drain`] reads the journal in full, hands each record to a handler,
//!   and deletes the file. An empty or absent journal is the natural
//!   "queue drained" state for the next appender.
//!
//! # Framing
//!
//! No record's serialized form may contain a line terminator; that would
//! corrupt the framing of every record after it. Violators are rejected
//! before any lock is taken or any byte is written.

mod append;
mod drain;


pub use append::{append, append_with};
pub use drain::{drain, drain_with};

use std::time::Duration;

/// How long journal operations wait for the lock when the caller does not
/// say otherwise.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(30);
