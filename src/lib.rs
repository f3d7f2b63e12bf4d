//! Lockline: file-based cross-process locks and atomic JSONL journals.
//!
//! Independent OS processes have no shared memory, so this crate uses the
//! filesystem itself as the synchronization medium: a lock is a marker file
//! created with exclusive-create semantics, and the marker's existence is
//! the lock. On top of that primitive sit two journal operations:
//!
//! - [`journal::append`] atomically appends one JSON record to a
//!   newline-delimited log file.
//! - [`journal::drain`] reads a log file in full, hands each record to a
//!   caller-supplied handler, and clears the file.
//!
//! Both take the same lock for a given path, so appenders and drainers are
//! mutually exclusive with each other as well as with themselves.
//!
//! Stale markers (left behind by a crashed holder, or by a process id the
//! OS has since reassigned) are detected and reclaimed automatically; see
//! [`lock::LockManager`].

pub mod error;
pub mod exit_codes;
pub mod journal;
pub mod lock;
pub mod process;
