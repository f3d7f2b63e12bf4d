//! Process probing for stale-lock detection.
//!
//! Two small capabilities, both best-effort and both strictly non-fatal:
//!
//! - [`pid_exists`] answers "is there currently a process with this id?"
//!   via a zero-effect signal probe.
//! - [`ProcessInspector`] recovers a process's display name and start time,
//!   used to catch process-id reuse (the original lock holder exited and
//!   the OS handed its id to an unrelated process).
//!
//! Neither is allowed to block or fail the locking path: an inconclusive
//! probe degrades to "unknown" and the caller decides conservatively.

mod inspect;
mod liveness;

pub use inspect::{ProcessInspector, ProcessSnapshot, SystemInspector};
pub use liveness::pid_exists;
