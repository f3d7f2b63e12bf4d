//! Locking subsystem for lockline.
//!
//! This module implements advisory cross-process locks built entirely on
//! filesystem primitives.
//!
//! # Marker Files
//!
//! The lock for a target path is a marker file at `<path>.lock`. Markers
//! are created using **create_new** semantics (exclusive create) so the
//! filesystem itself arbitrates between competitors: there is no
//! check-then-write window to race through.
//!
//! # Marker Metadata
//!
//! Each marker contains a JSON [`LockDescriptor`]:
//! - `ownerPid`: process id of the holder
//! - `acquiredAtEpochMs`: wall-clock acquisition time
//! - `hostId`: hostname of the acquiring machine (diagnostic only)
//! - `processName` / `processStartEpochMs`: best-effort owner identity,
//!   used to disambiguate process-id reuse
//!
//! # Staleness
//!
//! A marker whose owner is dead, whose owner's pid now belongs to a
//! differently-named process, or whose age exceeds an optional ceiling is
//! stale and may be reclaimed by deleting and recreating it. This is the
//! only sanctioned way a second party touches another holder's marker.
//!
//! # Waiting
//!
//! Acquisition polls: retry on a fixed short interval until a timeout
//! elapses. No queueing or fairness among waiters is provided.

mod descriptor;
mod manager;
mod stale;

#[cfg(test)]
mod tests;

pub use descriptor::LockDescriptor;
pub use manager::{FileLock, LockManager, LockOptions, marker_path, MARKER_SUFFIX};
