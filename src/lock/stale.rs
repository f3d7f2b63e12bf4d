//! Staleness evaluation for existing markers.

use super::descriptor::LockDescriptor;
use crate::process::{self, ProcessInspector};
use std::path::Path;
use std::time::Duration;

/// Decide whether an existing marker may be reclaimed.
///
/// A marker is stale when any of the following holds:
///
/// 1. its descriptor cannot be read or parsed (a corrupt or half-written
///    marker is assumed abandoned);
/// 2. the recorded owner process no longer exists;
/// 3. the owner pid is alive but now belongs to a differently-named
///    process (the OS reassigned the id after the original holder exited);
/// 4. `stale_after` is set and the marker's age exceeds it, regardless of
///    owner liveness.
///
/// Inconclusive probes in 2-4 favor "not stale": a lock is only broken on
/// positive evidence, except for an unreadable marker which always counts.
pub(crate) fn is_stale(
    inspector: &dyn ProcessInspector,
    marker: &Path,
    stale_after: Option<Duration>,
) -> bool {
    let descriptor = match LockDescriptor::from_file(marker) {
        Ok(descriptor) => descriptor,
        Err(_) => return true,
    };

    if !process::pid_exists(descriptor.owner_pid) {
        return true;
    }

    // The owner pid is alive. Make sure it is still the process the
    // descriptor describes, not an unrelated one that inherited the id.
    if let Some(recorded) = descriptor.process_name.as_deref()
        && let Some(snapshot) = inspector.describe(descriptor.owner_pid)
        && snapshot.name != recorded
    {
        eprintln!(
            "Warning: marker '{}' pid {} reused by '{}' (was '{}'), treating as stale",
            marker.display(),
            descriptor.owner_pid,
            snapshot.name,
            recorded
        );
        return true;
    }

    if let Some(limit) = stale_after {
        let age_ms = descriptor.age().num_milliseconds();
        if age_ms > limit.as_millis() as i64 {
            eprintln!(
                "Warning: marker '{}' is {}ms old, treating as stale",
                marker.display(),
                age_ms
            );
            return true;
        }
    }

    false
}
