//! Best-effort process metadata lookup.

use chrono::{DateTime, Utc};
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Metadata observed for a running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSnapshot {
    /// Display name of the process (executable name).
    pub name: String,

    /// Start time of the process, when the platform reports one.
    pub started_at: Option<DateTime<Utc>>,
}

/// Capability for recovering a process's name and start time from its id.
///
/// Implementations must never block the locking path and must never fail
/// loudly: any lookup problem degrades to `None`. The trait exists so tests
/// can substitute deterministic snapshots for the real process table.
pub trait ProcessInspector: Send + Sync {
    /// Describe the process with the given id, or `None` if it cannot be
    /// observed (gone, inaccessible, or the platform query failed).
    fn describe(&self, pid: u32) -> Option<ProcessSnapshot>;
}

/// Inspector backed by the OS process table via `sysinfo`.
///
/// Covers both unix-like systems and Windows through the same API, so there
/// is no subprocess to spawn and no `ps`/`wmic` output to parse.
#[derive(Debug, Default)]
pub struct SystemInspector;

impl ProcessInspector for SystemInspector {
    fn describe(&self, pid: u32) -> Option<ProcessSnapshot> {
        let pid = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let process = system.process(pid)?;
        let name = process.name().to_string_lossy().into_owned();
        let started_at = match process.start_time() {
            0 => None, // platform did not report a start time
            secs => DateTime::from_timestamp(secs as i64, 0),
        };

        Some(ProcessSnapshot { name, started_at })
    }
}
