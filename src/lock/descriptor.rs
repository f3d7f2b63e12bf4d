//! On-disk lock metadata.

use crate::error::{LocklineError, Result};
use crate::process::ProcessInspector;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Metadata stored inside a marker file, identifying the lock holder.
///
/// Timestamps travel as epoch milliseconds so the marker stays readable by
/// cooperating tooling in other languages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockDescriptor {
    /// Process id of the lock holder.
    #[serde(rename = "ownerPid")]
    pub owner_pid: u32,

    /// Wall-clock time of acquisition.
    #[serde(rename = "acquiredAtEpochMs", with = "chrono::serde::ts_milliseconds")]
    pub acquired_at: DateTime<Utc>,

    /// Hostname of the acquiring machine. Diagnostic only: locks are
    /// filesystem-local, so this never participates in correctness.
    #[serde(rename = "hostId")]
    pub host_id: String,

    /// Best-effort display name of the owning process at acquisition time.
    #[serde(
        rename = "processName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub process_name: Option<String>,

    /// Best-effort start time of the owning process, recorded to help
    /// disambiguate process-id reuse.
    #[serde(
        rename = "processStartEpochMs",
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub process_started_at: Option<DateTime<Utc>>,
}

impl LockDescriptor {
    /// Build a descriptor for the calling process, enriched with whatever
    /// the inspector can observe about it.
    pub fn for_current_process(inspector: &dyn ProcessInspector) -> Self {
        let pid = std::process::id();
        let snapshot = inspector.describe(pid);

        Self {
            owner_pid: pid,
            acquired_at: Utc::now(),
            host_id: hostname::get()
                .map(|h| h.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "unknown".to_string()),
            process_name: snapshot.as_ref().map(|s| s.name.clone()),
            process_started_at: snapshot.and_then(|s| s.started_at),
        }
    }

    /// Parse a descriptor from a marker file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            LocklineError::UserError(format!(
                "failed to read marker file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            LocklineError::UserError(format!(
                "failed to parse marker file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// Serialize the descriptor to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            LocklineError::UserError(format!("failed to serialize lock descriptor: {}", e))
        })
    }

    /// Calculate the age of the lock.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.acquired_at)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = self.age();
        let seconds = age.num_seconds();
        let minutes = age.num_minutes();
        let hours = age.num_hours();

        if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds % 60)
        } else {
            format!("{}s", seconds)
        }
    }
}
