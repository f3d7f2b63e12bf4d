//! Atomic single-record append.

use super::DEFAULT_LOCK_TIMEOUT;
use crate::error::{LocklineError, Result};
use crate::lock::LockManager;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Append one record to the journal at `path`, atomically.
///
/// Serializes the record, validates the framing, then appends one line
/// while holding the journal's lock. With `dry_run` set the file is still
/// opened (and created if absent) but nothing is written.
///
/// # Errors
///
/// * [`LocklineError::FramingError`] - the serialized record contains a
///   line terminator; raised before any lock is taken or file is touched.
/// * [`LocklineError::LockError`] - the lock was not free within the
///   default timeout.
/// * [`LocklineError::UserError`] - the write itself failed. The lock is
///   still released first.
pub fn append<T: Serialize>(path: &Path, record: &T, dry_run: bool) -> Result<()> {
    append_with(
        &LockManager::default(),
        path,
        record,
        dry_run,
        DEFAULT_LOCK_TIMEOUT,
    )
}

/// [`append`] with an explicit lock manager and timeout.
pub fn append_with<T: Serialize>(
    manager: &LockManager,
    path: &Path,
    record: &T,
    dry_run: bool,
    timeout: Duration,
) -> Result<()> {
    let line = serde_json::to_string(record)
        .map_err(|e| LocklineError::UserError(format!("failed to serialize record: {}", e)))?;

    // Reject before any I/O: an embedded terminator would split this
    // record across lines and corrupt everything behind it.
    if line.contains('\n') || line.contains('\r') {
        return Err(LocklineError::FramingError(
            "record serializes with an embedded line terminator".to_string(),
        ));
    }

    let mut lock = manager.acquire(path, timeout)?;
    let written = write_line(path, &line, dry_run);
    let released = lock.release();

    // A write failure surfaces, but never with the lock still held.
    written?;
    released
}

fn write_line(path: &Path, line: &str, dry_run: bool) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LocklineError::UserError(format!(
                "failed to open journal '{}': {}",
                path.display(),
                e
            ))
        })?;

    if dry_run {
        return Ok(());
    }

    writeln!(file, "{}", line).map_err(|e| {
        LocklineError::UserError(format!(
            "failed to write record to '{}': {}",
            path.display(),
            e
        ))
    })?;

    // Sync to disk for durability
    file.sync_all().map_err(|e| {
        LocklineError::UserError(format!(
            "failed to sync journal '{}': {}",
            path.display(),
            e
        ))
    })
}
