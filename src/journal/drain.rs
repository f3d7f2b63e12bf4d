//! Atomic read-process-clear over a journal.

use super::DEFAULT_LOCK_TIMEOUT;
use crate::error::{LocklineError, Result};
use crate::lock::LockManager;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Drain the journal at `path`: read every record, hand each to
/// `processor`, then delete the file, all under the journal's lock.
///
/// Per-record failures are isolated: a line that does not parse, or a
/// record the processor rejects, is reported on stderr and skipped so that
/// partial corruption of one entry never loses the rest of the queue. With
/// `dry_run` set the records are processed but the file is kept.
///
/// An absent journal is the normal empty-queue state and drains cleanly.
/// Any other I/O failure outside the per-record loop is reported on stderr
/// and swallowed; only a lock-acquisition failure reaches the caller, so a
/// drain can never leave the journal permanently locked.
///
/// # Errors
///
/// * [`LocklineError::LockError`] - the lock was not free within the
///   default timeout.
pub fn drain<T, F>(path: &Path, dry_run: bool, processor: F) -> Result<()>
where
    T: DeserializeOwned,
    F: FnMut(T) -> Result<()>,
{
    drain_with(
        &LockManager::default(),
        path,
        dry_run,
        DEFAULT_LOCK_TIMEOUT,
        processor,
    )
}

/// [`drain`] with an explicit lock manager and timeout.
pub fn drain_with<T, F>(
    manager: &LockManager,
    path: &Path,
    dry_run: bool,
    timeout: Duration,
    mut processor: F,
) -> Result<()>
where
    T: DeserializeOwned,
    F: FnMut(T) -> Result<()>,
{
    let mut lock = manager.acquire(path, timeout)?;

    if let Err(e) = drain_locked(path, dry_run, &mut processor) {
        // Deliberate policy: guaranteed lock release wins over strict
        // error visibility here. The failure is still reported.
        eprintln!("Warning: failed to drain journal '{}': {}", path.display(), e);
    }

    if let Err(e) = lock.release() {
        eprintln!("Warning: {}", e);
    }

    Ok(())
}

fn drain_locked<T, F>(path: &Path, dry_run: bool, processor: &mut F) -> Result<()>
where
    T: DeserializeOwned,
    F: FnMut(T) -> Result<()>,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        // Nothing queued; the file only exists once something was appended.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(LocklineError::UserError(format!(
                "failed to read journal '{}': {}",
                path.display(),
                e
            )));
        }
    };

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(line) {
            Ok(record) => {
                if let Err(e) = processor(record) {
                    eprintln!(
                        "Warning: handler failed for journal line '{}': {}",
                        line, e
                    );
                }
            }
            Err(e) => {
                eprintln!("Warning: skipping malformed journal line '{}': {}", line, e);
            }
        }
    }

    if !dry_run {
        fs::remove_file(path).map_err(|e| {
            LocklineError::UserError(format!(
                "failed to clear journal '{}': {}",
                path.display(),
                e
            ))
        })?;
    }

    Ok(())
}
