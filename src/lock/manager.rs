//! Lock acquisition, release, and re-acquisition.

use super::descriptor::LockDescriptor;
use super::stale;
use crate::error::{LocklineError, Result};
use crate::process::{ProcessInspector, SystemInspector};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Suffix appended to a target path to form its marker path.
pub const MARKER_SUFFIX: &str = ".lock";

/// Compute the marker path for a target path.
///
/// The suffix is appended to the full file name, so `queue.log` is guarded
/// by `queue.log.lock`.
pub fn marker_path(target: &Path) -> PathBuf {
    let mut os = target.as_os_str().to_os_string();
    os.push(MARKER_SUFFIX);
    PathBuf::from(os)
}

/// Tuning knobs for lock acquisition and staleness.
#[derive(Debug, Clone)]
pub struct LockOptions {
    /// How long to sleep between acquisition attempts while another
    /// process holds the lock.
    pub poll_interval: Duration,

    /// Optional hard ceiling on lock age. A marker older than this is
    /// treated as stale regardless of owner liveness. `None` disables the
    /// age check.
    pub stale_after: Option<Duration>,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            stale_after: None,
        }
    }
}

/// In-memory handle to a lock on a target path.
///
/// Created by a successful acquisition. Release makes the handle unheld;
/// the same handle can regain ownership later via
/// [`LockManager::reacquire`], which supports long-running callers that
/// detect and recover from having lost a lock externally.
///
/// As a safety net the handle also releases on drop, warning (but not
/// panicking) if the marker cannot be deleted.
#[derive(Debug)]
pub struct FileLock {
    /// The protected target path.
    file_path: PathBuf,

    /// The marker file this handle currently owns, if any.
    marker_path: Option<PathBuf>,
}

impl FileLock {
    fn acquired(file_path: PathBuf, marker_path: PathBuf) -> Self {
        Self {
            file_path,
            marker_path: Some(marker_path),
        }
    }

    /// The target path this handle locks.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// The marker file currently owned by this handle, if held.
    pub fn marker_path(&self) -> Option<&Path> {
        self.marker_path.as_deref()
    }

    /// Whether this handle believes it currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.marker_path.is_some()
    }

    /// Release the lock by deleting its marker file.
    ///
    /// Releasing an unheld handle is a no-op. A marker that is already
    /// missing counts as success: another party may have legitimately
    /// reclaimed it as stale. The handle becomes unheld either way.
    pub fn release(&mut self) -> Result<()> {
        let Some(marker) = self.marker_path.take() else {
            return Ok(());
        };

        match fs::remove_file(&marker) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LocklineError::UserError(format!(
                "failed to release lock '{}': {}",
                marker.display(),
                e
            ))),
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Some(marker) = self.marker_path.take()
            && let Err(e) = fs::remove_file(&marker)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            eprintln!(
                "Warning: failed to release lock '{}': {}",
                marker.display(),
                e
            );
        }
    }
}

/// Owns the lock-file protocol: atomic acquisition, staleness recovery,
/// retry with fixed backoff, and release.
pub struct LockManager {
    options: LockOptions,
    inspector: Box<dyn ProcessInspector>,
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new(LockOptions::default())
    }
}

impl LockManager {
    /// Create a manager probing the real system process table.
    pub fn new(options: LockOptions) -> Self {
        Self::with_inspector(options, Box::new(SystemInspector))
    }

    /// Create a manager with a custom process inspector.
    pub fn with_inspector(options: LockOptions, inspector: Box<dyn ProcessInspector>) -> Self {
        Self { options, inspector }
    }

    /// Acquire the lock for `path`, waiting up to `timeout`.
    ///
    /// Each attempt tries to create the marker file exclusively, writing a
    /// fresh [`LockDescriptor`] for the calling process. If the marker
    /// already exists and is stale it is deleted and the attempt repeats
    /// immediately; if it is live, the manager sleeps one poll interval
    /// before retrying. Any other filesystem error is fatal.
    ///
    /// # Errors
    ///
    /// * [`LocklineError::LockError`] - no free slot within `timeout`, or
    ///   the marker could not be created/written for reasons other than
    ///   contention.
    pub fn acquire(&self, path: &Path, timeout: Duration) -> Result<FileLock> {
        let marker = marker_path(path);
        let deadline = Instant::now() + timeout;

        loop {
            let descriptor = LockDescriptor::for_current_process(self.inspector.as_ref());
            match try_create_marker(&marker, &descriptor)? {
                MarkerCreate::Created => {
                    return Ok(FileLock::acquired(path.to_path_buf(), marker));
                }
                MarkerCreate::Held => {
                    if self.is_stale(&marker) {
                        break_marker(&marker)?;
                        // Immediate retry: the slot may now be free, but
                        // another waiter can still beat us to it.
                    } else {
                        std::thread::sleep(self.options.poll_interval);
                    }
                }
            }

            if Instant::now() >= deadline {
                return Err(LocklineError::LockError(format!(
                    "'{}' is locked by another process",
                    path.display()
                )));
            }
        }
    }

    /// Re-acquire a lock on a handle that may have lost it.
    ///
    /// A no-op if the handle still holds its marker; otherwise behaves like
    /// a fresh [`acquire`](Self::acquire) and mutates the handle in place.
    pub fn reacquire(&self, lock: &mut FileLock, timeout: Duration) -> Result<()> {
        if lock.is_held() {
            return Ok(());
        }

        let mut fresh = self.acquire(&lock.file_path, timeout)?;
        lock.marker_path = fresh.marker_path.take();
        Ok(())
    }

    /// Evaluate whether an existing marker is stale and may be reclaimed.
    pub fn is_stale(&self, marker: &Path) -> bool {
        stale::is_stale(self.inspector.as_ref(), marker, self.options.stale_after)
    }
}

enum MarkerCreate {
    Created,
    Held,
}

/// Attempt one exclusive creation of the marker file.
///
/// Atomicity of `create_new` is what prevents two competitors from both
/// believing they hold the lock; there is no separate existence check.
fn try_create_marker(marker: &Path, descriptor: &LockDescriptor) -> Result<MarkerCreate> {
    // Ensure the target's directory exists
    if let Some(parent) = marker.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            LocklineError::LockError(format!(
                "failed to create lock directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(marker) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Ok(MarkerCreate::Held);
        }
        Err(e) => {
            return Err(LocklineError::LockError(format!(
                "failed to create marker '{}': {}",
                marker.display(),
                e
            )));
        }
    };

    let json = descriptor.to_json()?;
    file.write_all(json.as_bytes()).map_err(|e| {
        // Clean up the marker on write failure
        let _ = fs::remove_file(marker);
        LocklineError::LockError(format!("failed to write lock descriptor: {}", e))
    })?;

    file.sync_all().map_err(|e| {
        // Clean up the marker on sync failure
        let _ = fs::remove_file(marker);
        LocklineError::LockError(format!("failed to sync marker file: {}", e))
    })?;

    Ok(MarkerCreate::Created)
}

/// Delete a stale marker so the slot can be retaken.
///
/// A marker that is already gone is fine: another waiter reclaimed it
/// first and we simply race them for the recreate.
fn break_marker(marker: &Path) -> Result<()> {
    match fs::remove_file(marker) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LocklineError::LockError(format!(
            "failed to remove stale marker '{}': {}",
            marker.display(),
            e
        ))),
    }
}
