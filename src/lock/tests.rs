use super::*;
use crate::error::LocklineError;
use crate::process::{ProcessInspector, ProcessSnapshot};
use chrono::{Duration as ChronoDuration, Utc};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Inspector that reports the same snapshot for every pid.
struct FixedInspector {
    name: &'static str,
}

impl ProcessInspector for FixedInspector {
    fn describe(&self, _pid: u32) -> Option<ProcessSnapshot> {
        Some(ProcessSnapshot {
            name: self.name.to_string(),
            started_at: None,
        })
    }
}

/// Inspector that can never observe anything (inconclusive probes).
struct BlindInspector;

impl ProcessInspector for BlindInspector {
    fn describe(&self, _pid: u32) -> Option<ProcessSnapshot> {
        None
    }
}

fn write_marker(marker: &Path, descriptor: &LockDescriptor) {
    fs::write(marker, descriptor.to_json().unwrap()).unwrap();
}

fn descriptor_for(pid: u32, name: Option<&str>) -> LockDescriptor {
    LockDescriptor {
        owner_pid: pid,
        acquired_at: Utc::now(),
        host_id: "test-host".to_string(),
        process_name: name.map(str::to_string),
        process_started_at: None,
    }
}

#[test]
fn marker_path_appends_suffix() {
    let marker = marker_path(Path::new("/tmp/queue.log"));
    assert_eq!(marker, Path::new("/tmp/queue.log.lock"));
}

#[test]
fn acquire_fresh_path_succeeds_immediately() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("queue.log");
    let manager = LockManager::default();

    let started = Instant::now();
    let lock = manager.acquire(&target, Duration::from_secs(5)).unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));

    assert!(lock.is_held());
    assert_eq!(lock.file_path(), target.as_path());

    // Marker exists and records the calling process.
    let marker = lock.marker_path().unwrap();
    let descriptor = LockDescriptor::from_file(marker).unwrap();
    assert_eq!(descriptor.owner_pid, std::process::id());
    assert!(!descriptor.host_id.is_empty());
}

#[test]
fn acquire_held_path_times_out() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("queue.log");
    let manager = LockManager::default();

    let _held = manager.acquire(&target, Duration::from_secs(5)).unwrap();

    let started = Instant::now();
    let result = manager.acquire(&target, Duration::from_millis(300));
    let elapsed = started.elapsed();

    let err = result.unwrap_err();
    assert!(matches!(err, LocklineError::LockError(_)));
    assert!(err.to_string().contains("locked by another process"));
    assert!(err.to_string().contains("queue.log"));

    // Deterministic timeout: fails within T + one poll interval or so.
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_millis(900));
}

#[test]
fn release_removes_marker_and_allows_reacquisition() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("queue.log");
    let manager = LockManager::default();

    let mut lock = manager.acquire(&target, Duration::from_secs(5)).unwrap();
    let marker = marker_path(&target);
    assert!(marker.exists());

    lock.release().unwrap();
    assert!(!lock.is_held());
    assert!(!marker.exists());

    // A fresh competitor can now take the lock immediately.
    let _second = manager.acquire(&target, Duration::from_millis(200)).unwrap();
}

#[test]
fn drop_releases_marker() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("queue.log");
    let marker = marker_path(&target);
    let manager = LockManager::default();

    {
        let _lock = manager.acquire(&target, Duration::from_secs(5)).unwrap();
        assert!(marker.exists());
    }

    assert!(!marker.exists());
}

#[test]
fn release_is_idempotent_when_marker_already_gone() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("queue.log");
    let manager = LockManager::default();

    let mut lock = manager.acquire(&target, Duration::from_secs(5)).unwrap();

    // Another party reclaimed the marker as stale behind our back.
    fs::remove_file(marker_path(&target)).unwrap();

    lock.release().unwrap();
    assert!(!lock.is_held());

    // Releasing an already-unheld handle is also a no-op.
    lock.release().unwrap();
}

#[test]
fn reacquire_is_noop_while_held() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("queue.log");
    let manager = LockManager::default();

    let mut lock = manager.acquire(&target, Duration::from_secs(5)).unwrap();
    let marker_before = lock.marker_path().unwrap().to_path_buf();

    manager.reacquire(&mut lock, Duration::from_secs(5)).unwrap();

    assert!(lock.is_held());
    assert_eq!(lock.marker_path().unwrap(), marker_before.as_path());
}

#[test]
fn reacquire_regains_lock_after_release() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("queue.log");
    let manager = LockManager::default();

    let mut lock = manager.acquire(&target, Duration::from_secs(5)).unwrap();
    lock.release().unwrap();
    assert!(!lock.is_held());

    manager.reacquire(&mut lock, Duration::from_secs(5)).unwrap();

    assert!(lock.is_held());
    assert!(marker_path(&target).exists());
}

#[test]
fn dead_owner_marker_is_reclaimed() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("queue.log");
    let marker = marker_path(&target);
    let manager = LockManager::default();

    // Linux caps pids well below this, so the owner cannot exist.
    write_marker(&marker, &descriptor_for(999_999, Some("ghost")));

    let started = Instant::now();
    let lock = manager.acquire(&target, Duration::from_secs(5)).unwrap();

    // Reclaimed within one retry, no poll sleep needed.
    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(lock.is_held());

    let descriptor = LockDescriptor::from_file(&marker).unwrap();
    assert_eq!(descriptor.owner_pid, std::process::id());
}

#[test]
fn corrupt_marker_is_reclaimed() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("queue.log");
    let marker = marker_path(&target);
    let manager = LockManager::default();

    // A half-written marker is assumed abandoned.
    fs::write(&marker, "{truncated").unwrap();
    assert!(manager.is_stale(&marker));

    let lock = manager.acquire(&target, Duration::from_secs(5)).unwrap();
    assert!(lock.is_held());
}

#[test]
fn pid_reuse_marker_is_stale() {
    let temp_dir = TempDir::new().unwrap();
    let marker = temp_dir.path().join("queue.log.lock");

    // The owner pid is alive (it is us), but the recorded name belongs to
    // a process that no longer exists under that id.
    write_marker(
        &marker,
        &descriptor_for(std::process::id(), Some("some-departed-process")),
    );

    let manager = LockManager::with_inspector(
        LockOptions::default(),
        Box::new(FixedInspector { name: "current" }),
    );
    assert!(manager.is_stale(&marker));
}

#[test]
fn pid_reuse_marker_is_reclaimed_with_real_inspector() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("queue.log");
    let marker = marker_path(&target);
    let manager = LockManager::default();

    // Our own pid, but a name the test binary cannot have.
    write_marker(
        &marker,
        &descriptor_for(std::process::id(), Some("zz-no-such-binary-zz")),
    );

    let lock = manager.acquire(&target, Duration::from_secs(5)).unwrap();
    assert!(lock.is_held());
}

#[test]
fn live_marker_with_matching_name_is_not_stale() {
    let temp_dir = TempDir::new().unwrap();
    let marker = temp_dir.path().join("queue.log.lock");

    write_marker(&marker, &descriptor_for(std::process::id(), Some("current")));

    let manager = LockManager::with_inspector(
        LockOptions::default(),
        Box::new(FixedInspector { name: "current" }),
    );
    assert!(!manager.is_stale(&marker));
}

#[test]
fn inconclusive_inspection_favors_not_stale() {
    let temp_dir = TempDir::new().unwrap();
    let marker = temp_dir.path().join("queue.log.lock");

    // Owner is alive, a name is recorded, but the inspector cannot observe
    // anything. No positive evidence of reuse, so the lock stays live.
    write_marker(&marker, &descriptor_for(std::process::id(), Some("holder")));

    let manager =
        LockManager::with_inspector(LockOptions::default(), Box::new(BlindInspector));
    assert!(!manager.is_stale(&marker));
}

#[test]
fn marker_without_recorded_name_is_not_stale_while_owner_lives() {
    let temp_dir = TempDir::new().unwrap();
    let marker = temp_dir.path().join("queue.log.lock");

    write_marker(&marker, &descriptor_for(std::process::id(), None));

    let manager = LockManager::default();
    assert!(!manager.is_stale(&marker));
}

#[test]
fn age_ceiling_overrides_liveness() {
    let temp_dir = TempDir::new().unwrap();
    let marker = temp_dir.path().join("queue.log.lock");

    let mut descriptor = descriptor_for(std::process::id(), None);
    descriptor.acquired_at = Utc::now() - ChronoDuration::minutes(10);
    write_marker(&marker, &descriptor);

    let fresh = LockManager::default();
    assert!(!fresh.is_stale(&marker));

    let capped = LockManager::new(LockOptions {
        stale_after: Some(Duration::from_secs(60)),
        ..LockOptions::default()
    });
    assert!(capped.is_stale(&marker));
}

#[test]
fn stale_marker_older_than_ceiling_is_reclaimed_on_acquire() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("queue.log");
    let marker = marker_path(&target);

    let mut descriptor = descriptor_for(std::process::id(), None);
    descriptor.acquired_at = Utc::now() - ChronoDuration::hours(2);
    write_marker(&marker, &descriptor);

    let manager = LockManager::new(LockOptions {
        stale_after: Some(Duration::from_secs(300)),
        ..LockOptions::default()
    });

    let lock = manager.acquire(&target, Duration::from_secs(5)).unwrap();
    assert!(lock.is_held());
}

#[test]
fn concurrent_acquirers_are_mutually_exclusive() {
    let temp_dir = TempDir::new().unwrap();
    let target = Arc::new(temp_dir.path().join("queue.log"));
    let holders = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let target = Arc::clone(&target);
            let holders = Arc::clone(&holders);
            std::thread::spawn(move || {
                let manager = LockManager::default();
                let mut lock = manager.acquire(&target, Duration::from_secs(30)).unwrap();

                // At most one thread may be inside the critical section.
                let inside = holders.fetch_add(1, Ordering::SeqCst);
                assert_eq!(inside, 0, "two holders at once");
                std::thread::sleep(Duration::from_millis(10));
                holders.fetch_sub(1, Ordering::SeqCst);

                lock.release().unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(!marker_path(&target).exists());
}

#[test]
fn two_sequential_acquires_never_both_hold() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("queue.log");
    let manager = LockManager::default();

    let first = manager.acquire(&target, Duration::from_secs(5)).unwrap();
    assert!(manager.acquire(&target, Duration::from_millis(150)).is_err());
    drop(first);

    let second = manager.acquire(&target, Duration::from_millis(500)).unwrap();
    assert!(second.is_held());
}

#[test]
fn acquire_creates_missing_parent_directory() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("nested").join("dir").join("queue.log");
    let manager = LockManager::default();

    let lock = manager.acquire(&target, Duration::from_secs(5)).unwrap();
    assert!(lock.is_held());
    assert!(marker_path(&target).exists());
}
