//! Command implementations for lockline.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

use crate::cli::{AppendArgs, ClearArgs, Command, DrainArgs, StatusArgs};
use lockline::error::{LocklineError, Result};
use lockline::journal;
use lockline::lock::{LockDescriptor, LockManager, marker_path};
use serde_json::Value;
use std::fs;
use std::time::Duration;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Status(args) => cmd_status(args),
        Command::Clear(args) => cmd_clear(args),
        Command::Append(args) => cmd_append(args),
        Command::Drain(args) => cmd_drain(args),
    }
}

/// Report the lock state of a target path.
fn cmd_status(args: StatusArgs) -> Result<()> {
    let marker = marker_path(&args.path);

    if !marker.exists() {
        println!("{}: not locked", args.path.display());
        return Ok(());
    }

    println!("{}: locked", args.path.display());
    println!("  marker:   {}", marker.display());

    // A marker that cannot be parsed is the canonical stale case (a
    // corrupt or half-written descriptor is assumed abandoned), so report
    // it rather than failing the status query.
    match LockDescriptor::from_file(&marker) {
        Ok(descriptor) => {
            let manager = LockManager::default();
            let stale = manager.is_stale(&marker);

            println!(
                "  owner:    pid {} on {}",
                descriptor.owner_pid, descriptor.host_id
            );
            if let Some(name) = &descriptor.process_name {
                println!("  process:  {}", name);
            }
            println!("  age:      {}", descriptor.age_string());
            println!("  stale:    {}", if stale { "yes" } else { "no" });
        }
        Err(_) => {
            println!("  owner:    unknown (descriptor unreadable)");
            println!("  stale:    yes");
        }
    }

    Ok(())
}

/// Force-remove a marker file.
fn cmd_clear(args: ClearArgs) -> Result<()> {
    let marker = marker_path(&args.path);

    if !marker.exists() {
        return Err(LocklineError::UserError(format!(
            "'{}' is not locked (no marker at {})",
            args.path.display(),
            marker.display()
        )));
    }

    // Show who we are evicting, when the marker is readable.
    if let Ok(descriptor) = LockDescriptor::from_file(&marker) {
        println!(
            "Clearing lock held by pid {} on {} ({} old)",
            descriptor.owner_pid,
            descriptor.host_id,
            descriptor.age_string()
        );
    }

    fs::remove_file(&marker).map_err(|e| {
        LocklineError::UserError(format!(
            "failed to clear marker '{}': {}",
            marker.display(),
            e
        ))
    })?;

    println!("Cleared {}", marker.display());
    Ok(())
}

/// Append one record to a journal.
fn cmd_append(args: AppendArgs) -> Result<()> {
    let record: Value = serde_json::from_str(&args.record)
        .map_err(|e| LocklineError::UserError(format!("record is not valid JSON: {}", e)))?;

    journal::append_with(
        &LockManager::default(),
        &args.path,
        &record,
        args.dry_run,
        Duration::from_millis(args.timeout_ms),
    )?;

    if args.dry_run {
        println!("Dry run: would append 1 record to {}", args.path.display());
    } else {
        println!("Appended 1 record to {}", args.path.display());
    }
    Ok(())
}

/// Drain a journal, printing each record to stdout.
fn cmd_drain(args: DrainArgs) -> Result<()> {
    let mut count = 0usize;
    journal::drain_with(
        &LockManager::default(),
        &args.path,
        args.dry_run,
        Duration::from_millis(args.timeout_ms),
        |record: Value| {
            println!("{}", record);
            count += 1;
            Ok(())
        },
    )?;

    if args.dry_run {
        eprintln!("Dry run: {} record(s) left in {}", count, args.path.display());
    } else {
        eprintln!("Drained {} record(s) from {}", count, args.path.display());
    }
    Ok(())
}
