//! Exit code constants for the lockline CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unexpected I/O failure)
//! - 2: JSONL framing violation
//! - 3: Lock acquisition failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid input, or unexpected I/O failure.
pub const USER_ERROR: i32 = 1;

/// A record's serialized form would corrupt JSONL framing.
pub const FRAMING_VIOLATION: i32 = 2;

/// Lock acquisition failure: the target is held by another process.
pub const LOCK_FAILURE: i32 = 3;
