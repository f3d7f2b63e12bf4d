//! Error types for lockline.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for lockline operations.
///
/// Only two failure modes are expected to reach a caller in normal use:
/// framing violations and lock-acquisition timeouts. Everything else
/// (corrupt markers, failed process probes, malformed journal lines) is
/// handled locally in favor of forward progress.
#[derive(Error, Debug)]
pub enum LocklineError {
    /// User provided invalid input or an unexpected I/O failure occurred.
    #[error("{0}")]
    UserError(String),

    /// A record's serialized form would corrupt the line-delimited framing.
    #[error("JSONL framing violation: {0}")]
    FramingError(String),

    /// Lock could not be acquired.
    #[error("Lock acquisition failed: {0}")]
    LockError(String),
}

impl LocklineError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LocklineError::UserError(_) => exit_codes::USER_ERROR,
            LocklineError::FramingError(_) => exit_codes::FRAMING_VIOLATION,
            LocklineError::LockError(_) => exit_codes::LOCK_FAILURE,
        }
    }
}

/// Result type alias for lockline operations.
pub type Result<T> = std::result::Result<T, LocklineError>;
