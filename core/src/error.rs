//! Error types for the portsight-core library.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for portsight operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading the socket table or loading configuration.
///
/// Per-process problems never show up here: they are folded into the
/// emitted records as remarks. Termination failures are reported through
/// [`crate::domain::TerminationFailure`].
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to execute a system command.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// Failed to parse command output.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// An operating-system call or external tool did not finish in time.
    #[error("Timed out after {elapsed:?} waiting for {operation}")]
    Timeout { operation: String, elapsed: Duration },

    /// The kernel's process filesystem could not be read.
    #[error("procfs error: {0}")]
    Procfs(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}
