//! Termination request outcomes.
//!
//! Hosting UIs only see `{ success, message }` and decide what to offer the
//! operator (retry, elevate privileges) by looking for fixed markers in the
//! message. Those markers are part of the wire contract: changing the wording
//! of [`TerminationFailure`] breaks existing callers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Substring present in every "process does not exist" message.
pub const NOT_FOUND_MARKER: &str = "not found";

/// Substring present in every "insufficient privilege" message.
pub const PERMISSION_DENIED_MARKER: &str = "permission denied";

/// Substring present in every unexpected OS failure message.
pub const PLATFORM_ERROR_MARKER: &str = "platform error";

/// How a process should be asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationMode {
    /// Cooperative request (SIGTERM, `taskkill` without `/F`).
    Graceful,
    /// Unconditional kill (SIGKILL, `TerminateProcess`).
    Force,
}

impl TerminationMode {
    pub fn from_force(force: bool) -> Self {
        if force {
            TerminationMode::Force
        } else {
            TerminationMode::Graceful
        }
    }
}

/// Why a termination request did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TerminationFailure {
    #[error("Process {pid} not found")]
    NotFound { pid: u32 },

    #[error("Process not found: nothing is listening on port {port}")]
    NoListener { port: u16 },

    #[error("Failed to terminate process {pid} - permission denied. Try running with elevated privileges.")]
    PermissionDenied { pid: u32 },

    #[error("Failed to terminate process {pid}: platform error: {detail}")]
    Platform { pid: u32, detail: String },
}

impl TerminationFailure {
    pub fn category(&self) -> OutcomeCategory {
        match self {
            TerminationFailure::NotFound { .. } | TerminationFailure::NoListener { .. } => {
                OutcomeCategory::NotFound
            }
            TerminationFailure::PermissionDenied { .. } => OutcomeCategory::PermissionDenied,
            TerminationFailure::Platform { .. } => OutcomeCategory::PlatformError,
        }
    }
}

/// Coarse classification of an outcome, recoverable from its message alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeCategory {
    Success,
    NotFound,
    PermissionDenied,
    PlatformError,
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            OutcomeCategory::Success => "success",
            OutcomeCategory::NotFound => NOT_FOUND_MARKER,
            OutcomeCategory::PermissionDenied => PERMISSION_DENIED_MARKER,
            OutcomeCategory::PlatformError => PLATFORM_ERROR_MARKER,
        };
        f.write_str(text)
    }
}

/// Result of one termination request, as sent to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationOutcome {
    pub success: bool,
    pub message: String,
}

impl TerminationOutcome {
    /// The OS accepted the request for `pid`.
    pub fn terminated(pid: u32, mode: TerminationMode) -> Self {
        let message = match mode {
            TerminationMode::Graceful => format!("Sent termination request to process {}", pid),
            TerminationMode::Force => format!("Process {} force terminated", pid),
        };
        Self {
            success: true,
            message,
        }
    }

    pub fn failed(failure: &TerminationFailure) -> Self {
        Self {
            success: false,
            message: failure.to_string(),
        }
    }

    /// Classify this outcome the way a caller holding only the wire form would.
    pub fn category(&self) -> OutcomeCategory {
        if self.success {
            return OutcomeCategory::Success;
        }

        let message = self.message.to_lowercase();
        if message.contains(PLATFORM_ERROR_MARKER) {
            OutcomeCategory::PlatformError
        } else if message.contains(PERMISSION_DENIED_MARKER) {
            OutcomeCategory::PermissionDenied
        } else if message.contains(NOT_FOUND_MARKER) {
            OutcomeCategory::NotFound
        } else {
            OutcomeCategory::PlatformError
        }
    }
}

impl From<&TerminationFailure> for TerminationOutcome {
    fn from(failure: &TerminationFailure) -> Self {
        Self::failed(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages_carry_markers() {
        let failures = [
            TerminationFailure::NotFound { pid: 1234 },
            TerminationFailure::NoListener { port: 3000 },
            TerminationFailure::PermissionDenied { pid: 1 },
            TerminationFailure::Platform {
                pid: 5,
                detail: "Access is denied to the object not found".to_string(),
            },
        ];

        for failure in &failures {
            let outcome = TerminationOutcome::failed(failure);
            assert!(!outcome.success);
            assert_eq!(outcome.category(), failure.category(), "{}", outcome.message);
        }
    }

    #[test]
    fn test_success_names_pid() {
        let outcome = TerminationOutcome::terminated(4321, TerminationMode::Force);
        assert!(outcome.success);
        assert!(outcome.message.contains("4321"));
        assert_eq!(outcome.category(), OutcomeCategory::Success);

        let outcome = TerminationOutcome::terminated(4321, TerminationMode::Graceful);
        assert!(outcome.message.contains("4321"));
    }

    #[test]
    fn test_permission_message_is_stable() {
        let outcome = TerminationOutcome::failed(&TerminationFailure::PermissionDenied { pid: 1 });
        assert_eq!(
            outcome.message,
            "Failed to terminate process 1 - permission denied. Try running with elevated privileges."
        );
    }

    #[test]
    fn test_wire_shape() {
        let outcome = TerminationOutcome::failed(&TerminationFailure::NotFound { pid: 9 });
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"success":false,"message":"Process 9 not found"}"#);
    }

    #[test]
    fn test_unrecognised_failure_is_platform_error() {
        let outcome = TerminationOutcome {
            success: false,
            message: "something odd happened".to_string(),
        };
        assert_eq!(outcome.category(), OutcomeCategory::PlatformError);
    }
}
