//! Process terminator port (interface).

use crate::domain::{TerminationFailure, TerminationMode};

/// Port for stopping processes.
///
/// Implementations handle platform-specific signal or handle semantics.
pub trait ProcessTerminatorPort: Send + Sync {
    /// Check whether `pid` currently refers to a live process.
    ///
    /// A process owned by another user is still alive.
    fn is_alive(&self, pid: u32) -> impl std::future::Future<Output = bool> + Send;

    /// Issue exactly one termination request to `pid`.
    fn send_termination(
        &self,
        pid: u32,
        mode: TerminationMode,
    ) -> impl std::future::Future<Output = Result<(), TerminationFailure>> + Send;
}
