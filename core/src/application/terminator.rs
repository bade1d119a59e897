//! Process termination application service.

use tracing::{debug, warn};

use crate::domain::{TerminationFailure, TerminationMode, TerminationOutcome};
use crate::ports::ProcessTerminatorPort;

/// Application service for stopping processes.
///
/// Each request checks liveness, then issues exactly one termination call.
/// There is no escalation from graceful to forced and no retry.
pub struct ProcessTerminator<K> {
    terminator: K,
}

impl<K: ProcessTerminatorPort> ProcessTerminator<K> {
    pub fn new(terminator: K) -> Self {
        Self { terminator }
    }

    /// Terminate `pid`, reporting the outcome as data.
    pub async fn terminate(&self, pid: u32, force: bool) -> TerminationOutcome {
        let mode = TerminationMode::from_force(force);

        match self.try_terminate(pid, mode).await {
            Ok(()) => {
                debug!(pid, ?mode, "Termination request accepted");
                TerminationOutcome::terminated(pid, mode)
            }
            Err(failure) => {
                warn!(pid, ?mode, %failure, "Termination request failed");
                TerminationOutcome::failed(&failure)
            }
        }
    }

    pub async fn try_terminate(
        &self,
        pid: u32,
        mode: TerminationMode,
    ) -> Result<(), TerminationFailure> {
        if pid == 0 || !self.terminator.is_alive(pid).await {
            return Err(TerminationFailure::NotFound { pid });
        }

        self.terminator.send_termination(pid, mode).await
    }
}
