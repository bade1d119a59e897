//! Process terminator adapters.
//!
//! Platform-specific implementations of [`ProcessTerminatorPort`].

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

use std::time::Duration;

use crate::domain::{TerminationFailure, TerminationMode};
use crate::ports::ProcessTerminatorPort;

/// The process terminator for the current platform.
pub struct PlatformTerminator {
    #[cfg(unix)]
    inner: unix::UnixTerminator,

    #[cfg(windows)]
    inner: windows::WindowsTerminator,

    #[cfg(not(any(unix, windows)))]
    inner: super::unsupported::Unsupported,
}

impl PlatformTerminator {
    /// Create a terminator whose external tools are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            #[cfg(unix)]
            inner: {
                let _ = timeout;
                unix::UnixTerminator
            },

            #[cfg(windows)]
            inner: windows::WindowsTerminator::new(timeout),

            #[cfg(not(any(unix, windows)))]
            inner: {
                let _ = timeout;
                super::unsupported::Unsupported
            },
        }
    }
}

impl ProcessTerminatorPort for PlatformTerminator {
    async fn is_alive(&self, pid: u32) -> bool {
        self.inner.is_alive(pid).await
    }

    async fn send_termination(
        &self,
        pid: u32,
        mode: TerminationMode,
    ) -> Result<(), TerminationFailure> {
        self.inner.send_termination(pid, mode).await
    }
}
