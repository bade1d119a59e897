//! Unix process termination with signals.
//!
//! - SIGTERM (15): graceful termination request
//! - SIGKILL (9): immediate forced termination
//! - signal 0: existence probe

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::domain::{TerminationFailure, TerminationMode};
use crate::ports::ProcessTerminatorPort;

/// Signal-based terminator for Linux and macOS.
#[derive(Debug, Default)]
pub struct UnixTerminator;

/// Convert to a positive `Pid`.
///
/// 0 and values that wrap negative would address process groups.
fn target(pid: u32) -> Option<Pid> {
    i32::try_from(pid).ok().filter(|p| *p > 0).map(Pid::from_raw)
}

#[cfg(target_os = "linux")]
fn is_zombie(pid: u32) -> bool {
    procfs::process::Process::new(pid as i32)
        .map(|process| !process.is_alive())
        .unwrap_or(false)
}

#[cfg(not(target_os = "linux"))]
fn is_zombie(_pid: u32) -> bool {
    false
}

impl ProcessTerminatorPort for UnixTerminator {
    async fn is_alive(&self, pid: u32) -> bool {
        let Some(target) = target(pid) else {
            return false;
        };

        match kill(target, None) {
            Ok(()) => !is_zombie(pid),
            // Owned by another user, but present
            Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }

    async fn send_termination(
        &self,
        pid: u32,
        mode: TerminationMode,
    ) -> Result<(), TerminationFailure> {
        let Some(target) = target(pid) else {
            return Err(TerminationFailure::NotFound { pid });
        };

        let signal = match mode {
            TerminationMode::Graceful => Signal::SIGTERM,
            TerminationMode::Force => Signal::SIGKILL,
        };
        debug!(pid, ?signal, "Sending signal to process");

        match kill(target, signal) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => Err(TerminationFailure::NotFound { pid }),
            Err(Errno::EPERM) => {
                warn!(pid, "Permission denied to signal process");
                Err(TerminationFailure::PermissionDenied { pid })
            }
            Err(e) => Err(TerminationFailure::Platform {
                pid,
                detail: e.desc().to_string(),
            }),
        }
    }
}
