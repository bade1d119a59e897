//! Windows process termination.
//!
//! - `taskkill /PID xxx`: graceful request (sends WM_CLOSE)
//! - `TerminateProcess`: forced termination

use std::time::Duration;

use tracing::{debug, warn};
use windows::Win32::Foundation::{CloseHandle, E_ACCESSDENIED, E_INVALIDARG};
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, TerminateProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    PROCESS_TERMINATE,
};

use crate::adapters::command::run_command;
use crate::domain::{TerminationFailure, TerminationMode};
use crate::ports::ProcessTerminatorPort;

/// Exit code reported for a process that has not exited yet.
const STILL_ACTIVE: u32 = 259;

/// Windows process terminator.
pub struct WindowsTerminator {
    timeout: Duration,
}

impl WindowsTerminator {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn taskkill(&self, pid: u32) -> Result<(), TerminationFailure> {
        let pid_arg = pid.to_string();
        let output = run_command("taskkill", &["/PID", pid_arg.as_str()], self.timeout)
            .await
            .map_err(|e| TerminationFailure::Platform {
                pid,
                detail: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let combined = format!(
            "{} {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        if combined.contains("not found") || combined.contains("could not be found") {
            return Err(TerminationFailure::NotFound { pid });
        }
        if combined.contains("Access is denied") || combined.contains("access denied") {
            warn!(pid, "Access denied to terminate process");
            return Err(TerminationFailure::PermissionDenied { pid });
        }

        Err(TerminationFailure::Platform {
            pid,
            detail: combined.trim().to_string(),
        })
    }
}

fn terminate_process(pid: u32) -> Result<(), TerminationFailure> {
    let failure = |e: windows::core::Error| {
        if e.code() == E_ACCESSDENIED {
            TerminationFailure::PermissionDenied { pid }
        } else if e.code() == E_INVALIDARG {
            // OpenProcess rejects PIDs that no longer exist
            TerminationFailure::NotFound { pid }
        } else {
            TerminationFailure::Platform {
                pid,
                detail: e.to_string(),
            }
        }
    };

    unsafe {
        let handle = OpenProcess(PROCESS_TERMINATE, false, pid).map_err(failure)?;
        let result = TerminateProcess(handle, 1);
        let _ = CloseHandle(handle);
        result.map_err(failure)
    }
}

fn process_alive(pid: u32) -> bool {
    unsafe {
        let handle = match OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) {
            Ok(handle) => handle,
            // Protected processes refuse the handle but still exist
            Err(e) => return e.code() == E_ACCESSDENIED,
        };

        let mut code = 0u32;
        let result = GetExitCodeProcess(handle, &mut code);
        let _ = CloseHandle(handle);
        result.is_ok() && code == STILL_ACTIVE
    }
}

impl ProcessTerminatorPort for WindowsTerminator {
    async fn is_alive(&self, pid: u32) -> bool {
        pid != 0 && process_alive(pid)
    }

    async fn send_termination(
        &self,
        pid: u32,
        mode: TerminationMode,
    ) -> Result<(), TerminationFailure> {
        if pid == 0 {
            return Err(TerminationFailure::NotFound { pid });
        }

        debug!(pid, ?mode, "Terminating process");
        match mode {
            TerminationMode::Graceful => self.taskkill(pid).await,
            TerminationMode::Force => terminate_process(pid),
        }
    }
}
