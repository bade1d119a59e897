//! Bounded execution of external tools.

#![cfg_attr(not(any(target_os = "macos", target_os = "windows")), allow(dead_code))]

use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Run `program` with `args`, killing it if it outlives `timeout`.
///
/// A non-zero exit status is not an error here: `lsof` exits 1 when nothing
/// matches, so callers decide what the status means.
pub async fn run_command(program: &str, args: &[&str], timeout: Duration) -> Result<Output> {
    trace!(program, ?args, "Running external command");

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(timeout, child).await {
        Ok(Ok(output)) => {
            debug!(program, status = %output.status, "External command finished");
            Ok(output)
        }
        Ok(Err(e)) => Err(Error::CommandFailed(format!("{}: {}", program, e))),
        Err(_) => Err(Error::Timeout {
            operation: program.to_string(),
            elapsed: timeout,
        }),
    }
}

/// Bounds how many external tools run at once.
///
/// The timeout starts once a permit is held, so queued invocations do not
/// eat into each other's deadline.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub struct CommandPool {
    permits: Semaphore,
    timeout: Duration,
}

#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
impl CommandPool {
    pub fn new(limit: usize, timeout: Duration) -> Self {
        Self {
            permits: Semaphore::new(limit.max(1)),
            timeout,
        }
    }

    pub async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| Error::CommandFailed(format!("{}: {}", program, e)))?;

        run_command(program, args, self.timeout).await
    }
}
