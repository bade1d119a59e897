//! macOS socket table reader using lsof.

use std::time::Duration;

use tracing::debug;

use crate::adapters::command::run_command;
use crate::adapters::parse::parse_lsof_sockets;
use crate::domain::SocketEntry;
use crate::error::{Error, Result};
use crate::ports::SocketTablePort;

/// macOS-specific socket table reader.
pub struct DarwinSocketTable {
    timeout: Duration,
}

impl DarwinSocketTable {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl SocketTablePort for DarwinSocketTable {
    /// Executes: `lsof -nP -i`
    ///
    /// Flags:
    /// - -n: Show IP addresses (don't resolve to hostnames)
    /// - -P: Show port numbers (don't resolve to service names)
    /// - -i: Every internet socket, TCP and UDP, in any state
    async fn read_sockets(&self) -> Result<Vec<SocketEntry>> {
        let output = run_command("/usr/sbin/lsof", &["-nP", "-i"], self.timeout).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        // lsof exits 1 both when nothing matches and when some rows were unreadable
        if stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !output.status.success() && !stderr.trim().is_empty() {
                return Err(Error::CommandFailed(format!("lsof failed: {}", stderr.trim())));
            }
            return Ok(Vec::new());
        }

        let entries = parse_lsof_sockets(&stdout);
        debug!(count = entries.len(), "Read socket table");
        Ok(entries)
    }
}
