//! Windows socket table reader using netstat.

use std::time::Duration;

use tracing::debug;

use crate::adapters::command::run_command;
use crate::adapters::parse::parse_netstat_sockets;
use crate::domain::SocketEntry;
use crate::error::{Error, Result};
use crate::ports::SocketTablePort;

/// Windows-specific socket table reader.
pub struct WindowsSocketTable {
    timeout: Duration,
}

impl WindowsSocketTable {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl SocketTablePort for WindowsSocketTable {
    async fn read_sockets(&self) -> Result<Vec<SocketEntry>> {
        let output = run_command("netstat", &["-ano"], self.timeout).await?;

        if !output.status.success() {
            return Err(Error::CommandFailed(format!(
                "netstat -ano failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let entries = parse_netstat_sockets(&String::from_utf8_lossy(&output.stdout));
        debug!(count = entries.len(), "Read socket table");
        Ok(entries)
    }
}
