//! Linux socket table reader using procfs.
//!
//! Rows come from `/proc/net/{tcp,tcp6,udp,udp6}` and are attributed to PIDs
//! by matching their inode against the `socket:[inode]` links under
//! `/proc/<pid>/fd`.

use std::collections::HashMap;
use std::time::Duration;

use procfs::net::TcpState;
use procfs::process::{all_processes, FDTarget};
use tracing::{debug, trace, warn};

use crate::domain::{Protocol, SocketEntry};
use crate::error::{Error, Result};
use crate::ports::SocketTablePort;

/// Linux-specific socket table reader.
pub struct LinuxSocketTable {
    timeout: Duration,
}

impl LinuxSocketTable {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl SocketTablePort for LinuxSocketTable {
    async fn read_sockets(&self) -> Result<Vec<SocketEntry>> {
        let task = tokio::task::spawn_blocking(scan_procfs);

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(Error::Procfs(format!("socket scan task failed: {}", e))),
            Err(_) => Err(Error::Timeout {
                operation: "/proc/net socket scan".to_string(),
                elapsed: self.timeout,
            }),
        }
    }
}

/// Map every socket inode to the PIDs holding a descriptor for it.
///
/// A socket inherited across `fork` is held by several processes.
fn socket_owners() -> HashMap<u64, Vec<u32>> {
    let mut owners: HashMap<u64, Vec<u32>> = HashMap::new();

    let processes = match all_processes() {
        Ok(processes) => processes,
        Err(e) => {
            warn!(error = %e, "Cannot list processes, no socket can be attributed");
            return owners;
        }
    };

    for process in processes.flatten() {
        let pid = process.pid;
        if pid <= 0 {
            continue;
        }

        // Descriptors of other users' processes are unreadable without privilege
        let Ok(fds) = process.fd() else {
            continue;
        };

        for fd in fds.flatten() {
            if let FDTarget::Socket(inode) = fd.target {
                let pids = owners.entry(inode).or_default();
                if !pids.contains(&(pid as u32)) {
                    pids.push(pid as u32);
                }
            }
        }
    }

    owners
}

fn scan_procfs() -> Result<Vec<SocketEntry>> {
    let owners = socket_owners();
    let mut entries = Vec::new();
    let mut readable = 0;

    let mut push = |port: u16, protocol: Protocol, inode: u64, listening: bool| {
        if port == 0 || inode == 0 {
            return;
        }
        match owners.get(&inode) {
            Some(pids) => {
                for &pid in pids {
                    entries.push(SocketEntry::new(port, protocol, pid, listening));
                }
            }
            None => trace!(port, %protocol, inode, "Skipping socket with no visible owner"),
        }
    };

    for (table, rows) in [("tcp", procfs::net::tcp()), ("tcp6", procfs::net::tcp6())] {
        match rows {
            Ok(rows) => {
                readable += 1;
                for row in rows {
                    let listening = matches!(row.state, TcpState::Listen);
                    push(row.local_address.port(), Protocol::Tcp, row.inode, listening);
                }
            }
            Err(e) => debug!(table, error = %e, "Socket table unreadable"),
        }
    }

    for (table, rows) in [("udp", procfs::net::udp()), ("udp6", procfs::net::udp6())] {
        match rows {
            Ok(rows) => {
                readable += 1;
                for row in rows {
                    // An unconnected UDP socket has no remote port
                    let listening = row.remote_address.port() == 0;
                    push(row.local_address.port(), Protocol::Udp, row.inode, listening);
                }
            }
            Err(e) => debug!(table, error = %e, "Socket table unreadable"),
        }
    }

    if readable == 0 {
        return Err(Error::Procfs(
            "none of /proc/net/{tcp,tcp6,udp,udp6} could be read".to_string(),
        ));
    }

    debug!(count = entries.len(), "Read socket table");
    Ok(entries)
}
