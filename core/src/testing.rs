//! In-memory implementations of the port traits for unit tests.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::domain::{
    ProcessLink, ProcessMetadata, SocketEntry, TerminationFailure, TerminationMode,
};
use crate::error::{Error, Result};
use crate::ports::{ProcessMetadataPort, ProcessTerminatorPort, SocketTablePort};

/// Socket table returning a fixed set of rows.
pub struct MockSocketTable {
    entries: Option<Vec<SocketEntry>>,
    reads: Mutex<usize>,
}

impl MockSocketTable {
    pub fn new(entries: Vec<SocketEntry>) -> Self {
        Self {
            entries: Some(entries),
            reads: Mutex::new(0),
        }
    }

    /// A table that cannot be read at all.
    pub fn unreadable() -> Self {
        Self {
            entries: None,
            reads: Mutex::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock()
    }
}

impl SocketTablePort for MockSocketTable {
    async fn read_sockets(&self) -> Result<Vec<SocketEntry>> {
        *self.reads.lock() += 1;
        self.entries
            .clone()
            .ok_or_else(|| Error::Procfs("socket table unavailable".to_string()))
    }
}

/// Resolver serving canned metadata and counting lookups per PID.
#[derive(Default)]
pub struct MockResolver {
    metadata: HashMap<u32, ProcessMetadata>,
    parents: HashMap<u32, ProcessLink>,
    cgroups: HashMap<u32, String>,
    resolutions: Mutex<HashMap<u32, usize>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process(mut self, pid: u32, name: &str, exe_path: &str, user: &str) -> Self {
        self.metadata.insert(
            pid,
            ProcessMetadata {
                process_name: Some(name.to_string()),
                exe_path: Some(exe_path.to_string()),
                user: Some(user.to_string()),
                issues: Vec::new(),
            },
        );
        self
    }

    pub fn with_metadata(mut self, pid: u32, metadata: ProcessMetadata) -> Self {
        self.metadata.insert(pid, metadata);
        self
    }

    pub fn with_parent(mut self, pid: u32, parent: u32, name: &str) -> Self {
        self.parents.insert(pid, ProcessLink::new(parent, name));
        self
    }

    pub fn with_cgroups(mut self, pid: u32, text: &str) -> Self {
        self.cgroups.insert(pid, text.to_string());
        self
    }

    pub fn resolutions(&self, pid: u32) -> usize {
        self.resolutions.lock().get(&pid).copied().unwrap_or(0)
    }
}

impl ProcessMetadataPort for MockResolver {
    async fn resolve(&self, pid: u32) -> ProcessMetadata {
        *self.resolutions.lock().entry(pid).or_insert(0) += 1;
        self.metadata
            .get(&pid)
            .cloned()
            .unwrap_or_else(ProcessMetadata::exited)
    }

    async fn parent(&self, pid: u32) -> Option<ProcessLink> {
        self.parents.get(&pid).cloned()
    }

    async fn control_groups(&self, pid: u32) -> Option<String> {
        self.cgroups.get(&pid).cloned()
    }
}

/// Terminator tracking which PIDs are alive and which signals were sent.
#[derive(Default)]
pub struct MockTerminator {
    alive: Mutex<HashSet<u32>>,
    protected: HashSet<u32>,
    sent: Mutex<Vec<(u32, TerminationMode)>>,
}

impl MockTerminator {
    pub fn new(alive: &[u32]) -> Self {
        Self {
            alive: Mutex::new(alive.iter().copied().collect()),
            ..Self::default()
        }
    }

    /// Mark `pid` as owned by another account.
    pub fn with_protected(mut self, pid: u32) -> Self {
        self.alive.lock().insert(pid);
        self.protected.insert(pid);
        self
    }

    pub fn sent(&self) -> Vec<(u32, TerminationMode)> {
        self.sent.lock().clone()
    }
}

impl ProcessTerminatorPort for MockTerminator {
    async fn is_alive(&self, pid: u32) -> bool {
        self.alive.lock().contains(&pid)
    }

    async fn send_termination(
        &self,
        pid: u32,
        mode: TerminationMode,
    ) -> std::result::Result<(), TerminationFailure> {
        self.sent.lock().push((pid, mode));

        if self.protected.contains(&pid) {
            return Err(TerminationFailure::PermissionDenied { pid });
        }
        if !self.alive.lock().remove(&pid) {
            return Err(TerminationFailure::NotFound { pid });
        }
        Ok(())
    }
}
