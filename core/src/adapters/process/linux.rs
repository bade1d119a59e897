//! Linux process metadata using procfs.

use std::time::Duration;

use nix::unistd::{Uid, User};
use procfs::process::Process;
use procfs::ProcError;
use tracing::{debug, trace};

use crate::domain::{MetadataField, MetadataIssue, ProcessLink, ProcessMetadata};
use crate::ports::ProcessMetadataPort;

use super::basename;

/// The kernel truncates `comm` to this many bytes.
const COMM_LEN: usize = 15;

const DELETED_SUFFIX: &str = " (deleted)";

/// Linux-specific process metadata resolver.
pub struct LinuxProcessMetadata {
    timeout: Duration,
}

impl LinuxProcessMetadata {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run a procfs lookup off the async runtime, bounded by the timeout.
    async fn blocking<T, F>(&self, pid: u32, lookup: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        match tokio::time::timeout(self.timeout, tokio::task::spawn_blocking(lookup)).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                debug!(pid, error = %e, "procfs lookup task failed");
                None
            }
            Err(_) => {
                debug!(pid, "procfs lookup timed out");
                None
            }
        }
    }
}

impl ProcessMetadataPort for LinuxProcessMetadata {
    async fn resolve(&self, pid: u32) -> ProcessMetadata {
        let timeout = self.timeout;
        self.blocking(pid, move || read_metadata(pid))
            .await
            .unwrap_or_else(|| {
                let mut metadata = ProcessMetadata::default();
                for field in [MetadataField::ProcessName, MetadataField::ExePath, MetadataField::User] {
                    metadata.note(MetadataIssue::Unavailable {
                        field,
                        reason: format!("no answer within {:?}", timeout),
                    });
                }
                metadata
            })
    }

    async fn parent(&self, pid: u32) -> Option<ProcessLink> {
        self.blocking(pid, move || read_parent(pid)).await.flatten()
    }

    async fn control_groups(&self, pid: u32) -> Option<String> {
        tokio::fs::read_to_string(format!("/proc/{}/cgroup", pid))
            .await
            .ok()
    }
}

fn is_gone(error: &ProcError) -> bool {
    matches!(error, ProcError::NotFound(_))
}

fn issue_for(field: MetadataField, error: &ProcError) -> MetadataIssue {
    match error {
        ProcError::PermissionDenied(_) => MetadataIssue::AccessDenied(field),
        other => MetadataIssue::Unavailable {
            field,
            reason: other.to_string(),
        },
    }
}

fn read_metadata(pid: u32) -> ProcessMetadata {
    let Ok(raw_pid) = i32::try_from(pid) else {
        return ProcessMetadata::exited();
    };

    let process = match Process::new(raw_pid) {
        Ok(process) => process,
        Err(_) => return ProcessMetadata::exited(),
    };

    let mut metadata = ProcessMetadata::default();

    let comm = match process.stat() {
        Ok(stat) if stat.state == 'Z' => return ProcessMetadata::exited(),
        Ok(stat) => Some(stat.comm),
        Err(e) if is_gone(&e) => return ProcessMetadata::exited(),
        Err(e) => {
            metadata.note(issue_for(MetadataField::ProcessName, &e));
            None
        }
    };

    match process.exe() {
        Ok(path) => {
            let path = path.to_string_lossy().into_owned();
            if path.ends_with(DELETED_SUFFIX) {
                metadata.note(MetadataIssue::ExecutableDeleted);
            } else {
                metadata.exe_path = Some(path);
            }
        }
        // Kernel threads have no executable
        Err(ProcError::NotFound(_)) if process.is_alive() => {}
        Err(e) if is_gone(&e) => return ProcessMetadata::exited(),
        Err(e) => metadata.note(issue_for(MetadataField::ExePath, &e)),
    }

    metadata.process_name = comm.map(|comm| full_name(comm, metadata.exe_path.as_deref()));

    match process.uid() {
        Ok(uid) => match User::from_uid(Uid::from_raw(uid)) {
            Ok(Some(user)) => metadata.user = Some(user.name),
            Ok(None) => metadata.note(MetadataIssue::Unavailable {
                field: MetadataField::User,
                reason: format!("uid {} has no account name", uid),
            }),
            Err(e) => metadata.note(MetadataIssue::Unavailable {
                field: MetadataField::User,
                reason: e.to_string(),
            }),
        },
        Err(e) if is_gone(&e) => return ProcessMetadata::exited(),
        Err(e) => metadata.note(issue_for(MetadataField::User, &e)),
    }

    // The PID may have exited while its files were being read
    if !process.is_alive() {
        return ProcessMetadata::exited();
    }

    trace!(pid, name = ?metadata.process_name, "Resolved process metadata");
    metadata
}

/// Undo the kernel's truncation of `comm` when the executable name extends it.
fn full_name(comm: String, exe_path: Option<&str>) -> String {
    if comm.len() == COMM_LEN {
        if let Some(exe) = exe_path.map(basename) {
            if exe.starts_with(&comm) {
                return exe.to_string();
            }
        }
    }
    comm
}

fn read_parent(pid: u32) -> Option<ProcessLink> {
    let stat = Process::new(i32::try_from(pid).ok()?).ok()?.stat().ok()?;
    if stat.ppid <= 0 {
        return None;
    }

    let parent = Process::new(stat.ppid).ok()?.stat().ok()?;
    Some(ProcessLink::new(stat.ppid as u32, parent.comm))
}
