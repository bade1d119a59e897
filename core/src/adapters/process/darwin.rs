//! macOS process metadata using libproc.

use libproc::libproc::bsd_info::BSDInfo;
use libproc::libproc::proc_pid::{name, pidinfo, pidpath};
use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::{Pid, Uid, User};
use tracing::trace;

use crate::domain::{MetadataField, MetadataIssue, ProcessLink, ProcessMetadata};
use crate::ports::ProcessMetadataPort;

use super::basename;

/// macOS-specific process metadata resolver.
pub struct DarwinProcessMetadata;

impl ProcessMetadataPort for DarwinProcessMetadata {
    async fn resolve(&self, pid: u32) -> ProcessMetadata {
        let Ok(raw_pid) = i32::try_from(pid) else {
            return ProcessMetadata::exited();
        };
        if !exists(raw_pid) {
            return ProcessMetadata::exited();
        }

        let mut metadata = ProcessMetadata::default();

        match pidpath(raw_pid) {
            Ok(path) if !path.is_empty() => metadata.exe_path = Some(path),
            Ok(_) => metadata.note(MetadataIssue::ExecutableDeleted),
            Err(e) => metadata.note(issue_for(MetadataField::ExePath, e)),
        }

        metadata.process_name = match name(raw_pid) {
            Ok(n) if !n.is_empty() => Some(n),
            _ => metadata.exe_path.as_deref().map(|p| basename(p).to_string()),
        };
        if metadata.process_name.is_none() {
            metadata.note(MetadataIssue::AccessDenied(MetadataField::ProcessName));
        }

        match pidinfo::<BSDInfo>(raw_pid, 0) {
            Ok(info) => match User::from_uid(Uid::from_raw(info.pbi_uid)) {
                Ok(Some(user)) => metadata.user = Some(user.name),
                Ok(None) => metadata.note(MetadataIssue::Unavailable {
                    field: MetadataField::User,
                    reason: format!("uid {} has no account name", info.pbi_uid),
                }),
                Err(e) => metadata.note(MetadataIssue::Unavailable {
                    field: MetadataField::User,
                    reason: e.to_string(),
                }),
            },
            Err(e) => metadata.note(issue_for(MetadataField::User, e)),
        }

        if !exists(raw_pid) {
            return ProcessMetadata::exited();
        }

        trace!(pid, name = ?metadata.process_name, "Resolved process metadata");
        metadata
    }

    async fn parent(&self, pid: u32) -> Option<ProcessLink> {
        let info = pidinfo::<BSDInfo>(i32::try_from(pid).ok()?, 0).ok()?;
        if info.pbi_ppid == 0 {
            return None;
        }

        let parent_name = name(info.pbi_ppid as i32).ok()?;
        Some(ProcessLink::new(info.pbi_ppid, parent_name))
    }

    async fn control_groups(&self, _pid: u32) -> Option<String> {
        None
    }
}

/// Signal 0 probes existence; EPERM means it exists but belongs to someone else.
///
/// 0 and negative values would probe a process group, never a single process.
fn exists(pid: i32) -> bool {
    pid > 0 && matches!(kill(Pid::from_raw(pid), None), Ok(()) | Err(Errno::EPERM))
}

fn issue_for(field: MetadataField, error: String) -> MetadataIssue {
    let lowered = error.to_lowercase();
    if lowered.contains("not permitted") || lowered.contains("denied") {
        MetadataIssue::AccessDenied(field)
    } else {
        MetadataIssue::Unavailable {
            field,
            reason: error,
        }
    }
}
