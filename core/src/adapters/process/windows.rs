//! Windows process metadata using tasklist and the Win32 API.

use std::time::Duration;

use tracing::{debug, trace};
use windows::core::PWSTR;
use windows::Win32::Foundation::{CloseHandle, E_ACCESSDENIED};
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
    PROCESS_QUERY_LIMITED_INFORMATION,
};

use crate::adapters::command::CommandPool;
use crate::adapters::parse::parse_tasklist_csv;
use crate::domain::{MetadataField, MetadataIssue, ProcessLink, ProcessMetadata};
use crate::ports::ProcessMetadataPort;

/// `tasklist /V` walks every window title, so only a few may run at once.
const TASKLIST_CONCURRENCY: usize = 4;

/// Windows-specific process metadata resolver.
pub struct WindowsProcessMetadata {
    tasklist: CommandPool,
}

impl WindowsProcessMetadata {
    pub fn new(timeout: Duration) -> Self {
        Self {
            tasklist: CommandPool::new(TASKLIST_CONCURRENCY, timeout),
        }
    }
}

impl ProcessMetadataPort for WindowsProcessMetadata {
    async fn resolve(&self, pid: u32) -> ProcessMetadata {
        let filter = format!("PID eq {}", pid);
        let args = ["/V", "/FO", "CSV", "/NH", "/FI", filter.as_str()];

        let output = match self.tasklist.run("tasklist", &args).await {
            Ok(output) => output,
            Err(e) => {
                debug!(pid, error = %e, "tasklist failed");
                let mut metadata = ProcessMetadata::default();
                for field in [MetadataField::ProcessName, MetadataField::User] {
                    metadata.note(MetadataIssue::Unavailable {
                        field,
                        reason: e.to_string(),
                    });
                }
                metadata.exe_path = image_path(pid).ok();
                return metadata;
            }
        };

        let Some(row) = parse_tasklist_csv(&String::from_utf8_lossy(&output.stdout))
            .filter(|row| row.pid == pid)
        else {
            return ProcessMetadata::exited();
        };

        let mut metadata = ProcessMetadata {
            process_name: Some(
                row.image_name
                    .strip_suffix(".exe")
                    .unwrap_or(&row.image_name)
                    .to_string(),
            ),
            ..ProcessMetadata::default()
        };

        match row.user {
            Some(user) => metadata.user = Some(user),
            None => metadata.note(MetadataIssue::AccessDenied(MetadataField::User)),
        }

        match image_path(pid) {
            Ok(path) => metadata.exe_path = Some(path),
            Err(e) if e.code() == E_ACCESSDENIED => {
                metadata.note(MetadataIssue::AccessDenied(MetadataField::ExePath))
            }
            Err(e) => metadata.note(MetadataIssue::Unavailable {
                field: MetadataField::ExePath,
                reason: e.to_string(),
            }),
        }

        trace!(pid, name = ?metadata.process_name, "Resolved process metadata");
        metadata
    }

    async fn parent(&self, _pid: u32) -> Option<ProcessLink> {
        None
    }

    async fn control_groups(&self, _pid: u32) -> Option<String> {
        None
    }
}

/// Full Win32 path of the image backing `pid`.
fn image_path(pid: u32) -> windows::core::Result<String> {
    let mut buffer = [0u16; 1024];
    let mut size = buffer.len() as u32;

    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid)?;
        let result = QueryFullProcessImageNameW(
            handle,
            PROCESS_NAME_WIN32,
            PWSTR(buffer.as_mut_ptr()),
            &mut size,
        );
        let _ = CloseHandle(handle);
        result?;
    }

    Ok(String::from_utf16_lossy(&buffer[..size as usize]))
}
