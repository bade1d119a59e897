//! Fallback for targets without a socket table implementation.

use crate::domain::{
    MetadataField, MetadataIssue, ProcessLink, ProcessMetadata, SocketEntry, TerminationFailure,
    TerminationMode,
};
use crate::error::{Error, Result};
use crate::ports::{ProcessMetadataPort, ProcessTerminatorPort, SocketTablePort};

pub struct Unsupported;

impl SocketTablePort for Unsupported {
    async fn read_sockets(&self) -> Result<Vec<SocketEntry>> {
        Err(Error::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }
}

impl ProcessMetadataPort for Unsupported {
    async fn resolve(&self, _pid: u32) -> ProcessMetadata {
        let mut metadata = ProcessMetadata::default();
        for field in [MetadataField::ProcessName, MetadataField::ExePath, MetadataField::User] {
            metadata.note(MetadataIssue::Unavailable {
                field,
                reason: format!("unsupported on {}", std::env::consts::OS),
            });
        }
        metadata
    }

    async fn parent(&self, _pid: u32) -> Option<ProcessLink> {
        None
    }

    async fn control_groups(&self, _pid: u32) -> Option<String> {
        None
    }
}

impl ProcessTerminatorPort for Unsupported {
    async fn is_alive(&self, _pid: u32) -> bool {
        false
    }

    async fn send_termination(
        &self,
        pid: u32,
        _mode: TerminationMode,
    ) -> std::result::Result<(), TerminationFailure> {
        Err(TerminationFailure::Platform {
            pid,
            detail: format!("unsupported on {}", std::env::consts::OS),
        })
    }
}
