//! Process metadata resolver port (interface).

use crate::domain::{ProcessLink, ProcessMetadata};

/// Port for describing processes.
///
/// Every method is best-effort and infallible: missing data is reported as
/// `None` or as issues on the returned [`ProcessMetadata`].
pub trait ProcessMetadataPort: Send + Sync {
    /// Resolve name, executable path and owning user of `pid`.
    ///
    /// A PID that no longer exists yields [`ProcessMetadata::exited`].
    fn resolve(&self, pid: u32) -> impl std::future::Future<Output = ProcessMetadata> + Send;

    /// The parent of `pid`, if it has one that can be inspected.
    fn parent(&self, pid: u32) -> impl std::future::Future<Output = Option<ProcessLink>> + Send;

    /// Raw control-group membership of `pid` (`/proc/<pid>/cgroup` text on Linux).
    ///
    /// `None` on platforms without control groups or when unreadable.
    fn control_groups(&self, pid: u32)
        -> impl std::future::Future<Output = Option<String>> + Send;
}
