//! Process metadata adapters.
//!
//! Platform-specific implementations of [`ProcessMetadataPort`].

#[cfg(target_os = "macos")]
mod darwin;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "windows")]
mod windows;

use std::time::Duration;

use crate::domain::{ProcessLink, ProcessMetadata};
use crate::ports::ProcessMetadataPort;

/// The process metadata resolver for the current platform.
pub struct PlatformProcessMetadata {
    #[cfg(target_os = "macos")]
    inner: darwin::DarwinProcessMetadata,

    #[cfg(target_os = "linux")]
    inner: linux::LinuxProcessMetadata,

    #[cfg(target_os = "windows")]
    inner: windows::WindowsProcessMetadata,

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    inner: super::unsupported::Unsupported,
}

impl PlatformProcessMetadata {
    /// Create a resolver whose OS calls are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            #[cfg(target_os = "macos")]
            inner: {
                let _ = timeout;
                darwin::DarwinProcessMetadata
            },

            #[cfg(target_os = "linux")]
            inner: linux::LinuxProcessMetadata::new(timeout),

            #[cfg(target_os = "windows")]
            inner: windows::WindowsProcessMetadata::new(timeout),

            #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
            inner: {
                let _ = timeout;
                super::unsupported::Unsupported
            },
        }
    }
}

impl ProcessMetadataPort for PlatformProcessMetadata {
    async fn resolve(&self, pid: u32) -> ProcessMetadata {
        self.inner.resolve(pid).await
    }

    async fn parent(&self, pid: u32) -> Option<ProcessLink> {
        self.inner.parent(pid).await
    }

    async fn control_groups(&self, pid: u32) -> Option<String> {
        self.inner.control_groups(pid).await
    }
}

/// Last path component of an executable path, accepting `/` and `\` separators.
pub(crate) fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        assert_eq!(basename("/usr/bin/node"), "node");
        assert_eq!(basename(r"C:\Program Files\nodejs\node.exe"), "node.exe");
        assert_eq!(basename("python3"), "python3");
    }
}
