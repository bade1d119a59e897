//! Socket table adapters.
//!
//! Platform-specific implementations of [`SocketTablePort`].

#[cfg(target_os = "macos")]
mod darwin;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "windows")]
mod windows;

use std::time::Duration;

use crate::domain::SocketEntry;
use crate::error::Result;
use crate::ports::SocketTablePort;

/// The socket table reader for the current platform.
pub struct PlatformSocketTable {
    #[cfg(target_os = "macos")]
    inner: darwin::DarwinSocketTable,

    #[cfg(target_os = "linux")]
    inner: linux::LinuxSocketTable,

    #[cfg(target_os = "windows")]
    inner: windows::WindowsSocketTable,

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    inner: super::unsupported::Unsupported,
}

impl PlatformSocketTable {
    /// Create a reader whose OS calls are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            #[cfg(target_os = "macos")]
            inner: darwin::DarwinSocketTable::new(timeout),

            #[cfg(target_os = "linux")]
            inner: linux::LinuxSocketTable::new(timeout),

            #[cfg(target_os = "windows")]
            inner: windows::WindowsSocketTable::new(timeout),

            #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
            inner: {
                let _ = timeout;
                super::unsupported::Unsupported
            },
        }
    }
}

impl SocketTablePort for PlatformSocketTable {
    async fn read_sockets(&self) -> Result<Vec<SocketEntry>> {
        self.inner.read_sockets().await
    }
}
