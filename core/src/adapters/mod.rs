//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter wraps the introspection facilities of one operating system;
//! the `Platform*` types select the right one at compile time.

pub(crate) mod command;
pub(crate) mod parse;
pub mod process;
pub mod sockets;
pub mod terminator;

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
mod unsupported;

// Re-export main types for convenience
pub use process::PlatformProcessMetadata;
pub use sockets::PlatformSocketTable;
pub use terminator::PlatformTerminator;
