//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the capabilities the application layer needs from the
//! operating system. One implementation per platform lives in `adapters`;
//! tests substitute in-memory mocks.

mod metadata;
mod sockets;
mod terminator;

pub use metadata::ProcessMetadataPort;
pub use sockets::SocketTablePort;
pub use terminator::ProcessTerminatorPort;
