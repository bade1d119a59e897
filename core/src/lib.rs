//! Portsight Core Library
//!
//! Cross-platform engine that answers "what owns port N, and can I stop it?".
//! Provides functionality to:
//! - Enumerate TCP and UDP sockets and attribute them to process IDs
//! - Resolve process metadata (name, executable path, owning user)
//! - Classify where a process came from (container, service manager, package manager)
//! - Terminate a process gracefully or forcefully, reporting the outcome as data
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: Per-platform implementations of the ports
//! - `application`: Use case services
//! - `commands`: Request/response boundary for hosting processes
//!
//! # Platform Support
//! - Linux: Reads `/proc` through the `procfs` crate
//! - macOS: Uses `lsof` and `libproc`
//! - Windows: Uses `netstat`, `tasklist` and the Win32 process API

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod commands;
pub mod config;
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

// Re-export domain types (primary API)
pub use domain::{
    OutcomeCategory, PortRecord, Protocol, Source, TerminationFailure, TerminationMode,
    TerminationOutcome,
};

// Re-export other commonly used types
pub use commands::{CommandInterface, PlatformCommandInterface, Request, Response};
pub use config::{ClassificationConfig, ClassificationRule, ConfigStore, EngineConfig};
pub use error::{Error, Result};
