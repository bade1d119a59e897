//! Domain layer - Pure data models.
//!
//! This module contains the entities exchanged between the engine and its
//! callers. These types have no I/O dependencies and can be tested in isolation.

mod outcome;
mod process;
mod record;

// Re-export all domain types
pub use outcome::{
    OutcomeCategory, TerminationFailure, TerminationMode, TerminationOutcome, NOT_FOUND_MARKER,
    PERMISSION_DENIED_MARKER, PLATFORM_ERROR_MARKER,
};
pub use process::{MetadataField, MetadataIssue, ProcessLink, ProcessMetadata, SocketEntry};
pub use record::{PortRecord, Protocol, Source};
