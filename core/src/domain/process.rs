//! Socket and process snapshots produced by the platform adapters.

use std::fmt;

use super::Protocol;

/// One row of the socket table: a local port bound by a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketEntry {
    pub port: u16,
    pub protocol: Protocol,
    pub pid: u32,
    /// TCP in LISTEN state, or UDP without a connected peer.
    pub listening: bool,
}

impl SocketEntry {
    pub fn new(port: u16, protocol: Protocol, pid: u32, listening: bool) -> Self {
        Self {
            port,
            protocol,
            pid,
            listening,
        }
    }

    pub fn key(&self) -> (u16, Protocol, u32) {
        (self.port, self.protocol, self.pid)
    }
}

/// A metadata field that may be missing from a [`ProcessMetadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetadataField {
    ProcessName,
    ExePath,
    User,
}

impl MetadataField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataField::ProcessName => "process_name",
            MetadataField::ExePath => "exe_path",
            MetadataField::User => "user",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why some metadata is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataIssue {
    /// The PID disappeared between enumeration and resolution.
    ProcessExited,
    /// The OS refused to disclose a field.
    AccessDenied(MetadataField),
    /// The executable was removed from disk after the process started.
    ExecutableDeleted,
    /// Any other reason a field could not be read.
    Unavailable { field: MetadataField, reason: String },
}

/// Best-effort description of a process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessMetadata {
    pub process_name: Option<String>,
    pub exe_path: Option<String>,
    pub user: Option<String>,
    pub issues: Vec<MetadataIssue>,
}

impl ProcessMetadata {
    /// Metadata for a PID that no longer exists.
    pub fn exited() -> Self {
        Self {
            issues: vec![MetadataIssue::ProcessExited],
            ..Self::default()
        }
    }

    pub fn has_exited(&self) -> bool {
        self.issues.contains(&MetadataIssue::ProcessExited)
    }

    /// Record an issue once.
    pub fn note(&mut self, issue: MetadataIssue) {
        if !self.issues.contains(&issue) {
            self.issues.push(issue);
        }
    }

    /// Human-readable notes, in a stable order, for a record's remarks.
    pub fn notes(&self) -> Vec<String> {
        if self.has_exited() {
            return vec!["process exited before metadata could be read".to_string()];
        }

        let mut notes = Vec::new();

        let mut denied: Vec<MetadataField> = self
            .issues
            .iter()
            .filter_map(|issue| match issue {
                MetadataIssue::AccessDenied(field) => Some(*field),
                _ => None,
            })
            .collect();
        denied.sort();
        if !denied.is_empty() {
            let fields: Vec<&str> = denied.iter().map(MetadataField::as_str).collect();
            notes.push(format!(
                "metadata partially unavailable: access denied ({})",
                fields.join(", ")
            ));
        }

        for issue in &self.issues {
            match issue {
                MetadataIssue::ExecutableDeleted => notes.push("executable deleted".to_string()),
                MetadataIssue::Unavailable { field, reason } => notes.push(format!(
                    "metadata partially unavailable: {} ({})",
                    field, reason
                )),
                MetadataIssue::ProcessExited | MetadataIssue::AccessDenied(_) => {}
            }
        }

        notes
    }
}

/// The parent of a process, as seen while walking its ancestry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessLink {
    pub pid: u32,
    pub name: String,
}

impl ProcessLink {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}
