//! Port record domain model.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ProcessMetadata, SocketEntry};

// ============================================================================
// Protocol
// ============================================================================

/// Transport protocol of a bound socket.
///
/// The derived ordering (`Tcp` before `Udp`) is the ordering used for
/// query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Source
// ============================================================================

/// The management layer that most likely launched a process.
///
/// Unrecognised tags coming off the wire deserialize as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Container runtime (docker, containerd, podman, kubernetes).
    Docker,
    /// Linux service manager.
    Systemd,
    /// macOS service manager.
    Launchd,
    /// Homebrew-installed binary.
    Brew,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::Docker,
        Source::Systemd,
        Source::Launchd,
        Source::Brew,
        Source::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Docker => "docker",
            Source::Systemd => "systemd",
            Source::Launchd => "launchd",
            Source::Brew => "brew",
            Source::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PortRecord
// ============================================================================

/// One observed (port, protocol, pid) binding plus the owning process's metadata.
///
/// A record is a point-in-time snapshot. Metadata that could not be read is
/// `None` in memory and an empty string on the wire; consumers must treat
/// both as "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    pub port: u16,
    pub protocol: Protocol,
    pub pid: u32,
    #[serde(with = "optional_text")]
    pub process_name: Option<String>,
    #[serde(with = "optional_text")]
    pub exe_path: Option<String>,
    #[serde(with = "optional_text")]
    pub user: Option<String>,
    pub source: Source,
    pub remarks: String,
}

impl PortRecord {
    /// Build a record for a socket from the metadata resolved for its PID.
    pub fn new(entry: &SocketEntry, metadata: &ProcessMetadata, source: Source) -> Self {
        let state = if entry.listening { "LISTENING" } else { "CONNECTED" };
        let remarks = std::iter::once(state.to_string())
            .chain(metadata.notes())
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            port: entry.port,
            protocol: entry.protocol,
            pid: entry.pid,
            process_name: metadata.process_name.clone(),
            exe_path: metadata.exe_path.clone(),
            user: metadata.user.clone(),
            source,
            remarks,
        }
    }

    /// The identity of this record within one query.
    pub fn key(&self) -> (u16, Protocol, u32) {
        (self.port, self.protocol, self.pid)
    }

    /// Whether the socket was in a listening state when observed.
    pub fn is_listening(&self) -> bool {
        self.remarks.starts_with("LISTENING")
    }

    /// Process name for display, `"unknown"` when it could not be resolved.
    pub fn display_name(&self) -> &str {
        self.process_name.as_deref().unwrap_or("unknown")
    }
}

impl fmt::Display for PortRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} (PID: {}, Process: {})",
            self.port,
            self.protocol,
            self.pid,
            self.display_name()
        )
    }
}

/// Renders absent text as `""` and reads `""` back as absent.
mod optional_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Some(text).filter(|t| !t.is_empty()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetadataField, MetadataIssue};

    fn metadata() -> ProcessMetadata {
        ProcessMetadata {
            process_name: Some("node".to_string()),
            exe_path: Some("/usr/bin/node".to_string()),
            user: None,
            issues: vec![MetadataIssue::AccessDenied(MetadataField::User)],
        }
    }

    #[test]
    fn test_protocol_ordering() {
        assert!(Protocol::Tcp < Protocol::Udp);
    }

    #[test]
    fn test_record_remarks() {
        let entry = SocketEntry::new(3000, Protocol::Tcp, 42, true);
        let record = PortRecord::new(&entry, &metadata(), Source::Unknown);

        assert!(record.is_listening());
        assert_eq!(
            record.remarks,
            "LISTENING; metadata partially unavailable: access denied (user)"
        );
        assert_eq!(record.key(), (3000, Protocol::Tcp, 42));
    }

    #[test]
    fn test_wire_shape() {
        let entry = SocketEntry::new(5353, Protocol::Udp, 7, false);
        let record = PortRecord::new(&entry, &metadata(), Source::Brew);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["protocol"], "udp");
        assert_eq!(json["source"], "brew");
        assert_eq!(json["user"], "");
        assert_eq!(json["exe_path"], "/usr/bin/node");
        assert_eq!(json.as_object().unwrap().len(), 8);

        let back: PortRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.user, None);
        assert_eq!(back, record);
    }

    #[test]
    fn test_unknown_source_tag() {
        let source: Source = serde_json::from_str("\"snap\"").unwrap();
        assert_eq!(source, Source::Unknown);
    }

    #[test]
    fn test_display_name_fallback() {
        let entry = SocketEntry::new(80, Protocol::Tcp, 1, true);
        let record = PortRecord::new(&entry, &ProcessMetadata::exited(), Source::Unknown);
        assert_eq!(record.display_name(), "unknown");
        assert!(record.remarks.contains("process exited"));
    }
}
