//! Command interface exposed to hosting processes.
//!
//! Hosts either call [`CommandInterface`] methods directly or exchange
//! [`Request`] / [`Response`] values as JSON. All failures are returned as
//! data; nothing here panics or exits the host.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapters::{PlatformProcessMetadata, PlatformSocketTable, PlatformTerminator};
use crate::application::{PortEnumerator, ProcessTerminator, SourceClassifier};
use crate::config::EngineConfig;
use crate::domain::{PortRecord, Source, TerminationFailure, TerminationOutcome};
use crate::error::Result;
use crate::ports::{ProcessMetadataPort, ProcessTerminatorPort, SocketTablePort};

/// A request from a hosting process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    ListPorts {
        ports: Vec<u16>,
        #[serde(default)]
        only_listening: bool,
    },
    ListAllPorts,
    KillProcess {
        pid: u32,
        #[serde(default)]
        force: bool,
    },
    KillByPort {
        port: u16,
        #[serde(default)]
        force: bool,
    },
    DetectSource {
        pid: u32,
    },
}

/// The answer to one [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Response {
    Ports(Vec<PortRecord>),
    Termination(TerminationOutcome),
    Source { source: Source },
    Error { error: String },
}

impl Response {
    pub fn error(error: impl ToString) -> Self {
        Response::Error {
            error: error.to_string(),
        }
    }
}

/// The platform-native command interface.
pub type PlatformCommandInterface =
    CommandInterface<PlatformSocketTable, PlatformProcessMetadata, PlatformTerminator>;

/// Query and termination operations over one set of platform capabilities.
pub struct CommandInterface<S, R, K> {
    enumerator: PortEnumerator<S, R>,
    terminator: ProcessTerminator<K>,
}

impl PlatformCommandInterface {
    /// Build the interface for the current operating system.
    pub fn platform(config: &EngineConfig) -> Result<Self> {
        let timeout = config.command_timeout();
        Self::new(
            PlatformSocketTable::new(timeout),
            PlatformProcessMetadata::new(timeout),
            PlatformTerminator::new(timeout),
            config,
        )
    }
}

impl<S, R, K> CommandInterface<S, R, K>
where
    S: SocketTablePort,
    R: ProcessMetadataPort + 'static,
    K: ProcessTerminatorPort,
{
    pub fn new(sockets: S, resolver: R, terminator: K, config: &EngineConfig) -> Result<Self> {
        let classifier = Arc::new(SourceClassifier::new(&config.classification)?);

        Ok(Self {
            enumerator: PortEnumerator::new(sockets, Arc::new(resolver), classifier),
            terminator: ProcessTerminator::new(terminator),
        })
    }

    /// Records for the given ports. Port 0 is ignored.
    pub async fn list_ports(&self, ports: &[u16], only_listening: bool) -> Result<Vec<PortRecord>> {
        let ports: BTreeSet<u16> = ports.iter().copied().filter(|p| *p > 0).collect();
        self.enumerator.list_ports(&ports, only_listening).await
    }

    pub async fn list_all_ports(&self) -> Result<Vec<PortRecord>> {
        self.enumerator.list_all_ports().await
    }

    pub async fn kill_process(&self, pid: u32, force: bool) -> TerminationOutcome {
        self.terminator.terminate(pid, force).await
    }

    /// Terminate the lowest-PID process listening on `port`.
    pub async fn kill_by_port(&self, port: u16, force: bool) -> Result<TerminationOutcome> {
        let listeners = self.list_ports(&[port], true).await?;

        let Some(pid) = listeners.iter().map(|record| record.pid).min() else {
            return Ok(TerminationOutcome::failed(&TerminationFailure::NoListener { port }));
        };

        debug!(port, pid, "Terminating listener");
        Ok(self.terminator.terminate(pid, force).await)
    }

    /// Classify a single process. A vanished PID is [`Source::Unknown`].
    pub async fn detect_source(&self, pid: u32) -> Source {
        self.enumerator.describe(pid).await.1
    }

    /// Serve one request.
    pub async fn handle(&self, request: Request) -> Response {
        debug!(?request, "Handling request");

        match request {
            Request::ListPorts {
                ports,
                only_listening,
            } => self
                .list_ports(&ports, only_listening)
                .await
                .map_or_else(Response::error, Response::Ports),
            Request::ListAllPorts => self
                .list_all_ports()
                .await
                .map_or_else(Response::error, Response::Ports),
            Request::KillProcess { pid, force } => {
                Response::Termination(self.kill_process(pid, force).await)
            }
            Request::KillByPort { port, force } => self
                .kill_by_port(port, force)
                .await
                .map_or_else(Response::error, Response::Termination),
            Request::DetectSource { pid } => Response::Source {
                source: self.detect_source(pid).await,
            },
        }
    }
}
