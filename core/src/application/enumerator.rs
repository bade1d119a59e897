//! Port enumeration application service.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::domain::{PortRecord, ProcessMetadata, Protocol, SocketEntry, Source};
use crate::error::Result;
use crate::ports::{ProcessMetadataPort, SocketTablePort};

use super::SourceClassifier;

/// Application service turning the socket table into port records.
///
/// Every call re-reads the socket table. Metadata and classification are
/// computed once per distinct PID within a call and then discarded.
pub struct PortEnumerator<S, R> {
    sockets: S,
    resolver: Arc<R>,
    classifier: Arc<SourceClassifier>,
}

impl<S, R> PortEnumerator<S, R>
where
    S: SocketTablePort,
    R: ProcessMetadataPort + 'static,
{
    pub fn new(sockets: S, resolver: Arc<R>, classifier: Arc<SourceClassifier>) -> Self {
        Self {
            sockets,
            resolver,
            classifier,
        }
    }

    /// Records for sockets bound to one of `ports`.
    ///
    /// An empty set returns immediately without reading the socket table.
    pub async fn list_ports(
        &self,
        ports: &BTreeSet<u16>,
        only_listening: bool,
    ) -> Result<Vec<PortRecord>> {
        if ports.is_empty() {
            return Ok(Vec::new());
        }

        let entries = self
            .sockets
            .read_sockets()
            .await?
            .into_iter()
            .filter(|entry| ports.contains(&entry.port))
            .filter(|entry| !only_listening || entry.listening);

        Ok(self.build(entries).await)
    }

    /// Records for every socket in the table.
    pub async fn list_all_ports(&self) -> Result<Vec<PortRecord>> {
        let entries = self.sockets.read_sockets().await?;
        Ok(self.build(entries).await)
    }

    /// Resolve metadata and source for one PID.
    pub async fn describe(&self, pid: u32) -> (ProcessMetadata, Source) {
        describe(self.resolver.as_ref(), &self.classifier, pid).await
    }

    async fn build(&self, entries: impl IntoIterator<Item = SocketEntry>) -> Vec<PortRecord> {
        // Duplicate rows (IPv4 and IPv6, several fds) collapse into one
        // socket that is listening if any of its rows is
        let mut sockets: BTreeMap<(u16, Protocol, u32), bool> = BTreeMap::new();
        for entry in entries {
            *sockets.entry(entry.key()).or_insert(false) |= entry.listening;
        }

        let pids: BTreeSet<u32> = sockets.keys().map(|(_, _, pid)| *pid).collect();
        let described = self.describe_all(pids).await;

        let records: Vec<PortRecord> = sockets
            .into_iter()
            .filter_map(|((port, protocol, pid), listening)| {
                let (metadata, source) = described.get(&pid)?;
                let entry = SocketEntry::new(port, protocol, pid, listening);
                Some(PortRecord::new(&entry, metadata, *source))
            })
            .collect();

        debug!(records = records.len(), processes = described.len(), "Enumerated ports");
        records
    }

    /// Describe each PID concurrently, once.
    async fn describe_all(&self, pids: BTreeSet<u32>) -> HashMap<u32, (ProcessMetadata, Source)> {
        let mut tasks = JoinSet::new();

        for pid in pids {
            let resolver = Arc::clone(&self.resolver);
            let classifier = Arc::clone(&self.classifier);
            tasks.spawn(async move {
                let (metadata, source) = describe(resolver.as_ref(), &classifier, pid).await;
                (pid, metadata, source)
            });
        }

        let mut described = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((pid, metadata, source)) => {
                    described.insert(pid, (metadata, source));
                }
                Err(e) => warn!(error = %e, "Process lookup task failed, omitting its records"),
            }
        }

        described
    }
}

async fn describe<R: ProcessMetadataPort>(
    resolver: &R,
    classifier: &SourceClassifier,
    pid: u32,
) -> (ProcessMetadata, Source) {
    let metadata = resolver.resolve(pid).await;
    if metadata.has_exited() {
        return (metadata, Source::Unknown);
    }

    let source = classifier
        .classify(resolver, pid, metadata.exe_path.as_deref())
        .await;
    (metadata, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassificationConfig;
    use crate::domain::{MetadataField, MetadataIssue};
    use crate::testing::{MockResolver, MockSocketTable};

    fn enumerator(
        entries: Vec<SocketEntry>,
        resolver: MockResolver,
    ) -> (PortEnumerator<MockSocketTable, MockResolver>, Arc<MockResolver>) {
        let resolver = Arc::new(resolver);
        let classifier = Arc::new(SourceClassifier::new(&ClassificationConfig::default()).unwrap());
        let enumerator =
            PortEnumerator::new(MockSocketTable::new(entries), Arc::clone(&resolver), classifier);
        (enumerator, resolver)
    }

    fn ports(values: &[u16]) -> BTreeSet<u16> {
        values.iter().copied().collect()
    }

    fn keys(records: &[PortRecord]) -> Vec<(u16, Protocol, u32)> {
        records.iter().map(PortRecord::key).collect()
    }

    #[tokio::test]
    async fn test_empty_set_skips_socket_table() {
        let (enumerator, _) = enumerator(
            vec![SocketEntry::new(3000, Protocol::Tcp, 1, true)],
            MockResolver::new(),
        );

        assert!(enumerator.list_ports(&BTreeSet::new(), false).await.unwrap().is_empty());
        assert!(enumerator.list_ports(&BTreeSet::new(), true).await.unwrap().is_empty());
        assert_eq!(enumerator.sockets.reads(), 0);
    }

    #[tokio::test]
    async fn test_filters_and_orders() {
        let entries = vec![
            SocketEntry::new(8001, Protocol::Udp, 20, true),
            SocketEntry::new(8001, Protocol::Tcp, 30, true),
            SocketEntry::new(3000, Protocol::Tcp, 20, true),
            SocketEntry::new(8001, Protocol::Tcp, 10, false),
            SocketEntry::new(9999, Protocol::Tcp, 10, true),
        ];
        let resolver = MockResolver::new()
            .with_process(10, "a", "/bin/a", "root")
            .with_process(20, "b", "/bin/b", "root")
            .with_process(30, "c", "/bin/c", "root");
        let (enumerator, _) = enumerator(entries, resolver);

        let records = enumerator
            .list_ports(&ports(&[3000, 8000, 8001, 8002]), false)
            .await
            .unwrap();
        assert_eq!(
            keys(&records),
            vec![
                (3000, Protocol::Tcp, 20),
                (8001, Protocol::Tcp, 10),
                (8001, Protocol::Tcp, 30),
                (8001, Protocol::Udp, 20),
            ]
        );

        let listening = enumerator.list_ports(&ports(&[8001]), true).await.unwrap();
        assert_eq!(
            keys(&listening),
            vec![(8001, Protocol::Tcp, 30), (8001, Protocol::Udp, 20)]
        );
        assert!(listening.iter().all(PortRecord::is_listening));
    }

    #[tokio::test]
    async fn test_unbound_port_has_no_record() {
        let (enumerator, _) = enumerator(
            vec![SocketEntry::new(3000, Protocol::Tcp, 1, true)],
            MockResolver::new().with_process(1, "a", "/bin/a", "root"),
        );
        assert!(enumerator.list_ports(&ports(&[4000]), false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_resolution_per_pid() {
        let entries = vec![
            SocketEntry::new(3000, Protocol::Tcp, 42, true),
            SocketEntry::new(3001, Protocol::Tcp, 42, true),
            SocketEntry::new(3002, Protocol::Udp, 42, true),
            SocketEntry::new(5000, Protocol::Tcp, 7, true),
        ];
        let resolver = MockResolver::new()
            .with_process(42, "node", "/opt/homebrew/bin/node", "dev")
            .with_process(7, "other", "/bin/other", "dev");
        let (enumerator, resolver) = enumerator(entries, resolver);

        let records = enumerator
            .list_ports(&ports(&[3000, 3001, 3002]), false)
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(resolver.resolutions(42), 1);
        assert_eq!(resolver.resolutions(7), 0);
        for record in &records {
            assert_eq!(record.process_name.as_deref(), Some("node"));
            assert_eq!(record.exe_path.as_deref(), Some("/opt/homebrew/bin/node"));
            assert_eq!(record.user.as_deref(), Some("dev"));
            assert_eq!(record.source, Source::Brew);
        }
    }

    #[tokio::test]
    async fn test_duplicate_rows_merge() {
        let entries = vec![
            SocketEntry::new(53, Protocol::Udp, 5, false),
            SocketEntry::new(53, Protocol::Udp, 5, true),
            SocketEntry::new(53, Protocol::Udp, 5, false),
        ];
        let (enumerator, _) = enumerator(
            entries,
            MockResolver::new().with_process(5, "dns", "/usr/sbin/dns", "root"),
        );

        let records = enumerator.list_all_ports().await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_listening());
    }

    #[tokio::test]
    async fn test_vanished_process_is_kept() {
        let (enumerator, _) = enumerator(
            vec![SocketEntry::new(8080, Protocol::Tcp, 99, true)],
            MockResolver::new(),
        );

        let records = enumerator.list_all_ports().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].process_name, None);
        assert_eq!(records[0].source, Source::Unknown);
        assert!(records[0].remarks.contains("process exited"));
    }

    #[tokio::test]
    async fn test_partial_metadata_still_emitted() {
        let metadata = ProcessMetadata {
            process_name: Some("postgres".to_string()),
            exe_path: Some("/opt/homebrew/opt/postgresql@16/bin/postgres".to_string()),
            user: None,
            issues: vec![MetadataIssue::AccessDenied(MetadataField::User)],
        };
        let (enumerator, _) = enumerator(
            vec![SocketEntry::new(5432, Protocol::Tcp, 77, true)],
            MockResolver::new().with_metadata(77, metadata),
        );

        let records = enumerator.list_ports(&ports(&[5432]), true).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user, None);
        assert_eq!(records[0].process_name.as_deref(), Some("postgres"));
        assert_eq!(records[0].source, Source::Brew);
        assert_eq!(
            records[0].remarks,
            "LISTENING; metadata partially unavailable: access denied (user)"
        );
    }

    #[tokio::test]
    async fn test_unreadable_table_is_error() {
        let resolver = Arc::new(MockResolver::new());
        let classifier = Arc::new(SourceClassifier::new(&ClassificationConfig::default()).unwrap());
        let enumerator = PortEnumerator::new(MockSocketTable::unreadable(), resolver, classifier);

        tokio_test::assert_err!(enumerator.list_all_ports().await);
        tokio_test::assert_err!(enumerator.list_ports(&ports(&[80]), false).await);
    }

    #[tokio::test]
    async fn test_all_ports_sorted_and_unique() {
        let entries = vec![
            SocketEntry::new(443, Protocol::Tcp, 3, true),
            SocketEntry::new(22, Protocol::Tcp, 1, true),
            SocketEntry::new(443, Protocol::Tcp, 2, true),
            SocketEntry::new(22, Protocol::Tcp, 1, true),
            SocketEntry::new(22, Protocol::Udp, 1, true),
        ];
        let (enumerator, _) = enumerator(entries, MockResolver::new());

        let first = keys(&enumerator.list_all_ports().await.unwrap());
        assert!(first.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(first.len(), 4);

        let second = keys(&enumerator.list_all_ports().await.unwrap());
        assert_eq!(first, second);
    }
}
