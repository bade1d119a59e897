//! Source classification application service.
//!
//! Infers which management layer most likely launched a process. Every rule
//! is a heuristic over data that may be unreadable; an inspection that fails
//! simply does not match, so the worst outcome is [`Source::Unknown`].

use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use tracing::{debug, trace};

use crate::adapters::process::basename;
use crate::config::{ClassificationConfig, ClassificationRule};
use crate::domain::Source;
use crate::error::{Error, Result};
use crate::ports::ProcessMetadataPort;

/// Applies the configured classification rules in priority order.
#[derive(Debug)]
pub struct SourceClassifier {
    rules: Vec<ClassificationRule>,
    cgroup_marker: Option<Regex>,
    container_executables: Vec<String>,
    service_managers: BTreeMap<String, Source>,
    ancestry_depth: usize,
    package_manager_roots: Vec<String>,
}

impl SourceClassifier {
    pub fn new(config: &ClassificationConfig) -> Result<Self> {
        let mut seen = HashSet::new();
        let rules = config
            .rule_order
            .iter()
            .copied()
            .filter(|rule| seen.insert(*rule))
            .collect();

        let markers: Vec<String> = config
            .container_cgroup_markers
            .iter()
            .filter(|m| !m.is_empty())
            .map(|m| regex::escape(m))
            .collect();

        // A marker must be a whole component of the cgroup path: `docker-<id>.scope`
        // matches, `lxcfs.service` does not match `lxc`
        let cgroup_marker = if markers.is_empty() {
            None
        } else {
            let pattern = format!(r"(?:^|[/\-:.@])(?:{})(?:[/\-:.@]|$)", markers.join("|"));
            Some(Regex::new(&pattern).map_err(|e| {
                Error::Config(format!("Invalid container cgroup markers: {}", e))
            })?)
        };

        Ok(Self {
            rules,
            cgroup_marker,
            container_executables: config.container_executables.clone(),
            service_managers: config.service_managers.clone(),
            ancestry_depth: config.ancestry_depth,
            package_manager_roots: config.package_manager_roots.clone(),
        })
    }

    /// Rules in the order they are tried.
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Classify `pid`, whose executable was resolved to `exe_path`.
    pub async fn classify<R: ProcessMetadataPort>(
        &self,
        resolver: &R,
        pid: u32,
        exe_path: Option<&str>,
    ) -> Source {
        let needs_cgroups = self.rules.iter().any(|rule| {
            matches!(
                rule,
                ClassificationRule::Container | ClassificationRule::ServiceManager
            )
        });
        let cgroups = if needs_cgroups {
            resolver.control_groups(pid).await
        } else {
            None
        };
        let cgroup_paths: Vec<&str> = cgroups.as_deref().map(cgroup_paths).unwrap_or_default();

        for rule in &self.rules {
            let matched = match rule {
                ClassificationRule::Container => self.container(&cgroup_paths, exe_path),
                ClassificationRule::ServiceManager => {
                    self.service_manager(resolver, pid, &cgroup_paths).await
                }
                ClassificationRule::PackageManager => self.package_manager(exe_path),
            };

            if let Some(source) = matched {
                debug!(pid, ?rule, %source, "Classified process");
                return source;
            }
        }

        trace!(pid, "No classification rule matched");
        Source::Unknown
    }

    fn container(&self, cgroup_paths: &[&str], exe_path: Option<&str>) -> Option<Source> {
        let in_container = self
            .cgroup_marker
            .as_ref()
            .is_some_and(|marker| cgroup_paths.iter().any(|path| marker.is_match(path)));

        let runtime = exe_path.map(basename).is_some_and(|exe| {
            self.container_executables
                .iter()
                .any(|pattern| match pattern.strip_suffix('*') {
                    Some(prefix) => exe.starts_with(prefix),
                    None => exe == pattern,
                })
        });

        (in_container || runtime).then_some(Source::Docker)
    }

    async fn service_manager<R: ProcessMetadataPort>(
        &self,
        resolver: &R,
        pid: u32,
        cgroup_paths: &[&str],
    ) -> Option<Source> {
        let service_unit = cgroup_paths
            .iter()
            .any(|path| path.rsplit('/').next().is_some_and(|leaf| leaf.ends_with(".service")));
        if service_unit {
            return Some(Source::Systemd);
        }

        let mut current = pid;
        for _ in 0..self.ancestry_depth {
            let parent = resolver.parent(current).await?;
            if let Some(source) = self.service_managers.get(&parent.name) {
                return Some(*source);
            }
            if parent.pid == current || parent.pid <= 1 {
                break;
            }
            current = parent.pid;
        }

        None
    }

    fn package_manager(&self, exe_path: Option<&str>) -> Option<Source> {
        let exe = exe_path?;
        self.package_manager_roots
            .iter()
            .any(|root| exe.starts_with(root.as_str()))
            .then_some(Source::Brew)
    }
}

/// The cgroup path of each `hierarchy-ID:controllers:path` line.
fn cgroup_paths(text: &str) -> Vec<&str> {
    text.lines()
        .filter_map(|line| line.splitn(3, ':').nth(2))
        .filter(|path| !path.is_empty())
        .collect()
}
