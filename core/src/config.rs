//! Engine configuration.
//!
//! Stores configuration in JSON format at `~/.portsight/config.json`.
//! Every field is optional in the file; missing fields take their defaults.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::Source;
use crate::error::{Error, Result};

/// Top-level engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Deadline in milliseconds for every external tool invocation.
    pub command_timeout_ms: u64,

    /// Source classification heuristics.
    pub classification: ClassificationConfig,
}

impl EngineConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: 10_000,
            classification: ClassificationConfig::default(),
        }
    }
}

/// One source classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassificationRule {
    /// Control-group membership or a container runtime executable.
    Container,
    /// Parent chain rooted in a service manager.
    ServiceManager,
    /// Executable installed under a package manager prefix.
    PackageManager,
}

/// Heuristics used by the source classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassificationConfig {
    /// Rules in priority order. The first rule that matches wins.
    pub rule_order: Vec<ClassificationRule>,

    /// Path components in `/proc/<pid>/cgroup` that indicate a container.
    pub container_cgroup_markers: Vec<String>,

    /// Executable names of container runtimes. A trailing `*` matches a prefix.
    pub container_executables: Vec<String>,

    /// Ancestor process names and the tag they imply.
    pub service_managers: BTreeMap<String, Source>,

    /// How many parents to walk when looking for a service manager.
    pub ancestry_depth: usize,

    /// Install prefixes of package-manager binaries.
    pub package_manager_roots: Vec<String>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            rule_order: vec![
                ClassificationRule::Container,
                ClassificationRule::ServiceManager,
                ClassificationRule::PackageManager,
            ],
            container_cgroup_markers: strings(&[
                "docker",
                "containerd",
                "kubepods",
                "libpod",
                "crio",
                "lxc",
            ]),
            container_executables: strings(&[
                "dockerd",
                "docker-proxy",
                "containerd",
                "containerd-shim*",
                "com.docker.backend",
                "com.docker.vpnkit",
            ]),
            service_managers: BTreeMap::from([
                ("systemd".to_string(), Source::Systemd),
                ("launchd".to_string(), Source::Launchd),
            ]),
            ancestry_depth: 2,
            package_manager_roots: strings(&[
                "/opt/homebrew/",
                "/usr/local/Cellar/",
                "/usr/local/opt/",
                "/usr/local/Homebrew/",
                "/home/linuxbrew/.linuxbrew/",
            ]),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Configuration store for engine settings.
///
/// Handles reading and writing configuration to `~/.portsight/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.portsight/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_path = home.join(".portsight").join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<EngineConfig> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            return Ok(EngineConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &EngineConfig) -> Result<()> {
        if let Some(config_dir) = self.config_path.parent() {
            fs::create_dir_all(config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        // Write to a temp file then rename so readers never see a partial file
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_store() -> (ConfigStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        (ConfigStore::with_path(path), dir)
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let (store, _dir) = test_store();
        let config = store.load().await.unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.command_timeout(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (store, _dir) = test_store();

        let mut config = EngineConfig::default();
        config.command_timeout_ms = 2500;
        config.classification.rule_order = vec![ClassificationRule::PackageManager];
        config.classification.ancestry_depth = 5;

        store.save(&config).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, config);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let (store, _dir) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(
            store.path(),
            r#"{"classification": {"ruleOrder": ["serviceManager", "container"]}}"#,
        )
        .unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.command_timeout_ms, 10_000);
        assert_eq!(
            config.classification.rule_order,
            vec![ClassificationRule::ServiceManager, ClassificationRule::Container]
        );
        assert_eq!(config.classification.ancestry_depth, 2);
        assert!(config
            .classification
            .package_manager_roots
            .contains(&"/opt/homebrew/".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_rule_is_config_error() {
        let (store, _dir) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"classification": {"ruleOrder": ["nix"]}}"#).unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_service_manager_tags_on_wire() {
        let json = serde_json::to_value(ClassificationConfig::default()).unwrap();
        assert_eq!(json["serviceManagers"]["launchd"], "launchd");
        assert_eq!(json["ruleOrder"][1], "serviceManager");
    }
}
