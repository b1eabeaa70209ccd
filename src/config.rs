//! Configuration loading and management.

use crate::repo::Latency;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default location of the project-level config file.
pub const CONFIG_FILE: &str = "taskboard/config.yaml";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub latency: LatencyConfig,

    /// Write sample tasks and projects into an empty store.
    #[serde(default = "default_seed")]
    pub seed_sample_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            latency: LatencyConfig::default(),
            seed_sample_data: default_seed(),
        }
    }
}

fn default_seed() -> bool {
    true
}

/// Which backend holds the key/value data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// SQLite file at `db_path`.
    #[default]
    Sqlite,
    /// Process memory; nothing survives a restart.
    Memory,
}

/// Store-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("taskboard").join("taskboard.db"))
        .unwrap_or_else(|| PathBuf::from(".taskboard/taskboard.db"))
}

/// Simulated repository latency, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyConfig {
    #[serde(default = "default_list_ms")]
    pub list_ms: u64,

    #[serde(default = "default_get_ms")]
    pub get_ms: u64,

    #[serde(default = "default_write_ms")]
    pub write_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            list_ms: default_list_ms(),
            get_ms: default_get_ms(),
            write_ms: default_write_ms(),
        }
    }
}

fn default_list_ms() -> u64 {
    300
}

fn default_get_ms() -> u64 {
    200
}

fn default_write_ms() -> u64 {
    200
}

impl LatencyConfig {
    pub fn uniform(ms: u64) -> Self {
        Self {
            list_ms: ms,
            get_ms: ms,
            write_ms: ms,
        }
    }

    pub fn to_latency(&self) -> Latency {
        Latency {
            list: Duration::from_millis(self.list_ms),
            get: Duration::from_millis(self.get_ms),
            write: Duration::from_millis(self.write_ms),
        }
    }
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load `taskboard/config.yaml` if present, otherwise defaults, then
    /// apply environment overrides.
    pub fn load_or_default() -> Self {
        let mut config = match Self::load(CONFIG_FILE) {
            Ok(config) => config,
            Err(e) => {
                debug!(path = CONFIG_FILE, error = %e, "No usable config file; using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Apply `TASKBOARD_*` overrides from `lookup`:
    /// - `TASKBOARD_DB_PATH` - database path
    /// - `TASKBOARD_STORE` - `sqlite` or `memory`
    /// - `TASKBOARD_LATENCY_MS` - uniform latency for every operation
    /// - `TASKBOARD_SEED` - `true`/`false`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db_path) = lookup("TASKBOARD_DB_PATH") {
            self.store.db_path = PathBuf::from(db_path);
        }

        if let Some(kind) = lookup("TASKBOARD_STORE") {
            match kind.to_lowercase().as_str() {
                "sqlite" => self.store.backend = BackendKind::Sqlite,
                "memory" => self.store.backend = BackendKind::Memory,
                _ => {}
            }
        }

        if let Some(ms) = lookup("TASKBOARD_LATENCY_MS") {
            if let Ok(ms) = ms.parse() {
                self.latency = LatencyConfig::uniform(ms);
            }
        }

        if let Some(seed) = lookup("TASKBOARD_SEED") {
            if let Ok(seed) = seed.parse() {
                self.seed_sample_data = seed;
            }
        }
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.store.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str(
            "store:\n  backend: memory\nlatency:\n  list_ms: 10\n",
        )
        .unwrap();

        assert_eq!(config.store.backend, BackendKind::Memory);
        assert_eq!(config.latency.list_ms, 10);
        assert_eq!(config.latency.get_ms, 200);
        assert!(config.seed_sample_data);
    }

    #[test]
    fn overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("TASKBOARD_DB_PATH", "/tmp/tb/board.db"),
            ("TASKBOARD_STORE", "Memory"),
            ("TASKBOARD_LATENCY_MS", "0"),
            ("TASKBOARD_SEED", "false"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.store.db_path, PathBuf::from("/tmp/tb/board.db"));
        assert_eq!(config.store.backend, BackendKind::Memory);
        assert_eq!(config.latency.to_latency(), Latency::none());
        assert!(!config.seed_sample_data);
    }

    #[test]
    fn bad_override_values_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|name| match name {
            "TASKBOARD_LATENCY_MS" => Some("soon".to_string()),
            "TASKBOARD_STORE" => Some("postgres".to_string()),
            _ => None,
        });
        assert_eq!(config.latency, LatencyConfig::default());
        assert_eq!(config.store.backend, BackendKind::Sqlite);
    }

    #[test]
    fn load_reads_file_and_ensures_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let db_path = dir.path().join("nested").join("board.db");
        std::fs::write(
            &path,
            format!("store:\n  db_path: {}\nseed_sample_data: false\n", db_path.display()),
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.store.db_path, db_path);
        assert!(!config.seed_sample_data);

        config.ensure_db_dir().unwrap();
        assert!(dir.path().join("nested").is_dir());
    }
}
