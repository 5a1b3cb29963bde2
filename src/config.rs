use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WatchConfig {
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Internal check cadence in seconds; 0 leaves scheduling entirely to
    /// the external cron trigger.
    #[serde(default)]
    pub check_interval_secs: u64,
    /// Shared secret for the cron route; the CRON_SECRET environment
    /// variable takes precedence.
    #[serde(default)]
    pub cron_secret: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    Sqlite {
        #[serde(default)]
        path: Option<String>,
    },
    Json {
        dir: PathBuf,
    },
}

fn default_api_port() -> u16 {
    3000
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Sqlite { path: None }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            check_interval_secs: 0,
            cron_secret: None,
            store: StoreConfig::default(),
        }
    }
}

impl WatchConfig {
    /// Loads the config file; a missing file yields the defaults so the
    /// watcher can run unconfigured in demo mode.
    pub fn load(path: &str) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path)),
        };
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path))
    }

    pub fn cron_secret(&self) -> Option<String> {
        std::env::var("CRON_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.cron_secret.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = WatchConfig::load("does-not-exist.json").unwrap();
        assert_eq!(config.api_port, 3000);
        assert_eq!(config.check_interval_secs, 0);
        assert!(matches!(config.store, StoreConfig::Sqlite { path: None }));
    }

    #[test]
    fn backend_selection_is_tagged() {
        let config: WatchConfig = serde_json::from_str(
            r#"{
                "api_port": 8080,
                "cron_secret": "s3cret",
                "store": { "backend": "json", "dir": "data" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.api_port, 8080);
        assert!(matches!(config.store, StoreConfig::Json { ref dir } if dir.ends_with("data")));
    }

    #[test]
    fn sqlite_backend_path_is_optional() {
        let config: WatchConfig =
            serde_json::from_str(r#"{ "store": { "backend": "sqlite" } }"#).unwrap();
        assert!(matches!(config.store, StoreConfig::Sqlite { path: None }));
    }
}
