//! JSON-file store: two documents in one directory, `urls.json` for the
//! definition list and `checks.json` for the latest results, each a plain
//! array with RFC 3339 timestamps.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use crate::models::{CheckResult, EndpointDefinition};
use crate::store::Store;

const URLS_FILE: &str = "urls.json";
const CHECKS_FILE: &str = "checks.json";

pub struct JsonStore {
    dir: PathBuf,
    seed: Vec<EndpointDefinition>,
    demo: Vec<CheckResult>,
}

impl JsonStore {
    pub fn new(dir: PathBuf, seed: Vec<EndpointDefinition>, demo: Vec<CheckResult>) -> Self {
        Self { dir, seed, demo }
    }

    fn urls_path(&self) -> PathBuf {
        self.dir.join(URLS_FILE)
    }

    fn checks_path(&self) -> PathBuf {
        self.dir.join(CHECKS_FILE)
    }

    /// Reads one document. A missing file is reported as `Ok(None)` so the
    /// caller can tell "nothing written yet" apart from a broken store.
    async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, String> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("read {}: {}", path.display(), e)),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| format!("parse {}: {}", path.display(), e))
    }

    /// Writes via a temp file plus rename so readers never observe a
    /// half-written document.
    async fn write_document<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| format!("create {}: {}", self.dir.display(), e))?;

        let raw = serde_json::to_string_pretty(value)
            .map_err(|e| format!("serialize {}: {}", path.display(), e))?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| format!("write {}: {}", tmp.display(), e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| format!("rename {}: {}", path.display(), e))
    }
}

#[async_trait]
impl Store for JsonStore {
    async fn ensure_seeded(&self) {
        match Self::read_document::<Vec<EndpointDefinition>>(&self.urls_path()).await {
            Ok(Some(existing)) if !existing.is_empty() => {}
            Ok(_) => {
                if let Err(e) = self.write_document(&self.urls_path(), &self.seed).await {
                    error!("Failed to seed URL definitions: {}", e);
                }
            }
            Err(e) => error!("Failed to read URL definitions: {}", e),
        }
    }

    async fn list_definitions(&self) -> Vec<EndpointDefinition> {
        match Self::read_document::<Vec<EndpointDefinition>>(&self.urls_path()).await {
            Ok(Some(defs)) if !defs.is_empty() => defs,
            Ok(_) => self.seed.clone(),
            Err(e) => {
                error!("Failed to read URL definitions: {}", e);
                self.seed.clone()
            }
        }
    }

    async fn list_latest_results(&self) -> Vec<CheckResult> {
        match Self::read_document::<Vec<CheckResult>>(&self.checks_path()).await {
            Ok(Some(results)) => results,
            Ok(None) => Vec::new(),
            Err(e) => {
                error!("Failed to read checks, serving demo data: {}", e);
                self.demo.clone()
            }
        }
    }

    async fn upsert_result(&self, result: CheckResult) {
        let mut results = self.list_latest_results().await;
        match results.iter_mut().find(|r| r.id == result.id) {
            Some(existing) => *existing = result,
            None => results.push(result),
        }
        if let Err(e) = self.write_document(&self.checks_path(), &results).await {
            error!("Failed to save check result: {}", e);
        }
    }

    async fn replace_all_results(&self, results: Vec<CheckResult>) {
        if let Err(e) = self.write_document(&self.checks_path(), &results).await {
            warn!("Failed to save check results: {}", e);
        }
    }
}
