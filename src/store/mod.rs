//! Persistence for endpoint definitions and their latest check results.
//!
//! Two interchangeable backends behind one trait: an SQLite-backed durable
//! store and a plain JSON-file store. Reads never fail the caller; when the
//! backing store is missing or broken they fall back to the seed/demo data
//! the backend was constructed with. Write failures are logged and dropped
//! so a broken store degrades the system to read-mostly instead of taking
//! the check loop down.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::models::{CheckResult, EndpointDefinition};

pub mod json;
pub mod seed;
pub mod sqlite;

pub use json::JsonStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Writes the seed definition list if no definitions exist yet.
    /// Idempotent; called before every read in practice.
    async fn ensure_seeded(&self);

    /// All endpoint definitions in insertion order, or the seed list when
    /// the store is empty or unavailable.
    async fn list_definitions(&self) -> Vec<EndpointDefinition>;

    /// Latest result per endpoint, in insertion order.
    async fn list_latest_results(&self) -> Vec<CheckResult>;

    /// Replaces the result with the same id in place, or appends.
    async fn upsert_result(&self, result: CheckResult);

    /// Overwrites the whole result collection in one write.
    async fn replace_all_results(&self, results: Vec<CheckResult>);
}

/// Builds the backend selected by configuration, wired up with the
/// built-in seed and demo datasets.
pub async fn open(config: &StoreConfig) -> Arc<dyn Store> {
    match config {
        StoreConfig::Sqlite { path } => {
            let path = path
                .clone()
                .or_else(|| std::env::var("LLMS_WATCH_DB").ok());
            Arc::new(
                SqliteStore::open(path.as_deref(), seed::seed_definitions(), seed::demo_results())
                    .await,
            )
        }
        StoreConfig::Json { dir } => Arc::new(JsonStore::new(
            dir.clone(),
            seed::seed_definitions(),
            seed::demo_results(),
        )),
    }
}
