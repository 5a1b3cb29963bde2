use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{error, info};

use crate::checker::UrlChecker;
use crate::models::{CheckResult, CheckStatus, EndpointDefinition};
use crate::store::Store;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("URL not found: {0}")]
    UnknownEndpoint(String),
}

/// Fans the checker out over every monitored endpoint and merges the
/// outcomes back into the store.
pub struct Monitor {
    store: Arc<dyn Store>,
    checker: UrlChecker,
}

impl Monitor {
    pub fn new(store: Arc<dyn Store>, checker: UrlChecker) -> Self {
        Self { store, checker }
    }

    /// Checks every endpoint concurrently, persists each outcome, and
    /// returns the results in definition order.
    ///
    /// All probes are launched at once and the batch waits for every one
    /// to settle; a slow or failing endpoint never blocks the others. A
    /// task that panics is dropped from the batch instead of aborting it,
    /// so the output can be shorter than the definition list.
    pub async fn run_all(&self) -> Vec<CheckResult> {
        self.store.ensure_seeded().await;
        let definitions = self.store.list_definitions().await;

        info!("Starting URL checks for {} endpoints", definitions.len());

        let order: HashMap<String, usize> = definitions
            .iter()
            .enumerate()
            .map(|(i, def)| (def.id.clone(), i))
            .collect();

        let mut tasks = FuturesUnordered::new();
        for def in definitions {
            let checker = self.checker.clone();
            tasks.push(tokio::spawn(async move { check_endpoint(&checker, &def).await }));
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(join_res) = tasks.next().await {
            match join_res {
                Ok(result) => results.push(result),
                Err(e) => error!("Check task failed: {}", e),
            }
        }

        results.sort_by_key(|r| order.get(&r.id).copied().unwrap_or(usize::MAX));

        for result in &results {
            self.store.upsert_result(result.clone()).await;
        }

        let success = results.iter().filter(|r| r.is_success()).count();
        info!(
            "URL check completed: {} success, {} errors",
            success,
            results.len() - success
        );

        results
    }

    /// Checks a single endpoint by id, persisting and returning its result.
    pub async fn run_one(&self, id: &str) -> Result<CheckResult, MonitorError> {
        let definitions = self.store.list_definitions().await;
        let def = definitions
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| MonitorError::UnknownEndpoint(id.to_string()))?;

        let result = check_endpoint(&self.checker, &def).await;
        self.store.upsert_result(result.clone()).await;
        Ok(result)
    }

    /// Internal scheduling loop for deployments without an external cron.
    pub async fn run_periodic(self: Arc<Self>, interval_secs: u64) {
        info!("Internal check loop active, interval {}s", interval_secs);
        loop {
            self.run_all().await;
            tokio::time::sleep(Duration::from_secs(interval_secs)).await;
        }
    }
}

async fn check_endpoint(checker: &UrlChecker, def: &EndpointDefinition) -> CheckResult {
    info!("Checking {}: {}", def.name, def.url);
    let outcome = checker.check(&def.url).await;

    if let Some(message) = &outcome.error_message {
        info!("{}: FAILED ({}ms): {}", def.name, outcome.response_time_ms, message);
    } else {
        info!("{}: SUCCESS ({}ms)", def.name, outcome.response_time_ms);
    }

    CheckResult {
        id: def.id.clone(),
        status: if outcome.success {
            CheckStatus::Success
        } else {
            CheckStatus::Failure
        },
        checked_at: Utc::now(),
        response_time_ms: Some(outcome.response_time_ms),
        error_message: outcome.error_message,
    }
}
