use std::time::{Duration, Instant};

use tracing::debug;

use crate::models::ProbeOutcome;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("llms-watch/", env!("CARGO_PKG_VERSION"));

/// Probes a single URL with a bounded-time HEAD request and classifies
/// the outcome. Total by contract: every failure mode, malformed URLs
/// included, comes back as a `ProbeOutcome`, never as an error.
#[derive(Clone)]
pub struct UrlChecker {
    client: reqwest::Client,
    timeout: Duration,
}

impl UrlChecker {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, timeout }
    }

    pub async fn check(&self, url: &str) -> ProbeOutcome {
        let start = Instant::now();
        let response = self.client.head(url).send().await;
        let response_time_ms = start.elapsed().as_millis() as u64;

        match response {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    ProbeOutcome {
                        success: true,
                        response_time_ms,
                        error_message: None,
                    }
                } else {
                    let reason = status.canonical_reason().unwrap_or("Unknown");
                    ProbeOutcome {
                        success: false,
                        response_time_ms,
                        error_message: Some(format!("HTTP {}: {}", status.as_u16(), reason)),
                    }
                }
            }
            Err(err) => {
                debug!(url, error = %err, "Probe failed");
                let message = if err.is_timeout() {
                    format!("Request timeout ({}s)", self.timeout.as_secs())
                } else {
                    describe_transport_error(&err)
                };
                ProbeOutcome {
                    success: false,
                    response_time_ms,
                    error_message: Some(message),
                }
            }
        }
    }
}

impl Default for UrlChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks to the innermost source of a transport error; reqwest's own
/// Display wraps it in URL noise that is useless in a status table.
fn describe_transport_error(err: &reqwest::Error) -> String {
    let mut current: &dyn std::error::Error = err;
    while let Some(source) = current.source() {
        current = source;
    }
    let message = current.to_string();
    if message.is_empty() {
        "Unknown error occurred".to_string()
    } else {
        message
    }
}
