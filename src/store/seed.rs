//! Built-in datasets handed to store backends at construction: the seed
//! definition list written on first initialization, and the demo results
//! served when durable storage is unavailable.

use chrono::{Duration, Utc};

use crate::models::{CheckResult, CheckStatus, EndpointDefinition};

pub fn seed_definitions() -> Vec<EndpointDefinition> {
    vec![
        EndpointDefinition {
            id: "papi".into(),
            name: "Papi".into(),
            url: "https://papi.how/llms.txt".into(),
        },
        EndpointDefinition {
            id: "dedot".into(),
            name: "Dedot".into(),
            url: "https://docs.dedot.dev/llms.txt".into(),
        },
        EndpointDefinition {
            id: "ink".into(),
            name: "Ink".into(),
            url: "https://use.ink/llms.txt".into(),
        },
    ]
}

/// Plausible stale results for read-mostly demo mode. Timestamps sit in
/// the recent past so they never read as a live check.
pub fn demo_results() -> Vec<CheckResult> {
    let now = Utc::now();
    vec![
        CheckResult {
            id: "papi".into(),
            status: CheckStatus::Success,
            checked_at: now - Duration::minutes(30),
            response_time_ms: Some(245),
            error_message: None,
        },
        CheckResult {
            id: "dedot".into(),
            status: CheckStatus::Failure,
            checked_at: now - Duration::minutes(45),
            response_time_ms: Some(1200),
            error_message: Some("HTTP 404: Not Found".into()),
        },
        CheckResult {
            id: "ink".into(),
            status: CheckStatus::Success,
            checked_at: now - Duration::minutes(15),
            response_time_ms: Some(180),
            error_message: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_demo_result_refers_to_a_seeded_definition() {
        let ids: Vec<_> = seed_definitions().into_iter().map(|d| d.id).collect();
        for result in demo_results() {
            assert!(ids.contains(&result.id));
        }
    }

    #[test]
    fn demo_timestamps_are_in_the_past() {
        let now = Utc::now();
        for result in demo_results() {
            assert!(result.checked_at < now);
        }
    }
}
