use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One monitored URL. Seeded once at store initialization and never
/// mutated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDefinition {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Success,
    #[serde(rename = "error")]
    Failure,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Success => "success",
            CheckStatus::Failure => "error",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "success" => CheckStatus::Success,
            _ => CheckStatus::Failure,
        }
    }
}

/// Latest known outcome of a probe against one endpoint. The store keeps
/// exactly one of these per endpoint id; newer results overwrite older ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub id: String,
    pub status: CheckStatus,
    pub checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CheckResult {
    pub fn is_success(&self) -> bool {
        self.status == CheckStatus::Success
    }
}

/// Raw outcome of a single probe, before it is tied to an endpoint id.
/// The elapsed time is recorded for every outcome, failures included.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub success: bool,
    pub response_time_ms: u64,
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn check_result_serializes_camel_case_with_rfc3339_timestamp() {
        let result = CheckResult {
            id: "papi".into(),
            status: CheckStatus::Failure,
            checked_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            response_time_ms: Some(1200),
            error_message: Some("HTTP 404: Not Found".into()),
        };

        let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&result).unwrap()).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["checkedAt"], "2025-06-01T12:00:00Z");
        assert_eq!(json["responseTimeMs"], 1200);
        assert_eq!(json["errorMessage"], "HTTP 404: Not Found");
    }

    #[test]
    fn optional_fields_are_omitted_on_success() {
        let result = CheckResult {
            id: "papi".into(),
            status: CheckStatus::Success,
            checked_at: Utc::now(),
            response_time_ms: Some(245),
            error_message: None,
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("errorMessage"));
    }
}
