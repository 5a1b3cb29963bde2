use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::engine::Monitor;
use crate::models::CheckResult;
use crate::store::Store;

#[derive(Clone)]
pub struct ApiState {
    pub monitor: Arc<Monitor>,
    pub store: Arc<dyn Store>,
    pub cron_secret: Option<String>,
}

/// Uniform success/failure envelope returned by every caller-facing route.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiErrorBody {
                message: message.into(),
            }),
        }
    }
}

/// Read interface: latest result per endpoint.
async fn list_checks(State(state): State<ApiState>) -> Json<ApiResponse<Vec<CheckResult>>> {
    state.store.ensure_seeded().await;
    let checks = state.store.list_latest_results().await;
    Json(ApiResponse::ok(checks))
}

/// Manual trigger: check everything.
async fn run_all_checks(State(state): State<ApiState>) -> Json<ApiResponse<Vec<CheckResult>>> {
    let results = state.monitor.run_all().await;
    Json(ApiResponse::ok(results))
}

/// Manual trigger: check one endpoint by id.
async fn run_single_check(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.monitor.run_one(&id).await {
        Ok(result) => (StatusCode::OK, Json(ApiResponse::ok(result))),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::fail(e.to_string())),
        ),
    }
}

/// Scheduled trigger. The external scheduler must present the shared
/// bearer secret; anything else is rejected before any check runs.
async fn run_cron_checks(State(state): State<ApiState>, headers: HeaderMap) -> impl IntoResponse {
    let authorized = match (&state.cron_secret, headers.get(header::AUTHORIZATION)) {
        (Some(secret), Some(value)) => {
            value.to_str().is_ok_and(|v| v == format!("Bearer {}", secret))
        }
        _ => false,
    };

    if !authorized {
        warn!("Rejected cron trigger with missing or invalid credentials");
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Unauthorized" })),
        );
    }

    let results = state.monitor.run_all().await;
    let success = results.iter().filter(|r| r.is_success()).count();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "message": "URL checks completed",
            "results": {
                "total": results.len(),
                "success": success,
                "errors": results.len() - success,
            },
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/checks", get(list_checks))
        .route("/api/checks/run", post(run_all_checks))
        .route("/api/checks/{id}/run", post(run_single_check))
        .route("/api/cron/check-urls", get(run_cron_checks))
        .fallback_service(ServeDir::new("public"))
        .with_state(state)
}

pub async fn start_server(port: u16, state: ApiState) {
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("API listening on http://localhost:{}", addr.port());
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind API port");
    axum::serve(listener, app).await.unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::UrlChecker;
    use crate::models::EndpointDefinition;
    use crate::store::JsonStore;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn test_state(dir: &std::path::Path, seed: Vec<EndpointDefinition>) -> ApiState {
        let store: Arc<dyn Store> = Arc::new(JsonStore::new(dir.to_path_buf(), seed, Vec::new()));
        ApiState {
            monitor: Arc::new(Monitor::new(store.clone(), UrlChecker::new())),
            store,
            cron_secret: Some("test-secret".into()),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn cron_without_credentials_is_unauthorized_and_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Vec::new()).await;
        let app = create_router(state.clone());

        let response = app
            .oneshot(
                Request::get("/api/cron/check-urls")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Unauthorized");
        assert!(state.store.list_latest_results().await.is_empty());
    }

    #[tokio::test]
    async fn cron_with_wrong_secret_is_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path(), Vec::new()).await);

        let response = app
            .oneshot(
                Request::get("/api/cron/check-urls")
                    .header("authorization", "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn cron_with_valid_secret_runs_checks_and_reports_counts() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let seed = vec![EndpointDefinition {
            id: "a".into(),
            name: "A".into(),
            url: format!("{}/llms.txt", server.uri()),
        }];
        let app = create_router(test_state(dir.path(), seed).await);

        let response = app
            .oneshot(
                Request::get("/api/cron/check-urls")
                    .header("authorization", "Bearer test-secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["results"]["total"], 1);
        assert_eq!(body["results"]["success"], 1);
        assert_eq!(body["results"]["errors"], 0);
    }

    #[tokio::test]
    async fn unknown_endpoint_id_returns_a_not_found_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path(), Vec::new()).await);

        let response = app
            .oneshot(
                Request::post("/api/checks/nope/run")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["message"], "URL not found: nope");
    }

    #[tokio::test]
    async fn read_route_returns_an_enveloped_result_list() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(dir.path(), Vec::new()).await);

        let response = app
            .oneshot(Request::get("/api/checks").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert!(body["data"].is_array());
    }
}
