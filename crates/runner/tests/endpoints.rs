//! Runner flows against an in-process mock API

use std::collections::HashMap;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use apiprobe_runner::{
    ApiRunner, Fixture, Flow, FlowOutcome, Outcome, Reporter, RunSummary, RunnerConfig,
};

async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL nothing is listening on
async fn closed_port() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn healthy() -> Router {
    Router::new().route("/health", get(|| async { StatusCode::OK }))
}

async fn run(
    base_url: String,
    fixture: &str,
    flow: Flow,
    verbose: bool,
) -> (FlowOutcome, RunSummary, String) {
    colored::control::set_override(false);
    let config = RunnerConfig {
        base_url,
        verbose,
        request_timeout_secs: 1,
        ..Default::default()
    };
    let fixture = Fixture::from_json_str(fixture).unwrap();
    let reporter = Reporter::new(Vec::new(), verbose);

    let mut runner = ApiRunner::new(config, fixture, reporter).unwrap();
    let outcome = runner.execute(flow).await.unwrap();
    let (summary, reporter) = runner.into_parts();
    let output = String::from_utf8(reporter.into_inner()).unwrap();
    (outcome, summary, output)
}

const REGISTER: &str = r#"{
    "authentication": {
        "register": {
            "endpoint": "POST /api/auth/register",
            "request": {"email": "a@b.com"}
        }
    }
}"#;

#[tokio::test]
async fn register_created_passes() {
    let router = healthy().route(
        "/api/auth/register",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["email"], "a@b.com");
            (StatusCode::CREATED, Json(json!({"user_id": "u-1"})))
        }),
    );
    let base = spawn_mock(router).await;

    let (outcome, summary, output) = run(base, REGISTER, Flow::Full, false).await;

    assert_eq!(outcome, FlowOutcome::Completed);
    assert_eq!(summary.passed(), 1);
    assert_eq!(summary.failed(), 0);
    assert_eq!(summary.success_rate(), Some(100.0));
    assert!(output.contains("✓ Health Check"));
    assert!(output.contains("Testing AUTHENTICATION Endpoints"));
    assert!(output.contains("✓ authentication.register"));
    assert!(output.contains("Success Rate: 100.0%"));
}

#[tokio::test]
async fn server_error_reports_detail() {
    let router = healthy().route(
        "/api/auth/register",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "bad request"})),
            )
        }),
    );
    let base = spawn_mock(router).await;

    let (_, summary, output) = run(base, REGISTER, Flow::Full, false).await;

    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.results()[0].outcome, Outcome::Fail);
    assert_eq!(summary.results()[0].message, "Status: 500 - bad request");
    assert!(output.contains("  • authentication.register: Status: 500 - bad request"));
    assert!(output.contains("Many tests failed"));
}

#[tokio::test]
async fn not_found_fails_with_status() {
    let base = spawn_mock(healthy()).await;

    let (_, summary, _) = run(base, REGISTER, Flow::Full, false).await;

    assert_eq!(summary.failed(), 1);
    assert!(summary.results()[0].message.contains("404"));
}

#[tokio::test]
async fn methods_send_payload_where_expected() {
    let router = healthy()
        .route(
            "/api/tests/42",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("subject").map(String::as_str) == Some("math") {
                    StatusCode::OK
                } else {
                    StatusCode::BAD_REQUEST
                }
            }),
        )
        .route(
            "/api/profile/7",
            put(|Json(body): Json<Value>| async move {
                if body["name"] == "Ada" && body["user_id"] == 7 {
                    StatusCode::OK
                } else {
                    StatusCode::BAD_REQUEST
                }
            }),
        )
        .route("/api/sessions/s1", delete(|| async { StatusCode::OK }));
    let base = spawn_mock(router).await;

    let fixture = r#"{
        "diagnostic_test": {
            "get_test": {
                "endpoint": "GET /api/tests/{test_id}",
                "request": {"test_id": "42", "subject": "math"}
            },
            "update_profile": {
                "endpoint": "PUT /api/profile/{user_id}",
                "request": {"user_id": 7, "name": "Ada"}
            },
            "end_session": {
                "endpoint": "DELETE /api/sessions/{session_id}",
                "request": {"session_id": "s1"}
            }
        }
    }"#;

    let (outcome, summary, output) =
        run(base, fixture, Flow::Group("diagnostic_test".into()), false).await;

    assert_eq!(outcome, FlowOutcome::Completed);
    assert_eq!(summary.passed(), 3, "{}", output);
    assert_eq!(summary.failed(), 0);
}

#[tokio::test]
async fn groups_run_in_fixture_order() {
    let router = healthy()
        .route("/b", get(|| async { StatusCode::OK }))
        .route("/a", get(|| async { StatusCode::OK }));
    let base = spawn_mock(router).await;

    let fixture = r#"{
        "zeta": {"one": {"endpoint": "GET /b"}},
        "alpha": {"two": {"endpoint": "GET /a"}, "three": {"endpoint": "GET /a"}}
    }"#;

    let (_, summary, _) = run(base, fixture, Flow::Full, false).await;

    let names: Vec<_> = summary.results().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["zeta.one", "alpha.two", "alpha.three"]);
}

#[tokio::test]
async fn timeout_is_recorded_and_run_continues() {
    let router = healthy()
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                StatusCode::OK
            }),
        )
        .route("/fast", get(|| async { StatusCode::OK }));
    let base = spawn_mock(router).await;

    let fixture = r#"{
        "perf": {
            "slow": {"endpoint": "GET /slow"},
            "fast": {"endpoint": "GET /fast"}
        }
    }"#;

    let (_, summary, _) = run(base, fixture, Flow::Full, false).await;

    assert_eq!(summary.results()[0].message, "Request timeout");
    assert_eq!(summary.results()[1].outcome, Outcome::Pass);
    assert_eq!(summary.total(), 2);
}

#[tokio::test]
async fn full_run_stops_when_server_is_down() {
    let base = closed_port().await;

    let (outcome, summary, output) = run(base.clone(), REGISTER, Flow::Full, false).await;

    assert!(matches!(outcome, FlowOutcome::HealthGateClosed(_)));
    assert_eq!(summary.total(), 0);
    assert!(output.contains(&format!("Cannot connect to {}", base)));
    assert!(output.contains("Cannot proceed: API server is not running"));
    assert!(!output.contains("Test Summary"));
}

#[tokio::test]
async fn single_group_ignores_failed_health_check() {
    let base = closed_port().await;

    let (outcome, summary, output) =
        run(base, REGISTER, Flow::Group("authentication".into()), false).await;

    assert_eq!(outcome, FlowOutcome::Completed);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.results()[0].message, "Connection error");
    assert!(output.contains("✗ Health Check"));
    assert!(output.contains("Test Summary"));
}

#[tokio::test]
async fn unknown_group_reports_and_summarises_nothing() {
    let base = spawn_mock(healthy()).await;

    let (outcome, summary, output) =
        run(base, REGISTER, Flow::Group("billing".into()), false).await;

    assert_eq!(outcome, FlowOutcome::Completed);
    assert_eq!(summary.total(), 0);
    assert!(output.contains("Error: Endpoint group 'billing' not found"));
    assert!(!output.contains("Success Rate"));
}

#[tokio::test]
async fn list_flow_makes_no_requests() {
    // Nothing is listening, so any request would surface in the output
    let base = closed_port().await;
    let fixture = r#"{
        "authentication": {"register": {"endpoint": "POST /r"}, "login": {"endpoint": "POST /l"}},
        "onboarding": {"start": {"endpoint": "POST /s"}}
    }"#;

    let (outcome, summary, output) = run(base, fixture, Flow::List, false).await;

    assert_eq!(outcome, FlowOutcome::Listed);
    assert_eq!(summary.total(), 0);
    assert!(output.contains("  • authentication (2 endpoints)"));
    assert!(output.contains("  • onboarding (1 endpoints)"));
    assert!(!output.contains("Health Check"));
}

#[tokio::test]
async fn verbose_prints_request_and_response() {
    let router = healthy().route(
        "/api/auth/register",
        post(|| async { (StatusCode::CREATED, Json(json!({"user_id": "u-1"}))) }),
    );
    let base = spawn_mock(router).await;

    let (_, _, output) = run(base.clone(), REGISTER, Flow::Full, true).await;

    assert!(output.contains("Testing: authentication.register"));
    assert!(output.contains(&format!("URL: {}/api/auth/register", base)));
    assert!(output.contains("Status: 201"));
    assert!(output.contains("\"user_id\": \"u-1\""));
}

#[tokio::test]
async fn missing_fixture_is_fatal() {
    let config = RunnerConfig {
        fixture: "/nonexistent/sample-requests.json".into(),
        ..Default::default()
    };
    assert!(matches!(
        ApiRunner::from_config(config),
        Err(apiprobe_runner::RunnerError::FixtureNotFound { .. })
    ));
}

#[tokio::test]
async fn unhealthy_status_closes_full_run() {
    let router = Router::new()
        .route("/health", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route(
            "/api/auth/register",
            post(|| async { StatusCode::CREATED }),
        );
    let base = spawn_mock(router).await;

    let (outcome, summary, output) = run(base, REGISTER, Flow::Full, false).await;

    assert_eq!(
        outcome,
        FlowOutcome::HealthGateClosed(apiprobe_runner::HealthStatus::Unhealthy(
            "Unexpected status code: 503".to_string()
        ))
    );
    assert_eq!(summary.total(), 0);
    assert!(output.contains("✗ Health Check\n  Unexpected status code: 503"));
    assert!(!output.contains("authentication.register"));
}

#[tokio::test]
async fn delete_sends_no_body() {
    let router = healthy().route(
        "/api/sessions/s1",
        delete(|body: Bytes| async move {
            if body.is_empty() {
                StatusCode::OK
            } else {
                StatusCode::BAD_REQUEST
            }
        }),
    );
    let base = spawn_mock(router).await;

    let fixture = r#"{
        "sessions": {
            "end": {
                "endpoint": "DELETE /api/sessions/{session_id}",
                "request": {"session_id": "s1", "reason": "cleanup"}
            }
        }
    }"#;

    let (_, summary, output) = run(base, fixture, Flow::Full, false).await;

    assert_eq!(summary.passed(), 1, "{}", output);
    assert_eq!(summary.failed(), 0);
}
