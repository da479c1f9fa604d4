//! `tower::ServiceExt::oneshot`을 이용한 API 라우트 통합 테스트.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use wagescale_api::{create_api_router, AppState};
use wagescale_collector::Pipeline;
use tower_http::timeout::TimeoutLayer;
use wagescale_collector::StageStatus;
use wagescale_core::{AppConfig, MergedRecord, StagePolicy, StorageConfig};
use wagescale_data::write_snapshot;

fn test_config(data_dir: &Path, server_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage = StorageConfig::with_data_dir(data_dir);
    config.http.timeout_secs = 1;
    config.http.max_attempts = 1;
    config.http.retry_delay_ms = 1;
    config.sources.ppp.url = format!("{}/ppp", server_url);
    config.sources.exchange_rate.url = format!("{}/latest.json", server_url);
    config.sources.currency.url = format!("{}/currency.csv", server_url);
    config
}

fn app_with(config: AppConfig) -> (Router, Arc<AppState>) {
    let pipeline = Arc::new(Pipeline::from_config(&config).unwrap());
    let state = Arc::new(AppState::new(config, pipeline));
    (create_api_router().with_state(Arc::clone(&state)), state)
}

fn write_merged(state: &AppState) {
    write_snapshot(
        &state.merged_path(),
        &[
            MergedRecord {
                country: "Germany".to_string(),
                alphabetic_code: "EUR".to_string(),
                value: 0.75,
                exchange_rate: 0.92,
            },
            MergedRecord {
                country: "India".to_string(),
                alphabetic_code: "INR".to_string(),
                value: 22.5,
                exchange_rate: 90.0,
            },
        ],
    )
    .unwrap();
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_is_ok_without_data() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path(), "http://127.0.0.1:1"));

    let (status, _) = send(app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_ready_reports_missing_merged_table() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path(), "http://127.0.0.1:1"));

    let (status, body) = send(app, "GET", "/health/ready").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["snapshots"].as_array().unwrap().len(), 4);
    assert_eq!(body["snapshots"][3]["name"], "merged");
    assert_eq!(body["snapshots"][3]["present"], false);
}

#[tokio::test]
async fn test_ready_when_merged_table_present() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app_with(test_config(dir.path(), "http://127.0.0.1:1"));
    write_merged(&state);

    let (status, body) = send(app, "GET", "/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert!(body["snapshots"][3]["modified_at"].is_string());
}

#[tokio::test]
async fn test_missing_data_yields_data_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app_with(test_config(dir.path(), "http://127.0.0.1:1"));

    let (status, body) = send(app.clone(), "GET", "/api/v1/countries").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "DATA_UNAVAILABLE");
    assert!(body["timestamp"].is_i64());

    let (status, body) = send(app, "GET", "/api/v1/convert?amount=100&from=India&to=Germany").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "DATA_UNAVAILABLE");
}

#[tokio::test]
async fn test_list_countries() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app_with(test_config(dir.path(), "http://127.0.0.1:1"));
    write_merged(&state);

    let (status, body) = send(app, "GET", "/api/v1/countries").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["countries"][0]["Country"], "Germany");
    assert_eq!(body["countries"][1]["AlphabeticCode"], "INR");
}

#[tokio::test]
async fn test_convert_salary() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app_with(test_config(dir.path(), "http://127.0.0.1:1"));
    write_merged(&state);

    let (status, body) = send(app, "GET", "/api/v1/convert?amount=45000&from=india&to=GERMANY").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["from_currency"], "INR");
    assert_eq!(body["to_currency"], "EUR");
    // 45000 / 22.5 * 0.75
    assert!((body["ppp_equivalent"].as_f64().unwrap() - 1500.0).abs() < 1e-9);
    // 45000 / 90 * 0.92
    assert!((body["nominal_equivalent"].as_f64().unwrap() - 460.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_convert_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app_with(test_config(dir.path(), "http://127.0.0.1:1"));
    write_merged(&state);

    let (status, body) = send(app.clone(), "GET", "/api/v1/convert?amount=100&from=Atlantis&to=India").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "UNKNOWN_COUNTRY");

    let (status, body) = send(app.clone(), "GET", "/api/v1/convert?amount=-5&from=India&to=Germany").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) = send(app, "GET", "/api/v1/convert?from=India&to=Germany").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_pipeline_run_returns_report() {
    let mut server = mockito::Server::new_async().await;
    let _ppp = server
        .mock("GET", "/ppp")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"page": 1, "pages": 1}, [{"country": {"value": "India"}, "date": "2022", "value": 22.5}]]"#)
        .create_async()
        .await;
    let _rates = server
        .mock("GET", "/latest.json")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"rates": {"INR": 90.0}}"#)
        .create_async()
        .await;
    let _currency = server
        .mock("GET", "/currency.csv")
        .with_status(200)
        .with_body("Entity,Currency,AlphabeticCode,WithdrawalDate\nINDIA,Indian Rupee,INR,\n")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app_with(test_config(dir.path(), &server.url()));

    let (status, body) = send(app.clone(), "POST", "/api/v1/pipeline/run").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["stages"].as_array().unwrap().len(), 4);
    assert!(state.merged_path().exists());

    let (status, body) = send(app, "GET", "/api/v1/countries").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_pipeline_run_conflict_while_busy() {
    // 연결은 받지만 응답하지 않는 서버
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app_with(test_config(dir.path(), &url));

    let running = tokio::spawn({
        let pipeline = Arc::clone(&state.pipeline);
        async move { pipeline.run().await }
    });
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (status, body) = send(app, "POST", "/api/v1/pipeline/run").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "PIPELINE_BUSY");

    assert!(!running.await.unwrap().success);
    drop(listener);
}

#[tokio::test]
async fn test_pipeline_run_survives_request_timeout() {
    // 연결은 받지만 응답하지 않는 서버
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path(), &url);
    config.schedule.stage_policy = StagePolicy::Continue;
    let (app, state) = app_with(config);
    let app = app.layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_millis(100),
    ));

    let (status, _) = send(app, "POST", "/api/v1/pipeline/run").await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);

    // 응답이 끊겨도 실행은 모든 단계를 마치고 리포트를 남겨야 함
    let mut report = None;
    for _ in 0..200 {
        report = state.pipeline.last_report().await;
        if report.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let report = report.expect("pipeline run was abandoned");
    assert_eq!(report.stages.len(), 4);
    assert!(report
        .stages
        .iter()
        .all(|s| s.status != StageStatus::Skipped));
    assert_eq!(
        report.failed_stages(),
        vec!["ppp", "exchange_rate", "currency", "merge"]
    );
    drop(listener);
}
