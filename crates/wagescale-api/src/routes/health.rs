//! 헬스 체크 endpoint.
//!
//! readiness는 병합 기준표 존재 여부로 판단합니다.

use std::path::Path;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// 스냅샷 파일 상태.
#[derive(Debug, Serialize)]
pub struct SnapshotStatus {
    /// 스냅샷 이름 (ppp, exchange_rate, currency, merged)
    pub name: &'static str,
    pub path: String,
    pub present: bool,
    /// 마지막 수정 시간 (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

/// 마지막 파이프라인 실행 요약.
#[derive(Debug, Serialize)]
pub struct LastRunSummary {
    pub finished_at: String,
    pub success: bool,
    pub failed_stages: Vec<String>,
}

/// readiness 응답.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// "ready" | "not_ready"
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
    pub timestamp: String,
    pub snapshots: Vec<SnapshotStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<LastRunSummary>,
}

async fn snapshot_status(name: &'static str, path: &Path) -> SnapshotStatus {
    let metadata = tokio::fs::metadata(path).await.ok().filter(|m| m.is_file());
    let modified_at = metadata
        .as_ref()
        .and_then(|m| m.modified().ok())
        .map(|t| DateTime::<Utc>::from(t).to_rfc3339());

    SnapshotStatus {
        name,
        path: path.display().to_string(),
        present: metadata.is_some(),
        modified_at,
    }
}

/// 간단한 헬스 체크 (liveness probe용).
///
/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 스냅샷 상태 확인 (readiness probe용).
///
/// 병합 기준표가 없으면 503을 반환합니다.
/// GET /health/ready
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let paths = state.pipeline.snapshot_paths();
    let snapshots = vec![
        snapshot_status("ppp", &paths.ppp).await,
        snapshot_status("exchange_rate", &paths.exchange_rate).await,
        snapshot_status("currency", &paths.currency).await,
        snapshot_status("merged", &paths.merged).await,
    ];

    let ready = snapshots.iter().any(|s| s.name == "merged" && s.present);
    let (status, status_code) = if ready {
        ("ready", StatusCode::OK)
    } else {
        ("not_ready", StatusCode::SERVICE_UNAVAILABLE)
    };

    let last_run = state
        .pipeline
        .last_report()
        .await
        .map(|report| LastRunSummary {
            finished_at: report.finished_at.to_rfc3339(),
            success: report.success,
            failed_stages: report
                .failed_stages()
                .into_iter()
                .map(String::from)
                .collect(),
        });

    let response = ReadinessResponse {
        status: status.to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: Utc::now().to_rfc3339(),
        snapshots,
        last_run,
    };

    (status_code, Json(response))
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
