//! 파이프라인 수동 실행 endpoint.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use tracing::{error, info};
use wagescale_collector::PipelineReport;

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 파이프라인 실행 후 리포트 반환.
///
/// 스케줄러나 다른 요청이 실행 중이면 기다리지 않고 409를 반환합니다.
/// 실행은 별도 태스크에서 진행되므로 요청 타임아웃이나 연결 종료로
/// 응답 future가 drop되어도 끝까지 완료되고 `last_report`에 기록됩니다.
/// POST /api/v1/pipeline/run
pub async fn run_pipeline(State(state): State<Arc<AppState>>) -> ApiResult<Json<PipelineReport>> {
    info!("API 요청으로 파이프라인 실행");
    let pipeline = Arc::clone(&state.pipeline);
    let report = tokio::spawn(async move { pipeline.try_run().await })
        .await
        .map_err(|e| {
            error!(error = %e, "파이프라인 실행 태스크 실패");
            ApiErrorResponse::internal("파이프라인 실행 중 오류가 발생했습니다")
        })?
        .ok_or_else(ApiErrorResponse::pipeline_busy)?;

    Ok(Json(report))
}

/// 파이프라인 라우터 생성.
pub fn pipeline_router() -> Router<Arc<AppState>> {
    Router::new().route("/run", post(run_pipeline))
}
