//! API 라우트.

pub mod conversion;
pub mod health;
pub mod pipeline;

pub use conversion::{conversion_router, ConvertQuery, CountriesResponse};
pub use health::{health_router, ReadinessResponse, SnapshotStatus};
pub use pipeline::pipeline_router;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // API v1 엔드포인트
        .nest("/api/v1", conversion_router())
        .nest("/api/v1/pipeline", pipeline_router())
}
