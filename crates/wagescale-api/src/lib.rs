//! WageScale REST API.
//!
//! 병합 기준표 조회, 급여 환산, 파이프라인 수동 실행을 제공합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 스냅샷 상태 (readiness)
//! - `/api/v1/countries` - 병합 기준표
//! - `/api/v1/convert` - 급여 환산
//! - `/api/v1/pipeline/run` - 파이프라인 수동 실행

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use routes::create_api_router;
pub use state::AppState;
