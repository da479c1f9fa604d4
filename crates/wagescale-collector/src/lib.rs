//! WageScale 기준 데이터 수집 파이프라인.
//!
//! 이 crate는 API 서버와 독립적으로도 실행 가능한 수집기를 제공합니다:
//! - PPP → 환율 → 통화 → 병합 순서의 파이프라인 (`Pipeline`)
//! - 시작 시 1회 + 주기 실행 스케줄러
//! - 실행 결과 리포트 (`PipelineReport`)

pub mod config;
pub mod error;
pub mod pipeline;
pub mod scheduler;
pub mod stats;

pub use config::load_config;
pub use error::{CollectorError, Result};
pub use pipeline::{Pipeline, Stage};
pub use scheduler::start_pipeline_scheduler;
pub use stats::{PipelineReport, StageReport, StageStatus};
