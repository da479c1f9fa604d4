//! 애플리케이션 상태.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use wagescale_collector::Pipeline;
use wagescale_core::AppConfig;

/// 모든 핸들러가 공유하는 상태.
pub struct AppState {
    /// 로드된 설정
    pub config: AppConfig,

    /// 스케줄러와 공유하는 파이프라인
    pub pipeline: Arc<Pipeline>,

    /// 서버 시작 시간
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    pub fn new(config: AppConfig, pipeline: Arc<Pipeline>) -> Self {
        Self {
            config,
            pipeline,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임(초)
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }

    /// 병합 기준표 파일 경로
    pub fn merged_path(&self) -> PathBuf {
        self.pipeline.merged_path()
    }
}
