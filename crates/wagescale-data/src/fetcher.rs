//! 재시도와 캐시 폴백을 갖춘 범용 데이터 수집기.
//!
//! # 흐름
//!
//! ```text
//! SkipIfPresent && 스냅샷 있음 ──> Cached
//!         │
//!         ↓
//!   GET (재시도 가능한 에러면 고정 간격으로 재시도)
//!         │
//!   ┌─────┴──────┐
//!  성공         실패 / 빈 데이터 / 파싱 에러
//!   │            │
//! 파싱 → 저장   스냅샷 있음 ? Stale : Failed
//!   │
//! Refreshed
//! ```
//!
//! 어떤 에러도 `run()` 밖으로 전파되지 않으며, 로그로 남긴 뒤
//! [`FetchOutcome`]로 변환됩니다.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn, Instrument};
use wagescale_core::{stage_span, HttpConfig};

use crate::error::{DataError, Result};
use crate::provider::{DataSource, RefreshPolicy};
use crate::storage::{snapshot_exists, write_snapshot};

/// 고정 간격 재시도 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최대 시도 횟수 (첫 요청 포함, 최소 1)
    pub max_attempts: u32,
    /// 시도 간 대기 시간
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}

impl From<&HttpConfig> for RetryPolicy {
    fn from(config: &HttpConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: config.retry_delay(),
        }
    }
}

/// 한 번의 수집 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// 원격에서 새로 받아 스냅샷을 갱신함
    Refreshed { records: usize },
    /// 스냅샷이 이미 있어 요청을 건너뜀
    Cached,
    /// 갱신에 실패했지만 기존 스냅샷을 사용함
    Stale { reason: String },
    /// 갱신 실패, 사용할 스냅샷도 없음
    Failed { reason: String },
}

impl FetchOutcome {
    /// 사용할 수 있는 스냅샷이 있는지 여부.
    pub fn is_success(&self) -> bool {
        !matches!(self, FetchOutcome::Failed { .. })
    }
}

/// 하나의 [`DataSource`]를 스냅샷 파일로 수집하는 컴포넌트.
pub struct Fetcher<S: DataSource> {
    source: S,
    client: reqwest::Client,
    retry: RetryPolicy,
    snapshot_path: PathBuf,
    // 같은 fetcher가 동시에 두 번 실행되어 같은 파일에 쓰는 것을 방지
    lock: Mutex<()>,
}

impl<S: DataSource> Fetcher<S> {
    pub fn new(
        source: S,
        client: reqwest::Client,
        retry: RetryPolicy,
        snapshot_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            client,
            retry,
            snapshot_path: snapshot_path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.source.name()
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// 수집 실행 후 성공 여부만 반환.
    pub async fn fetch(&self) -> bool {
        self.run().await.is_success()
    }

    /// 수집 실행.
    pub async fn run(&self) -> FetchOutcome {
        let span = stage_span!("fetch", self.source.name());
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> FetchOutcome {
        let _guard = self.lock.lock().await;

        if self.source.refresh_policy() == RefreshPolicy::SkipIfPresent
            && snapshot_exists(&self.snapshot_path)
        {
            info!(
                path = %self.snapshot_path.display(),
                "스냅샷이 이미 존재하여 수집을 건너뜀"
            );
            return FetchOutcome::Cached;
        }

        info!("데이터 수집 시작");
        match self.refresh().await {
            Ok(records) => {
                info!(
                    records,
                    path = %self.snapshot_path.display(),
                    "데이터 수집, 파싱, 저장 완료"
                );
                FetchOutcome::Refreshed { records }
            }
            Err(e) => {
                let reason = e.to_string();
                if snapshot_exists(&self.snapshot_path) {
                    warn!(error = %e, "데이터 수집 실패, 기존 스냅샷 사용");
                    FetchOutcome::Stale { reason }
                } else {
                    error!(error = %e, "데이터 수집 실패, 사용할 스냅샷 없음");
                    FetchOutcome::Failed { reason }
                }
            }
        }
    }

    async fn refresh(&self) -> Result<usize> {
        let body = self.request_with_retry().await?;

        let records = self.source.parse(&body)?;
        if records.is_empty() {
            return Err(DataError::Empty(self.source.name().to_string()));
        }
        debug!(records = records.len(), "응답 파싱 완료");

        write_snapshot(&self.snapshot_path, &records)?;
        Ok(records.len())
    }

    async fn request_with_retry(&self) -> Result<Vec<u8>> {
        let mut attempt = 1;
        loop {
            match self.request_once().await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        error = %e,
                        "요청 실패, 재시도 대기"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        warn!(attempt, "최대 재시도 횟수 도달");
                    }
                    return Err(e);
                }
            }
        }
    }

    async fn request_once(&self) -> Result<Vec<u8>> {
        let response = self.source.request(&self.client).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
