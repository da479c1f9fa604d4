//! PPP → 환율 → 통화 → 병합 파이프라인.
//!
//! 한 번에 하나의 실행만 허용합니다. `run()`은 진행 중인 실행이 끝날 때까지
//! 기다리고, `try_run()`은 바로 `None`을 반환합니다.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};
use wagescale_core::{AppConfig, StagePolicy};
use wagescale_data::{
    CurrencyCodesSource, FetchOutcome, Fetcher, Merger, OpenExchangeRatesSource, RetryPolicy,
    SnapshotPaths, WorldBankPppSource,
};

use crate::error::Result;
use crate::stats::{PipelineReport, StageReport, StageStatus};

/// 파이프라인 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ppp,
    ExchangeRate,
    Currency,
    Merge,
}

impl Stage {
    /// 실행 순서
    pub const ALL: [Stage; 4] = [
        Stage::Ppp,
        Stage::ExchangeRate,
        Stage::Currency,
        Stage::Merge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ppp => "ppp",
            Stage::ExchangeRate => "exchange_rate",
            Stage::Currency => "currency",
            Stage::Merge => "merge",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 수집기 3개와 병합기를 묶은 파이프라인.
pub struct Pipeline {
    ppp: Fetcher<WorldBankPppSource>,
    exchange_rate: Fetcher<OpenExchangeRatesSource>,
    currency: Fetcher<CurrencyCodesSource>,
    merger: Merger,
    policy: StagePolicy,
    run_lock: Mutex<()>,
    last_report: RwLock<Option<PipelineReport>>,
}

impl Pipeline {
    /// 설정으로부터 HTTP 클라이언트를 만들어 파이프라인 생성.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http.timeout())
            .user_agent(concat!("wagescale/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(config, client))
    }

    /// 주어진 HTTP 클라이언트로 파이프라인 생성.
    pub fn with_client(config: &AppConfig, client: reqwest::Client) -> Self {
        let paths = SnapshotPaths::from_storage(&config.storage);
        let retry = RetryPolicy::from(&config.http);
        let sources = &config.sources;

        Self {
            ppp: Fetcher::new(
                WorldBankPppSource::new(&sources.ppp),
                client.clone(),
                retry,
                paths.ppp.clone(),
            ),
            exchange_rate: Fetcher::new(
                OpenExchangeRatesSource::new(&sources.exchange_rate),
                client.clone(),
                retry,
                paths.exchange_rate.clone(),
            ),
            currency: Fetcher::new(
                CurrencyCodesSource::new(&sources.currency),
                client,
                retry,
                paths.currency.clone(),
            ),
            merger: Merger::new(paths),
            policy: config.schedule.stage_policy,
            run_lock: Mutex::new(()),
            last_report: RwLock::new(None),
        }
    }

    pub fn policy(&self) -> StagePolicy {
        self.policy
    }

    pub fn snapshot_paths(&self) -> &SnapshotPaths {
        self.merger.paths()
    }

    /// 최종 병합 파일 경로
    pub fn merged_path(&self) -> PathBuf {
        self.merger.paths().merged.clone()
    }

    /// 마지막 실행 리포트
    pub async fn last_report(&self) -> Option<PipelineReport> {
        self.last_report.read().await.clone()
    }

    /// 단계 하나만 실행.
    pub async fn run_stage(&self, stage: Stage) -> StageReport {
        let started = Instant::now();
        let (status, outcome) = match stage {
            Stage::Ppp => fetch_status(self.ppp.run()).await,
            Stage::ExchangeRate => fetch_status(self.exchange_rate.run()).await,
            Stage::Currency => fetch_status(self.currency.run()).await,
            Stage::Merge => (self.merge().await, None),
        };

        StageReport {
            stage: stage.to_string(),
            status,
            outcome,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// 전체 파이프라인 실행. 다른 실행이 진행 중이면 끝날 때까지 대기.
    pub async fn run(&self) -> PipelineReport {
        let _guard = self.run_lock.lock().await;
        self.run_locked().await
    }

    /// 다른 실행이 진행 중이면 `None`을 반환.
    pub async fn try_run(&self) -> Option<PipelineReport> {
        let _guard = self.run_lock.try_lock().ok()?;
        Some(self.run_locked().await)
    }

    async fn run_locked(&self) -> PipelineReport {
        let started_at = Utc::now();
        info!(policy = ?self.policy, "=== 파이프라인 시작 ===");

        let mut stages = Vec::with_capacity(Stage::ALL.len());
        let mut halted = false;
        for (idx, stage) in Stage::ALL.into_iter().enumerate() {
            if halted {
                stages.push(StageReport::skipped(stage.as_str()));
                continue;
            }

            info!("Step {}/{}: {}", idx + 1, Stage::ALL.len(), stage);
            let report = self.run_stage(stage).await;
            if !report.is_success() && self.policy == StagePolicy::HaltOnFailure {
                warn!(stage = %stage, "단계 실패, 남은 단계를 건너뜀");
                halted = true;
            }
            stages.push(report);
        }

        let success = stages.iter().all(StageReport::is_success);
        let report = PipelineReport {
            started_at,
            finished_at: Utc::now(),
            policy: self.policy,
            stages,
            success,
        };
        report.log_summary();

        *self.last_report.write().await = Some(report.clone());
        report
    }

    async fn merge(&self) -> StageStatus {
        let merger = self.merger.clone();
        match tokio::task::spawn_blocking(move || merger.merge()).await {
            Ok(true) => StageStatus::Succeeded,
            Ok(false) => StageStatus::Failed,
            Err(e) => {
                error!(error = %e, "병합 작업 실행 실패");
                StageStatus::Failed
            }
        }
    }
}

async fn fetch_status(
    run: impl Future<Output = FetchOutcome>,
) -> (StageStatus, Option<FetchOutcome>) {
    let outcome = run.await;
    let status = if outcome.is_success() {
        StageStatus::Succeeded
    } else {
        StageStatus::Failed
    };
    (status, Some(outcome))
}
