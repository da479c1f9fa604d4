//! 파이프라인 실행 리포트.

use chrono::{DateTime, Utc};
use serde::Serialize;
use wagescale_core::StagePolicy;
use wagescale_data::FetchOutcome;

/// 단계 실행 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// 사용할 수 있는 결과를 남김 (갱신/캐시/이전 스냅샷)
    Succeeded,
    /// 실패
    Failed,
    /// 이전 단계 실패로 실행하지 않음
    Skipped,
}

/// 단계별 실행 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    /// 단계 이름 (ppp, exchange_rate, currency, merge)
    pub stage: String,
    pub status: StageStatus,
    /// 수집 단계의 상세 결과 (병합/건너뜀 단계는 없음)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<FetchOutcome>,
    /// 소요 시간 (ms)
    pub elapsed_ms: u64,
}

impl StageReport {
    /// 실행하지 않은 단계
    pub fn skipped(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::Skipped,
            outcome: None,
            elapsed_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Succeeded
    }
}

/// 파이프라인 1회 실행 리포트
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub policy: StagePolicy,
    pub stages: Vec<StageReport>,
    /// 모든 단계 성공 여부
    pub success: bool,
}

impl PipelineReport {
    /// 실패한 단계 이름 목록
    pub fn failed_stages(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|s| s.status == StageStatus::Failed)
            .map(|s| s.stage.as_str())
            .collect()
    }

    /// 실행 시간 (ms)
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// 리포트 요약 로그 출력
    pub fn log_summary(&self) {
        let count = |status: StageStatus| self.stages.iter().filter(|s| s.status == status).count();

        if self.success {
            tracing::info!(
                policy = ?self.policy,
                succeeded = count(StageStatus::Succeeded),
                elapsed = format!("{:.1}s", self.elapsed_ms() as f64 / 1000.0),
                "파이프라인 완료"
            );
        } else {
            tracing::warn!(
                policy = ?self.policy,
                succeeded = count(StageStatus::Succeeded),
                failed = ?self.failed_stages(),
                skipped = count(StageStatus::Skipped),
                elapsed = format!("{:.1}s", self.elapsed_ms() as f64 / 1000.0),
                "파이프라인 실패"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(name: &str, status: StageStatus) -> StageReport {
        StageReport {
            stage: name.to_string(),
            status,
            outcome: None,
            elapsed_ms: 3,
        }
    }

    #[test]
    fn test_failed_stages() {
        let now = Utc::now();
        let report = PipelineReport {
            started_at: now,
            finished_at: now,
            policy: StagePolicy::HaltOnFailure,
            stages: vec![
                stage("ppp", StageStatus::Succeeded),
                stage("exchange_rate", StageStatus::Failed),
                StageReport::skipped("currency"),
                StageReport::skipped("merge"),
            ],
            success: false,
        };

        assert_eq!(report.failed_stages(), vec!["exchange_rate"]);
        assert_eq!(report.elapsed_ms(), 0);
    }

    #[test]
    fn test_report_json_shape() {
        let now = Utc::now();
        let report = PipelineReport {
            started_at: now,
            finished_at: now,
            policy: StagePolicy::Continue,
            stages: vec![StageReport {
                stage: "ppp".to_string(),
                status: StageStatus::Succeeded,
                outcome: Some(FetchOutcome::Refreshed { records: 2 }),
                elapsed_ms: 10,
            }],
            success: true,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["policy"], "continue");
        assert_eq!(json["stages"][0]["status"], "succeeded");
        assert_eq!(json["stages"][0]["outcome"]["status"], "refreshed");
        assert_eq!(json["stages"][0]["outcome"]["records"], 2);

        let skipped = serde_json::to_value(StageReport::skipped("merge")).unwrap();
        assert!(skipped.get("outcome").is_none());
    }
}
