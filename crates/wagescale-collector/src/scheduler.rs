//! 파이프라인 주기 실행 백그라운드 태스크.
//!
//! 시작 시 1회(`run_on_startup`) 실행 후 `interval_hours`마다 반복합니다.
//! 진행 중인 실행은 종료 시그널을 받아도 끝까지 완료합니다.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;
use wagescale_core::ScheduleConfig;

use crate::pipeline::Pipeline;

/// 파이프라인 스케줄러 시작.
///
/// # Arguments
/// * `pipeline` - 실행할 파이프라인 (API 서버의 수동 실행과 공유)
/// * `config` - 스케줄 설정
/// * `shutdown_token` - 종료 시그널 토큰
pub fn start_pipeline_scheduler(
    pipeline: Arc<Pipeline>,
    config: ScheduleConfig,
    shutdown_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_hours = config.interval_hours,
            run_on_startup = config.run_on_startup,
            policy = ?config.stage_policy,
            "파이프라인 스케줄러 시작"
        );

        let mut ticker = interval(config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        if !config.run_on_startup {
            // 첫 tick은 즉시 완료되므로 소비하고 다음 주기부터 실행
            ticker.tick().await;
        }

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = pipeline.run().await;
                    info!(
                        success = report.success,
                        next_run_hours = config.interval_hours,
                        "=== 파이프라인 실행 완료 ==="
                    );
                }
                _ = shutdown_token.cancelled() => {
                    info!("파이프라인 스케줄러: 종료 시그널 수신");
                    break;
                }
            }
        }

        info!("파이프라인 스케줄러 종료됨");
    })
}
