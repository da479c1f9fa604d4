//! WageScale 기준 데이터 수집 CLI.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use wagescale_collector::{
    load_config, start_pipeline_scheduler, CollectorError, Pipeline, Stage,
};
use wagescale_core::{init_logging, LogConfig};

#[derive(Parser)]
#[command(name = "wagescale-collector")]
#[command(about = "WageScale PPP / exchange-rate / currency data collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로 (기본: $WAGESCALE_CONFIG 또는 config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error). 지정 시 설정 파일보다 우선
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// World Bank PPP 데이터 수집
    FetchPpp,

    /// Open Exchange Rates 환율 수집
    FetchRates,

    /// 통화 코드 참조 데이터 수집 (이미 있으면 건너뜀)
    FetchCurrencies,

    /// 수집된 스냅샷 병합
    Merge,

    /// 전체 파이프라인 실행 (PPP → 환율 → 통화 → 병합)
    Run,

    /// 데몬 모드: 시작 시 1회 + 주기적으로 전체 파이프라인 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    let mut log_config = LogConfig::from_app(&config.logging);
    if let Some(level) = cli.log_level {
        log_config.level = level;
    }
    init_logging(log_config)?;

    tracing::info!("WageScale Data Collector 시작");
    tracing::debug!(?config, "설정 로드 완료");

    let pipeline = Arc::new(Pipeline::from_config(&config)?);

    match cli.command {
        Commands::FetchPpp => run_single(&pipeline, Stage::Ppp).await?,
        Commands::FetchRates => run_single(&pipeline, Stage::ExchangeRate).await?,
        Commands::FetchCurrencies => run_single(&pipeline, Stage::Currency).await?,
        Commands::Merge => run_single(&pipeline, Stage::Merge).await?,
        Commands::Run => {
            let report = pipeline.run().await;
            print_json(&report)?;
            if !report.success {
                return Err(CollectorError::PipelineFailed(format!(
                    "failed stages: {}",
                    report.failed_stages().join(", ")
                ))
                .into());
            }
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}시간) ===",
                config.schedule.interval_hours
            );

            let shutdown_token = CancellationToken::new();
            let handle = start_pipeline_scheduler(
                Arc::clone(&pipeline),
                config.schedule.clone(),
                shutdown_token.clone(),
            );

            tokio::signal::ctrl_c().await?;
            tracing::info!("종료 신호 수신, 데몬 종료 중...");
            shutdown_token.cancel();
            handle.await?;
        }
    }

    tracing::info!("WageScale Data Collector 종료");

    Ok(())
}

/// 단계 하나를 실행하고 결과를 stdout에 JSON으로 출력.
async fn run_single(pipeline: &Pipeline, stage: Stage) -> Result<(), Box<dyn std::error::Error>> {
    let report = pipeline.run_stage(stage).await;
    print_json(&report)?;
    if !report.is_success() {
        return Err(CollectorError::PipelineFailed(format!("stage {} failed", stage)).into());
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
