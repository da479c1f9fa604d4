//! 설정 관리.
//!
//! 이 모듈은 파이프라인과 API 서버가 함께 사용하는 설정을 정의합니다.
//! 로드 순서: 기본값 → TOML 파일(선택) → `WAGESCALE__*` 환경 변수.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 스냅샷 저장 경로 설정
    pub storage: StorageConfig,
    /// HTTP 요청/재시도 설정
    pub http: HttpConfig,
    /// 외부 데이터 소스 설정
    pub sources: SourcesConfig,
    /// 파이프라인 스케줄 설정
    pub schedule: ScheduleConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: 30,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 스냅샷 파일 경로 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 데이터 루트 디렉토리
    pub data_dir: PathBuf,
    /// 수집 데이터 하위 디렉토리
    pub fetched_dir: String,
    /// 병합 결과 하위 디렉토리
    pub generated_dir: String,
    pub ppp_file: String,
    pub exchange_rate_file: String,
    pub currency_file: String,
    pub merged_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            fetched_dir: "fetched".to_string(),
            generated_dir: "generated".to_string(),
            ppp_file: "ppp_data.csv".to_string(),
            exchange_rate_file: "exchange_rate_data.csv".to_string(),
            currency_file: "currency_data.csv".to_string(),
            merged_file: "final_merged_data.csv".to_string(),
        }
    }
}

impl StorageConfig {
    /// 주어진 루트 디렉토리를 사용하는 기본 설정.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn fetched_path(&self) -> PathBuf {
        self.data_dir.join(&self.fetched_dir)
    }

    pub fn generated_path(&self) -> PathBuf {
        self.data_dir.join(&self.generated_dir)
    }

    pub fn ppp_path(&self) -> PathBuf {
        self.fetched_path().join(&self.ppp_file)
    }

    pub fn exchange_rate_path(&self) -> PathBuf {
        self.fetched_path().join(&self.exchange_rate_file)
    }

    pub fn currency_path(&self) -> PathBuf {
        self.fetched_path().join(&self.currency_file)
    }

    pub fn merged_path(&self) -> PathBuf {
        self.generated_path().join(&self.merged_file)
    }
}

/// HTTP 요청 및 재시도 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 요청당 타임아웃 (초)
    pub timeout_secs: u64,
    /// 최대 시도 횟수 (첫 요청 포함)
    pub max_attempts: u32,
    /// 재시도 간 고정 대기 시간 (밀리초)
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_attempts: 5,
            retry_delay_ms: 1000,
        }
    }
}

impl HttpConfig {
    /// 요청 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 재시도 간 대기 시간을 Duration으로 반환
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// 외부 데이터 소스 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub ppp: PppSourceConfig,
    pub exchange_rate: ExchangeRateSourceConfig,
    pub currency: CurrencySourceConfig,
}

/// World Bank PPP 지표 API 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PppSourceConfig {
    /// 지표 엔드포인트 URL
    pub url: String,
    /// 페이지당 레코드 수
    pub per_page: u32,
    /// 조회 시작 연도
    pub start_year: i32,
    /// 조회 종료 연도
    pub end_year: i32,
}

impl Default for PppSourceConfig {
    fn default() -> Self {
        Self {
            url: "https://api.worldbank.org/v2/country/all/indicator/PA.NUS.PPP".to_string(),
            per_page: 10000,
            start_year: 2019,
            end_year: 2022,
        }
    }
}

/// Open Exchange Rates API 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExchangeRateSourceConfig {
    /// latest.json 엔드포인트 URL
    pub url: String,
    /// 기준 통화
    pub base: String,
    /// API app id (로그에 출력하지 않음)
    #[serde(skip_serializing)]
    pub app_id: Option<String>,
}

impl Default for ExchangeRateSourceConfig {
    fn default() -> Self {
        Self {
            url: "https://openexchangerates.org/api/latest.json".to_string(),
            base: "USD".to_string(),
            app_id: None,
        }
    }
}

impl std::fmt::Debug for ExchangeRateSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeRateSourceConfig")
            .field("url", &self.url)
            .field("base", &self.base)
            .field("app_id", &self.app_id.as_ref().map(|_| "***"))
            .finish()
    }
}

/// 통화 코드 참조 CSV 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CurrencySourceConfig {
    /// CSV 리소스 URL
    pub url: String,
}

impl Default for CurrencySourceConfig {
    fn default() -> Self {
        Self {
            url: "https://datahub.io/core/currency-codes/r/0.csv".to_string(),
        }
    }
}

/// 단계 실패 시 파이프라인 진행 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePolicy {
    /// 첫 실패 단계에서 중단하고 나머지 단계는 건너뜀
    #[default]
    HaltOnFailure,
    /// 이전 단계 결과와 무관하게 모든 단계 실행
    Continue,
}

/// 파이프라인 스케줄 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// 실행 주기 (시간)
    pub interval_hours: u64,
    /// 시작 시 즉시 실행 여부
    pub run_on_startup: bool,
    /// 단계 실패 처리 정책
    pub stage_policy: StagePolicy,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_hours: 24,
            run_on_startup: true,
            stage_policy: StagePolicy::HaltOnFailure,
        }
    }
}

impl ScheduleConfig {
    /// 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours.saturating_mul(60 * 60))
    }
}

impl AppConfig {
    /// 파일(선택)과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let builder = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("WAGESCALE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}
