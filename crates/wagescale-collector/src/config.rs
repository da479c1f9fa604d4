//! 설정 파일/환경변수 로드 및 검증.

use std::path::{Path, PathBuf};

use wagescale_core::AppConfig;

use crate::error::CollectorError;
use crate::Result;

/// 설정 파일 경로를 지정하는 환경변수
pub const CONFIG_PATH_ENV: &str = "WAGESCALE_CONFIG";

/// 스케줄 주기 상한 (1년)
pub const MAX_INTERVAL_HOURS: u64 = 24 * 365;

/// `.env`를 읽은 뒤 설정을 로드하고 검증합니다.
///
/// 경로 우선순위: 인자 → `WAGESCALE_CONFIG` → `config/default.toml`.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

    let config = AppConfig::load(path.as_deref())?;
    validate(&config)?;
    Ok(config)
}

/// 파이프라인 실행에 필요한 값 검증.
pub fn validate(config: &AppConfig) -> Result<()> {
    if config.http.max_attempts == 0 {
        return Err(CollectorError::Config(
            "http.max_attempts는 1 이상이어야 합니다".to_string(),
        ));
    }
    let hours = config.schedule.interval_hours;
    if hours == 0 || hours > MAX_INTERVAL_HOURS {
        return Err(CollectorError::Config(format!(
            "schedule.interval_hours는 1 이상 {} 이하여야 합니다: {}",
            MAX_INTERVAL_HOURS, hours
        )));
    }
    let ppp = &config.sources.ppp;
    if ppp.start_year > ppp.end_year {
        return Err(CollectorError::Config(format!(
            "sources.ppp 연도 범위가 잘못되었습니다: {}:{}",
            ppp.start_year, ppp.end_year
        )));
    }
    Ok(())
}
