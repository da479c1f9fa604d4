//! 급여 환산 에러 타입.

use thiserror::Error;

/// 환산 기준표 조회/계산 에러.
#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    /// 기준표에 없는 국가
    #[error("알 수 없는 국가: {0}")]
    UnknownCountry(String),

    /// 잘못된 금액 (음수, NaN 등)
    #[error("잘못된 금액: {0}")]
    InvalidAmount(f64),

    /// 0 이하이거나 유한하지 않은 환산 계수
    #[error("잘못된 환산 계수 ({country}): {factor}")]
    InvalidFactor { country: String, factor: f64 },
}

/// 환산 작업을 위한 Result 타입.
pub type ConversionResult<T> = Result<T, ConversionError>;
