//! # WageScale Core
//!
//! WageScale 파이프라인과 API가 공유하는 핵심 타입을 제공합니다:
//! - PPP / 환율 / 통화 / 병합 레코드
//! - 설정 관리 (`AppConfig`)
//! - 로깅 인프라
//! - 급여 환산 계산

pub mod config;
pub mod conversion;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use conversion::{ConversionTable, SalaryConversion};
pub use error::{ConversionError, ConversionResult};
pub use logging::*;
pub use types::*;
