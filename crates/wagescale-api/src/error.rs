//! API 에러 응답 타입.
//!
//! 모든 엔드포인트는 실패 시 같은 JSON 형식을 반환합니다.
//!
//! ```json
//! {
//!   "code": "DATA_UNAVAILABLE",
//!   "message": "병합 기준표가 아직 생성되지 않았습니다",
//!   "timestamp": 1738300800
//! }
//! ```

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use wagescale_core::ConversionError;

/// API 에러 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "DATA_UNAVAILABLE", "INVALID_INPUT")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    pub timestamp: i64,
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// 상태 코드와 함께 핸들러 에러로 변환.
    pub fn with_status(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }

    /// 병합 기준표 없음 (503)
    pub fn data_unavailable(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        Self::new("DATA_UNAVAILABLE", message).with_status(StatusCode::SERVICE_UNAVAILABLE)
    }

    /// 잘못된 요청 (400)
    pub fn invalid_input(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        Self::new("INVALID_INPUT", message).with_status(StatusCode::BAD_REQUEST)
    }

    /// 서버 내부 오류 (500)
    pub fn internal(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        Self::new("INTERNAL_ERROR", message).with_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// 파이프라인 실행 중 (409)
    pub fn pipeline_busy() -> (StatusCode, Json<Self>) {
        Self::new("PIPELINE_BUSY", "파이프라인이 이미 실행 중입니다")
            .with_status(StatusCode::CONFLICT)
    }
}

impl From<ConversionError> for ApiErrorResponse {
    fn from(err: ConversionError) -> Self {
        let code = match err {
            ConversionError::UnknownCountry(_) => "UNKNOWN_COUNTRY",
            ConversionError::InvalidAmount(_) => "INVALID_INPUT",
            ConversionError::InvalidFactor { .. } => "INVALID_DATA",
        };
        Self::new(code, err.to_string())
    }
}

/// 환산 에러를 상태 코드가 포함된 핸들러 에러로 변환.
pub fn conversion_error(err: ConversionError) -> (StatusCode, Json<ApiErrorResponse>) {
    let status = match err {
        ConversionError::UnknownCountry(_) => StatusCode::NOT_FOUND,
        ConversionError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
        ConversionError::InvalidFactor { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };
    ApiErrorResponse::from(err).with_status(status)
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}
