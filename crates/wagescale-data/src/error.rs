//! 데이터 모듈 오류 타입.

use std::path::PathBuf;

use thiserror::Error;

/// 데이터 수집/저장 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 네트워크/연결 오류
    #[error("Network error: {0}")]
    Network(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 2xx 이외의 HTTP 응답
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),

    /// 필터링 후 사용할 레코드가 없음
    #[error("No usable records from {0}")]
    Empty(String),

    /// 필요한 스냅샷 파일이 없음
    #[error("Snapshot missing: {}", .0.display())]
    MissingSnapshot(PathBuf),

    /// CSV 읽기/쓰기 오류
    #[error("CSV error: {0}")]
    Csv(String),

    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// 재시도 가능한 에러인지 확인.
    ///
    /// 네트워크 오류, 타임아웃, 5xx/408/429 응답만 재시도합니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            DataError::Network(_) | DataError::Timeout(_) => true,
            DataError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else if err.is_decode() {
            DataError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            DataError::HttpStatus {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            // 연결 실패, 요청 전송/본문 수신 실패 등
            DataError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Parse(err.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
