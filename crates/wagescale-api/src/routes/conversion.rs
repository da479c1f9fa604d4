//! 병합 기준표 조회 및 급여 환산 endpoint.
//!
//! 요청마다 병합 파일을 읽으므로 파이프라인이 갱신한 내용이 바로 반영됩니다.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use wagescale_core::{ConversionTable, MergedRecord, SalaryConversion};
use wagescale_data::parse_snapshot;

use crate::error::{conversion_error, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 국가 목록 응답.
#[derive(Debug, Serialize)]
pub struct CountriesResponse {
    pub count: usize,
    pub countries: Vec<MergedRecord>,
}

/// 환산 요청 쿼리.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    /// 출발 국가 기준 급여
    pub amount: f64,
    /// 출발 국가명
    pub from: String,
    /// 도착 국가명
    pub to: String,
}

/// 병합 기준표 로드. 파일이 없거나 읽을 수 없으면 503.
async fn load_table(path: &Path) -> ApiResult<ConversionTable> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "병합 기준표 없음");
            return Err(ApiErrorResponse::data_unavailable(
                "병합 기준표가 아직 생성되지 않았습니다",
            ));
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "병합 기준표 읽기 실패");
            return Err(ApiErrorResponse::data_unavailable(
                "병합 기준표를 읽을 수 없습니다",
            ));
        }
    };

    let records: Vec<MergedRecord> = parse_snapshot(bytes.as_slice()).map_err(|e| {
        error!(path = %path.display(), error = %e, "병합 기준표 파싱 실패");
        ApiErrorResponse::data_unavailable("병합 기준표 형식이 올바르지 않습니다")
    })?;

    Ok(ConversionTable::from_records(records))
}

/// 병합 기준표 전체 조회.
///
/// GET /api/v1/countries
pub async fn list_countries(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CountriesResponse>> {
    let table = load_table(&state.merged_path()).await?;
    let countries: Vec<MergedRecord> = table.records().cloned().collect();

    Ok(Json(CountriesResponse {
        count: countries.len(),
        countries,
    }))
}

/// 국가 간 급여 환산.
///
/// GET /api/v1/convert?amount=50000&from=India&to=Germany
pub async fn convert_salary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ConvertQuery>, QueryRejection>,
) -> ApiResult<Json<SalaryConversion>> {
    let Query(query) = query.map_err(|e| ApiErrorResponse::invalid_input(e.body_text()))?;

    let table = load_table(&state.merged_path()).await?;
    let conversion = table
        .convert(query.amount, &query.from, &query.to)
        .map_err(conversion_error)?;

    Ok(Json(conversion))
}

/// 환산 라우터 생성.
pub fn conversion_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/countries", get(list_countries))
        .route("/convert", get(convert_salary))
}
