//! 스냅샷 파일에 저장되는 표 형식 레코드.
//!
//! 필드명은 스냅샷 CSV 헤더와 동일하게 PascalCase로 직렬화됩니다
//! (`Country|Date|Value` 등).

use serde::{Deserialize, Serialize};

/// 국가별 구매력평가(PPP) 환산 계수.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PppRecord {
    /// 국가명 (World Bank 표기)
    pub country: String,
    /// 기준 연도
    pub date: i32,
    /// PPP 환산 계수 (국제 달러당 현지 통화)
    pub value: f64,
}

/// 기준 통화(USD) 대비 환율.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExchangeRateRecord {
    /// ISO 4217 통화 코드
    pub alphabetic_code: String,
    /// 기준 통화 1단위당 환율
    pub exchange_rate: f64,
}

/// 국가(엔티티) → 통화 매핑.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CurrencyRecord {
    /// 국가/엔티티명
    pub entity: String,
    /// 통화명
    pub currency: String,
    /// ISO 4217 통화 코드
    pub alphabetic_code: String,
}

/// 병합된 환산 기준표의 한 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MergedRecord {
    /// 국가명 (PPP 데이터 표기)
    pub country: String,
    /// ISO 4217 통화 코드
    pub alphabetic_code: String,
    /// PPP 환산 계수
    pub value: f64,
    /// USD 대비 환율
    pub exchange_rate: f64,
}

/// 국가명 조인 키 정규화 (앞뒤 공백 제거 후 대문자화).
///
/// 통화 참조 데이터는 엔티티명을 대문자로 표기하므로
/// PPP 국가명과 비교할 때 이 키를 사용합니다.
pub fn normalize_key(name: &str) -> String {
    name.trim().to_uppercase()
}
