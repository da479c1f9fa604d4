//! 병합 기준표를 이용한 국가 간 급여 환산.
//!
//! - PPP 환산: `amount / ppp(from) * ppp(to)`
//! - 명목 환산: `amount / rate(from) * rate(to)` (환율은 USD 기준)

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{ConversionError, ConversionResult};
use crate::types::{normalize_key, MergedRecord};

/// 국가별 조회가 가능한 환산 기준표.
#[derive(Debug, Clone, Default)]
pub struct ConversionTable {
    rows: BTreeMap<String, MergedRecord>,
}

/// 급여 환산 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryConversion {
    pub amount: f64,
    pub from_country: String,
    pub from_currency: String,
    pub to_country: String,
    pub to_currency: String,
    /// 구매력 기준 동등 금액 (도착 국가 통화)
    pub ppp_equivalent: f64,
    /// 시장 환율 기준 금액 (도착 국가 통화)
    pub nominal_equivalent: f64,
}

impl ConversionTable {
    /// 병합 레코드로 기준표를 만듭니다.
    ///
    /// 한 국가에 통화가 여러 개면 먼저 나온 행을 사용합니다.
    pub fn from_records(records: impl IntoIterator<Item = MergedRecord>) -> Self {
        let mut rows = BTreeMap::new();
        for record in records {
            rows.entry(normalize_key(&record.country)).or_insert(record);
        }
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 국가명으로 행 조회 (대소문자 무시).
    pub fn get(&self, country: &str) -> Option<&MergedRecord> {
        self.rows.get(&normalize_key(country))
    }

    /// 국가명 순으로 정렬된 행.
    pub fn records(&self) -> impl Iterator<Item = &MergedRecord> {
        self.rows.values()
    }

    /// `from` 국가의 급여를 `to` 국가 기준으로 환산합니다.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> ConversionResult<SalaryConversion> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ConversionError::InvalidAmount(amount));
        }

        let source = self.lookup(from)?;
        let target = self.lookup(to)?;

        Ok(SalaryConversion {
            amount,
            from_country: source.country.clone(),
            from_currency: source.alphabetic_code.clone(),
            to_country: target.country.clone(),
            to_currency: target.alphabetic_code.clone(),
            ppp_equivalent: amount / source.value * target.value,
            nominal_equivalent: amount / source.exchange_rate * target.exchange_rate,
        })
    }

    fn lookup(&self, country: &str) -> ConversionResult<&MergedRecord> {
        let record = self
            .get(country)
            .ok_or_else(|| ConversionError::UnknownCountry(country.to_string()))?;

        for factor in [record.value, record.exchange_rate] {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(ConversionError::InvalidFactor {
                    country: record.country.clone(),
                    factor,
                });
            }
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, code: &str, value: f64, rate: f64) -> MergedRecord {
        MergedRecord {
            country: country.to_string(),
            alphabetic_code: code.to_string(),
            value,
            exchange_rate: rate,
        }
    }

    fn table() -> ConversionTable {
        ConversionTable::from_records(vec![
            record("India", "INR", 20.0, 80.0),
            record("United States", "USD", 1.0, 1.0),
            record("Testland", "TST", 0.0, 2.0),
        ])
    }

    #[test]
    fn test_convert_ppp_and_nominal() {
        let result = table().convert(100_000.0, "united states", "India").unwrap();
        assert_eq!(result.from_currency, "USD");
        assert_eq!(result.to_currency, "INR");
        assert!((result.ppp_equivalent - 2_000_000.0).abs() < 1e-6);
        assert!((result.nominal_equivalent - 8_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_convert_same_country_is_identity() {
        let result = table().convert(42.0, "India", "INDIA").unwrap();
        assert!((result.ppp_equivalent - 42.0).abs() < 1e-9);
        assert!((result.nominal_equivalent - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_country() {
        assert_eq!(
            table().convert(1.0, "Atlantis", "India"),
            Err(ConversionError::UnknownCountry("Atlantis".to_string()))
        );
    }

    #[test]
    fn test_invalid_amount_and_factor() {
        assert!(matches!(
            table().convert(-5.0, "India", "India"),
            Err(ConversionError::InvalidAmount(_))
        ));
        assert!(matches!(
            table().convert(1.0, "Testland", "India"),
            Err(ConversionError::InvalidFactor { .. })
        ));
    }

    #[test]
    fn test_first_row_wins_for_duplicate_country() {
        let table = ConversionTable::from_records(vec![
            record("Bhutan", "BTN", 20.0, 80.0),
            record("Bhutan", "INR", 20.0, 80.0),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("bhutan").unwrap().alphabetic_code, "BTN");
    }
}
