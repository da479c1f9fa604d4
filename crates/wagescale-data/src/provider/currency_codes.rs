//! ISO 4217 통화 코드 참조 CSV 소스 (datahub.io `currency-codes`).
//!
//! 원본 컬럼: `Entity,Currency,AlphabeticCode,NumericCode,MinorUnit,WithdrawalDate`.
//! 거의 변하지 않는 정적 데이터이므로 스냅샷이 있으면 다시 받지 않습니다.

use std::collections::HashSet;

use serde::Deserialize;
use wagescale_core::{CurrencyRecord, CurrencySourceConfig};

use super::{DataSource, RefreshPolicy};
use crate::error::Result;

/// 국가 → 통화 매핑 소스.
#[derive(Debug, Clone)]
pub struct CurrencyCodesSource {
    url: String,
}

/// 원본 CSV 한 행.
#[derive(Debug, Deserialize)]
struct RawCurrencyRow {
    #[serde(rename = "Entity")]
    entity: String,
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "AlphabeticCode")]
    alphabetic_code: Option<String>,
    #[serde(rename = "WithdrawalDate", default)]
    withdrawal_date: Option<String>,
}

impl CurrencyCodesSource {
    pub fn new(config: &CurrencySourceConfig) -> Self {
        Self {
            url: config.url.clone(),
        }
    }
}

impl DataSource for CurrencyCodesSource {
    type Record = CurrencyRecord;

    fn name(&self) -> &'static str {
        "currency"
    }

    fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy::SkipIfPresent
    }

    fn request(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        client.get(&self.url)
    }

    fn parse(&self, body: &[u8]) -> Result<Vec<CurrencyRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(body);

        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for row in reader.deserialize::<RawCurrencyRow>() {
            let row = row?;

            // 폐지된 통화와 코드가 없는 엔티티(예: ANTARCTICA) 제외
            if row.withdrawal_date.is_some() || row.entity.is_empty() {
                continue;
            }
            let Some(code) = row.alphabetic_code else {
                continue;
            };

            // 엔티티당 첫 번째 통화만 유지
            if seen.insert(row.entity.clone()) {
                records.push(CurrencyRecord {
                    entity: row.entity,
                    currency: row.currency,
                    alphabetic_code: code,
                });
            }
        }

        Ok(records)
    }
}
