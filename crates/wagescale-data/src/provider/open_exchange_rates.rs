//! Open Exchange Rates `latest.json` 소스.
//!
//! 무료 플랜은 월 1000회 호출 제한이 있으므로 하루 한 번만 갱신합니다.

use serde_json::Value;
use wagescale_core::{ExchangeRateRecord, ExchangeRateSourceConfig};

use super::{DataSource, RefreshPolicy};
use crate::error::{DataError, Result};

/// 기준 통화 대비 환율 소스.
#[derive(Clone)]
pub struct OpenExchangeRatesSource {
    url: String,
    base: String,
    app_id: Option<String>,
}

impl OpenExchangeRatesSource {
    pub fn new(config: &ExchangeRateSourceConfig) -> Self {
        if config.app_id.is_none() {
            tracing::warn!("Open Exchange Rates app_id가 설정되지 않았습니다");
        }
        Self {
            url: config.url.clone(),
            base: config.base.clone(),
            app_id: config.app_id.clone(),
        }
    }
}

impl DataSource for OpenExchangeRatesSource {
    type Record = ExchangeRateRecord;

    fn name(&self) -> &'static str {
        "exchange_rate"
    }

    fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy::AlwaysRefresh
    }

    fn request(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let mut request = client.get(&self.url).query(&[("base", self.base.as_str())]);
        if let Some(app_id) = &self.app_id {
            request = request.query(&[("app_id", app_id.as_str())]);
        }
        request
    }

    fn parse(&self, body: &[u8]) -> Result<Vec<ExchangeRateRecord>> {
        let payload: Value = serde_json::from_slice(body)?;

        let rates = payload["rates"]
            .as_object()
            .ok_or_else(|| DataError::Parse("missing \"rates\" object".to_string()))?;

        // 숫자가 아닌 환율은 버림
        let mut records: Vec<ExchangeRateRecord> = rates
            .iter()
            .filter_map(|(code, rate)| {
                let rate = rate.as_f64().filter(|r| r.is_finite())?;
                let code = code.trim();
                (!code.is_empty()).then(|| ExchangeRateRecord {
                    alphabetic_code: code.to_uppercase(),
                    exchange_rate: rate,
                })
            })
            .collect();
        records.sort_by(|a, b| a.alphabetic_code.cmp(&b.alphabetic_code));

        Ok(records)
    }
}
