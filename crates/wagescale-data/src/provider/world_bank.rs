//! World Bank PPP 지표(PA.NUS.PPP) 소스.
//!
//! 응답은 `[메타데이터, 레코드 배열]` 형태의 JSON 배열입니다.
//!
//! ```json
//! [
//!   {"page": 1, "pages": 1, "per_page": 10000, "total": 1064},
//!   [{"country": {"id": "KR", "value": "Korea, Rep."}, "date": "2021", "value": 847.46}]
//! ]
//! ```

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;
use wagescale_core::{PppRecord, PppSourceConfig};

use super::{DataSource, RefreshPolicy};
use crate::error::{DataError, Result};

/// World Bank PPP 환산 계수 소스.
#[derive(Debug, Clone)]
pub struct WorldBankPppSource {
    url: String,
    per_page: u32,
    start_year: i32,
    end_year: i32,
}

impl WorldBankPppSource {
    pub fn new(config: &PppSourceConfig) -> Self {
        Self {
            url: config.url.clone(),
            per_page: config.per_page,
            start_year: config.start_year,
            end_year: config.end_year,
        }
    }

    fn date_range(&self) -> String {
        format!("{}:{}", self.start_year, self.end_year)
    }
}

impl DataSource for WorldBankPppSource {
    type Record = PppRecord;

    fn name(&self) -> &'static str {
        "ppp"
    }

    fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy::AlwaysRefresh
    }

    fn request(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        client.get(&self.url).query(&[
            ("format", "json".to_string()),
            ("per_page", self.per_page.to_string()),
            ("date", self.date_range()),
        ])
    }

    fn parse(&self, body: &[u8]) -> Result<Vec<PppRecord>> {
        let payload: Value = serde_json::from_slice(body)?;

        let parts = payload
            .as_array()
            .filter(|parts| parts.len() >= 2)
            .ok_or_else(|| {
                DataError::Parse(format!("unexpected World Bank response: {}", payload))
            })?;

        if parts[0]["pages"].as_u64().unwrap_or(1) > 1 {
            warn!(
                pages = parts[0]["pages"].as_u64(),
                per_page = self.per_page,
                "World Bank 응답이 여러 페이지로 나뉨, 첫 페이지만 사용"
            );
        }

        let rows: &[Value] = match &parts[1] {
            Value::Array(rows) => rows.as_slice(),
            Value::Null => &[],
            other => {
                return Err(DataError::Parse(format!(
                    "expected record list, got {}",
                    other
                )))
            }
        };

        Ok(select_latest(rows.iter().filter_map(parse_row)))
    }
}

/// 단일 레코드 파싱. 국가명/연도/값 중 하나라도 유효하지 않으면 버림.
fn parse_row(row: &Value) -> Option<PppRecord> {
    let country = row["country"]["value"].as_str()?.trim();
    if country.is_empty() {
        return None;
    }

    let date = match &row["date"] {
        Value::String(s) => s.trim().parse().ok()?,
        Value::Number(n) => i32::try_from(n.as_i64()?).ok()?,
        _ => return None,
    };

    let value = match &row["value"] {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    Some(PppRecord {
        country: country.to_string(),
        date,
        value,
    })
}

/// 국가별로 가장 최근 연도의 레코드 하나만 남깁니다.
///
/// 값이 유한하지 않은 레코드(NaN 등)는 선택 전에 제외됩니다.
/// 결과는 국가명 순으로 정렬됩니다.
pub fn select_latest(records: impl IntoIterator<Item = PppRecord>) -> Vec<PppRecord> {
    let mut latest: BTreeMap<String, PppRecord> = BTreeMap::new();

    for record in records.into_iter().filter(|r| r.value.is_finite()) {
        match latest.get(&record.country) {
            Some(existing) if existing.date >= record.date => {}
            _ => {
                latest.insert(record.country.clone(), record);
            }
        }
    }

    latest.into_values().collect()
}
