//! 세 스냅샷을 하나의 환산 기준표로 병합.
//!
//! 1. PPP.Country == Currency.Entity (정규화 키 기준 inner join)
//! 2. 결과.AlphabeticCode == ExchangeRate.AlphabeticCode (inner join)
//!
//! 어느 단계에서든 매칭되지 않은 국가는 결과에서 조용히 빠집니다.

use std::collections::HashMap;

use tracing::{debug, error, info};
use wagescale_core::{
    normalize_key, stage_span, CurrencyRecord, ExchangeRateRecord, MergedRecord, PppRecord,
};

use crate::error::{DataError, Result};
use crate::storage::{read_snapshot, snapshot_exists, write_snapshot, SnapshotPaths};

/// 스냅샷 병합기.
#[derive(Debug, Clone)]
pub struct Merger {
    paths: SnapshotPaths,
}

impl Merger {
    pub fn new(paths: SnapshotPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &SnapshotPaths {
        &self.paths
    }

    /// 병합 실행 후 성공 여부만 반환. 재시도하지 않습니다.
    pub fn merge(&self) -> bool {
        let _span = stage_span!("merge").entered();
        match self.try_merge() {
            Ok(rows) => {
                info!(
                    rows,
                    path = %self.paths.merged.display(),
                    "최종 병합 데이터 생성 완료"
                );
                true
            }
            Err(e) => {
                error!(error = %e, "최종 병합 데이터 생성 실패");
                false
            }
        }
    }

    /// 병합 실행. 입력 파일이 하나라도 없거나 결과가 비어 있으면
    /// 기존 병합 파일을 건드리지 않고 실패합니다.
    pub fn try_merge(&self) -> Result<usize> {
        if let Some(missing) = self
            .paths
            .inputs()
            .into_iter()
            .find(|path| !snapshot_exists(path))
        {
            return Err(DataError::MissingSnapshot(missing.to_path_buf()));
        }

        let ppp: Vec<PppRecord> = read_snapshot(&self.paths.ppp)?;
        let rates: Vec<ExchangeRateRecord> = read_snapshot(&self.paths.exchange_rate)?;
        let currencies: Vec<CurrencyRecord> = read_snapshot(&self.paths.currency)?;
        debug!(
            ppp = ppp.len(),
            rates = rates.len(),
            currencies = currencies.len(),
            "스냅샷 로드 완료"
        );

        let merged = merge_tables(&ppp, &currencies, &rates);
        if merged.is_empty() {
            return Err(DataError::Empty("merge".to_string()));
        }
        write_snapshot(&self.paths.merged, &merged)?;

        Ok(merged.len())
    }
}

/// 두 단계 inner join 후 국가명(동률이면 통화 코드) 순으로 정렬.
pub fn merge_tables(
    ppp: &[PppRecord],
    currencies: &[CurrencyRecord],
    rates: &[ExchangeRateRecord],
) -> Vec<MergedRecord> {
    let mut currencies_by_entity: HashMap<String, Vec<&CurrencyRecord>> = HashMap::new();
    for currency in currencies {
        currencies_by_entity
            .entry(normalize_key(&currency.entity))
            .or_default()
            .push(currency);
    }

    let rate_by_code: HashMap<&str, f64> = rates
        .iter()
        .map(|r| (r.alphabetic_code.as_str(), r.exchange_rate))
        .collect();
    let rate_by_code = &rate_by_code;

    let mut merged: Vec<MergedRecord> = ppp
        .iter()
        .flat_map(|p| {
            currencies_by_entity
                .get(&normalize_key(&p.country))
                .into_iter()
                .flatten()
                .filter_map(move |c| {
                    let rate = rate_by_code.get(c.alphabetic_code.as_str())?;
                    Some(MergedRecord {
                        country: p.country.clone(),
                        alphabetic_code: c.alphabetic_code.clone(),
                        value: p.value,
                        exchange_rate: *rate,
                    })
                })
        })
        .collect();

    merged.sort_by(|a, b| {
        a.country
            .cmp(&b.country)
            .then_with(|| a.alphabetic_code.cmp(&b.alphabetic_code))
    });
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use wagescale_core::StorageConfig;

    fn ppp(country: &str, value: f64) -> PppRecord {
        PppRecord {
            country: country.to_string(),
            date: 2021,
            value,
        }
    }

    fn currency(entity: &str, code: &str) -> CurrencyRecord {
        CurrencyRecord {
            entity: entity.to_string(),
            currency: format!("{} currency", code),
            alphabetic_code: code.to_string(),
        }
    }

    fn rate(code: &str, rate: f64) -> ExchangeRateRecord {
        ExchangeRateRecord {
            alphabetic_code: code.to_string(),
            exchange_rate: rate,
        }
    }

    #[test]
    fn test_country_without_rate_is_dropped() {
        let merged = merge_tables(
            &[ppp("Testland", 6.0), ppp("India", 20.0)],
            &[currency("TESTLAND", "TST"), currency("INDIA", "INR")],
            &[rate("INR", 80.0)],
        );

        assert_eq!(
            merged,
            vec![MergedRecord {
                country: "India".to_string(),
                alphabetic_code: "INR".to_string(),
                value: 20.0,
                exchange_rate: 80.0,
            }]
        );
    }

    #[test]
    fn test_country_without_currency_is_dropped_and_output_sorted() {
        let merged = merge_tables(
            &[ppp("Zimbabwe", 1.0), ppp("Nowhere", 2.0), ppp("Albania", 3.0)],
            &[currency("ALBANIA", "ALL"), currency("ZIMBABWE", "ZWL")],
            &[rate("ALL", 100.0), rate("ZWL", 322.0), rate("XXX", 1.0)],
        );

        let countries: Vec<&str> = merged.iter().map(|m| m.country.as_str()).collect();
        assert_eq!(countries, vec!["Albania", "Zimbabwe"]);
    }

    #[test]
    fn test_merge_missing_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SnapshotPaths::from_storage(&StorageConfig::with_data_dir(dir.path()));
        write_snapshot(&paths.ppp, &[ppp("India", 20.0)]).unwrap();
        write_snapshot(&paths.currency, &[currency("INDIA", "INR")]).unwrap();

        let merger = Merger::new(paths.clone());

        assert!(!merger.merge());
        assert!(matches!(
            merger.try_merge(),
            Err(DataError::MissingSnapshot(p)) if p == paths.exchange_rate
        ));
        assert!(!paths.merged.exists());
    }

    #[test]
    fn test_empty_join_keeps_previous_merged_table() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SnapshotPaths::from_storage(&StorageConfig::with_data_dir(dir.path()));
        write_snapshot(
            &paths.merged,
            &[MergedRecord {
                country: "India".to_string(),
                alphabetic_code: "INR".to_string(),
                value: 20.0,
                exchange_rate: 80.0,
            }],
        )
        .unwrap();
        let before = std::fs::read(&paths.merged).unwrap();

        write_snapshot(&paths.ppp, &[ppp("India", 20.0)]).unwrap();
        write_snapshot(&paths.currency, &[currency("INDIA", "INR")]).unwrap();
        write_snapshot(&paths.exchange_rate, &[rate("EUR", 0.92)]).unwrap();

        let merger = Merger::new(paths.clone());

        assert!(!merger.merge());
        assert!(matches!(merger.try_merge(), Err(DataError::Empty(_))));
        assert_eq!(std::fs::read(&paths.merged).unwrap(), before);
    }

    #[test]
    fn test_merge_writes_merged_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SnapshotPaths::from_storage(&StorageConfig::with_data_dir(dir.path()));
        write_snapshot(&paths.ppp, &[ppp("India", 20.0), ppp("Testland", 6.0)]).unwrap();
        write_snapshot(
            &paths.currency,
            &[currency("INDIA", "INR"), currency("TESTLAND", "TST")],
        )
        .unwrap();
        write_snapshot(&paths.exchange_rate, &[rate("INR", 80.0)]).unwrap();

        assert!(Merger::new(paths.clone()).merge());

        let merged: Vec<MergedRecord> = read_snapshot(&paths.merged).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].country, "India");
    }
}
