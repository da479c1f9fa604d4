//! `|` 구분 스냅샷 파일 저장소.
//!
//! 국가명에 쉼표가 포함되는 경우가 있어 구분자로 `|`를 사용합니다.
//! 저장은 같은 디렉토리의 임시 파일에 쓴 뒤 rename으로 교체하므로
//! 쓰기 도중 중단되어도 이전 스냅샷이 깨지지 않습니다.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use wagescale_core::StorageConfig;

use crate::error::{DataError, Result};

/// 스냅샷 파일 구분자.
pub const SNAPSHOT_DELIMITER: u8 = b'|';

/// 파이프라인이 사용하는 스냅샷 파일 경로 모음.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    pub ppp: PathBuf,
    pub exchange_rate: PathBuf,
    pub currency: PathBuf,
    pub merged: PathBuf,
}

impl SnapshotPaths {
    pub fn from_storage(storage: &StorageConfig) -> Self {
        Self {
            ppp: storage.ppp_path(),
            exchange_rate: storage.exchange_rate_path(),
            currency: storage.currency_path(),
            merged: storage.merged_path(),
        }
    }

    /// 병합 입력 파일 (PPP, 환율, 통화).
    pub fn inputs(&self) -> [&Path; 3] {
        [&self.ppp, &self.exchange_rate, &self.currency]
    }
}

/// 스냅샷 파일 존재 여부.
pub fn snapshot_exists(path: &Path) -> bool {
    path.is_file()
}

/// 레코드를 헤더 포함 스냅샷 파일로 저장 (기존 파일 덮어쓰기).
pub fn write_snapshot<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(SNAPSHOT_DELIMITER)
            .from_writer(tmp.as_file());
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| DataError::Io(e.error))?;

    Ok(())
}

/// 스냅샷 파일을 레코드 목록으로 로드.
pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !snapshot_exists(path) {
        return Err(DataError::MissingSnapshot(path.to_path_buf()));
    }
    parse_snapshot(fs::File::open(path)?)
}

/// 임의의 reader에서 스냅샷 형식을 파싱.
pub fn parse_snapshot<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(SNAPSHOT_DELIMITER)
        .from_reader(reader);

    reader
        .deserialize()
        .map(|row| row.map_err(DataError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wagescale_core::{CurrencyRecord, PppRecord};

    #[test]
    fn test_round_trip_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fetched").join("ppp_data.csv");
        let records = vec![
            PppRecord {
                country: "Korea, Rep.".to_string(),
                date: 2021,
                value: 847.456_123_9,
            },
            PppRecord {
                country: "Testland".to_string(),
                date: 2019,
                value: 0.1,
            },
        ];

        write_snapshot(&path, &records).unwrap();
        let loaded: Vec<PppRecord> = read_snapshot(&path).unwrap();

        assert_eq!(loaded, records);
    }

    #[test]
    fn test_snapshot_uses_pipe_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("currency_data.csv");
        let records = vec![CurrencyRecord {
            entity: "BONAIRE, SINT EUSTATIUS AND SABA".to_string(),
            currency: "US Dollar".to_string(),
            alphabetic_code: "USD".to_string(),
        }];

        write_snapshot(&path, &records).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert_eq!(
            content,
            "Entity|Currency|AlphabeticCode\nBONAIRE, SINT EUSTATIUS AND SABA|US Dollar|USD\n"
        );
    }

    #[test]
    fn test_overwrite_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ppp_data.csv");
        let first = vec![PppRecord {
            country: "Old".to_string(),
            date: 2019,
            value: 1.0,
        }];
        let second = vec![PppRecord {
            country: "New".to_string(),
            date: 2022,
            value: 2.0,
        }];

        write_snapshot(&path, &first).unwrap();
        write_snapshot(&path, &second).unwrap();

        let loaded: Vec<PppRecord> = read_snapshot(&path).unwrap();
        assert_eq!(loaded, second);
        // 임시 파일이 남지 않아야 함
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_read_missing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<Vec<PppRecord>> = read_snapshot(&dir.path().join("nope.csv"));
        assert!(matches!(result, Err(DataError::MissingSnapshot(_))));
    }
}
