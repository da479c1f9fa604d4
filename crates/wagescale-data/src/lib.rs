//! 외부 데이터 수집 및 스냅샷 관리.
//!
//! 이 crate는 다음을 제공합니다:
//! - 데이터 소스별 요청/파싱 (World Bank PPP, Open Exchange Rates, 통화 코드 CSV)
//! - 재시도와 캐시 폴백을 갖춘 범용 `Fetcher`
//! - `|` 구분 스냅샷 파일 저장/로드 (원자적 교체)
//! - 세 스냅샷을 하나의 환산 기준표로 병합하는 `Merger`

pub mod error;
pub mod fetcher;
pub mod merge;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};
pub use fetcher::{FetchOutcome, Fetcher, RetryPolicy};
pub use merge::{merge_tables, Merger};
pub use provider::{
    CurrencyCodesSource, DataSource, OpenExchangeRatesSource, RefreshPolicy, WorldBankPppSource,
};
pub use storage::{
    parse_snapshot, read_snapshot, snapshot_exists, write_snapshot, SnapshotPaths,
};
