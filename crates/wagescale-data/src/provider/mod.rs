//! 외부 데이터 소스 정의.
//!
//! 각 소스는 요청 생성과 응답 파싱만 담당하며,
//! 재시도/폴백/저장은 [`crate::Fetcher`]가 공통으로 처리합니다.

pub mod currency_codes;
pub mod open_exchange_rates;
pub mod world_bank;

pub use currency_codes::CurrencyCodesSource;
pub use open_exchange_rates::OpenExchangeRatesSource;
pub use world_bank::{select_latest, WorldBankPppSource};

use serde::Serialize;

use crate::error::Result;

/// 기존 스냅샷이 있을 때의 갱신 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// 항상 원격에서 새로 받아옴 (실패 시 기존 스냅샷 사용)
    AlwaysRefresh,
    /// 스냅샷이 있으면 네트워크 요청 없이 그대로 사용
    SkipIfPresent,
}

/// 하나의 원격 데이터셋.
pub trait DataSource: Send + Sync {
    /// 스냅샷에 저장되는 레코드 타입
    type Record: Serialize + Send + Sync;

    /// 로그/리포트용 소스 이름
    fn name(&self) -> &'static str;

    fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy::AlwaysRefresh
    }

    /// 소스별 쿼리 파라미터가 포함된 GET 요청 생성
    fn request(&self, client: &reqwest::Client) -> reqwest::RequestBuilder;

    /// 응답 본문을 필터링/정규화된 레코드로 변환
    fn parse(&self, body: &[u8]) -> Result<Vec<Self::Record>>;
}
