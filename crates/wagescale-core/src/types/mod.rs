//! 데이터셋 레코드 타입.

pub mod records;

pub use records::{
    normalize_key, CurrencyRecord, ExchangeRateRecord, MergedRecord, PppRecord,
};
