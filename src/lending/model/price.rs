use chrono::{DateTime, Utc};
use serde::Serialize;

/// 预言机报价：1 个 base 资产值多少 quote 资产
///
/// 读取时即视为权威值，不做过期检查。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub base: String,
    pub quote: String,
    pub rate: f64,
    pub round_id: u128,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PriceQuote {
    pub fn new(base: impl Into<String>, quote: impl Into<String>, rate: f64) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
            rate,
            round_id: 0,
            updated_at: None,
        }
    }

    pub fn with_round(mut self, round_id: u128, updated_at_secs: u64) -> Self {
        self.round_id = round_id;
        self.updated_at = i64::try_from(updated_at_secs)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
        self
    }
}
