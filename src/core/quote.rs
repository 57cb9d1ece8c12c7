//! Quote abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// One trading day as listed by the price source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyQuote {
    pub date: NaiveDate,
    pub close: f64,
}

#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Closing price of the most recent trading day at or before `target`.
    async fn latest_close_on_or_before(&self, code: &str, target: NaiveDate) -> Result<f64>;
}
