use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

use crate::config::DailySourceConfig;
use crate::core::{DailyQuote, QuoteSource};

/// Daily closing prices scraped from the paginated price-history pages.
///
/// The source lists the most recent trading day first within each page,
/// and pages are ordered newest-page-first.
pub struct NaverDailyQuotes {
    config: DailySourceConfig,
    client: reqwest::Client,
}

impl NaverDailyQuotes {
    pub fn new(config: DailySourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("kquote/0.1")
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(NaverDailyQuotes { config, client })
    }

    async fn fetch_page(&self, code: &str, page: u32) -> Result<Vec<DailyQuote>> {
        let url = format!("{}/item/sise_day.nhn", self.config.base_url);
        debug!("Requesting daily quotes from {} page {}", url, page);

        let response = self
            .client
            .get(&url)
            .query(&[("code", code.to_string()), ("page", page.to_string())])
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for code: {} page: {}", e, code, page))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for code: {} page: {}",
                response.status(),
                code,
                page
            ));
        }

        let body = response.text().await?;
        parse_daily_table(&body, &self.config)
    }
}

#[async_trait]
impl QuoteSource for NaverDailyQuotes {
    async fn latest_close_on_or_before(&self, code: &str, target: NaiveDate) -> Result<f64> {
        for page in 1..=self.config.max_pages {
            let quotes = self.fetch_page(code, page).await?;
            if quotes.is_empty() {
                bail!(
                    "Price listing for {} exhausted at page {} with no trading day at or before {}",
                    code,
                    page,
                    target
                );
            }
            if let Some(quote) = quotes.iter().find(|q| q.date <= target) {
                debug!("Matched trading day {} on page {}", quote.date, page);
                return Ok(quote.close);
            }
        }
        bail!(
            "No trading day at or before {} for {} within {} pages",
            target,
            code,
            self.config.max_pages
        )
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector '{}': {}", css, e))
}

/// Parses one page of the daily-price table into document order.
///
/// The header row locates the date and close columns by label; rows with
/// either field missing or unparseable are skipped.
fn parse_daily_table(html: &str, config: &DailySourceConfig) -> Result<Vec<DailyQuote>> {
    let document = Html::parse_document(html);
    let row_selector = selector("tr")?;
    let cell_selector = selector("th, td")?;

    let mut columns: Option<(usize, usize)> = None;
    let mut quotes = Vec::new();

    for row in document.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();

        match columns {
            None => {
                let date_idx = cells.iter().position(|c| *c == config.date_header);
                let close_idx = cells.iter().position(|c| *c == config.close_header);
                if let (Some(date_idx), Some(close_idx)) = (date_idx, close_idx) {
                    columns = Some((date_idx, close_idx));
                }
            }
            Some((date_idx, close_idx)) => {
                let date = cells
                    .get(date_idx)
                    .and_then(|c| NaiveDate::parse_from_str(c, &config.date_format).ok());
                let close = cells.get(close_idx).and_then(|c| parse_numeric(c));
                if let (Some(date), Some(close)) = (date, close) {
                    quotes.push(DailyQuote { date, close });
                }
            }
        }
    }

    Ok(quotes)
}

/// Numeric cell text with thousands separators, e.g. "56,000" -> 56000.
fn parse_numeric(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }

    cleaned.parse().ok()
}
