use anyhow::{Result, anyhow};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

use crate::config::KindSourceConfig;

/// Client for the exchange disclosure site (KIND).
///
/// Two listings are consumed: the downloadable company table and the
/// exchange-traded fund `<option>` fragment.
pub struct KindClient {
    config: KindSourceConfig,
    client: reqwest::Client,
}

impl KindClient {
    pub fn new(config: KindSourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("kquote/0.1")
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(KindClient { config, client })
    }

    /// Exchange-registered companies as `(name, code)` pairs, codes
    /// zero-padded to 6 digits.
    pub async fn fetch_company_listing(&self) -> Result<Vec<(String, String)>> {
        let url = format!("{}/corpgeneral/corpList.do", self.config.base_url);
        debug!("Requesting company listing from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("method", "download"), ("searchType", "13")])
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for company listing URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for company listing",
                response.status()
            ));
        }

        let body = response.text().await?;
        let entries = parse_company_table(&body, &self.config)?;
        debug!("Parsed {} companies from listing", entries.len());
        Ok(entries)
    }

    /// Exchange-traded funds as `(name, code)` pairs, codes digits-only.
    pub async fn fetch_fund_listing(&self) -> Result<Vec<(String, String)>> {
        let url = format!("{}/disclosure/disclosurebystocktype.do", self.config.base_url);
        debug!("Requesting fund listing from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("method", "searchDisclosureByStockTypeEtf")])
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for fund listing URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for fund listing", response.status()));
        }

        let body = response.text().await?;
        let entries = parse_fund_options(&body);
        debug!("Parsed {} funds from listing", entries.len());
        Ok(entries)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector '{}': {}", css, e))
}

/// Extracts `(name, code)` rows from the company table.
///
/// The header row locates the name and code columns by label; rows with
/// either field missing are skipped. Codes are whatever digits the cell
/// holds, left-padded with zeros to 6 characters.
fn parse_company_table(html: &str, config: &KindSourceConfig) -> Result<Vec<(String, String)>> {
    let document = Html::parse_document(html);
    let row_selector = selector("tr")?;
    let cell_selector = selector("th, td")?;

    let mut columns: Option<(usize, usize)> = None;
    let mut entries = Vec::new();

    for row in document.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();

        match columns {
            None => {
                let name_idx = cells.iter().position(|c| *c == config.name_header);
                let code_idx = cells.iter().position(|c| *c == config.code_header);
                if let (Some(name_idx), Some(code_idx)) = (name_idx, code_idx) {
                    columns = Some((name_idx, code_idx));
                }
            }
            Some((name_idx, code_idx)) => {
                let name = cells.get(name_idx).map(String::as_str).unwrap_or("");
                let code_cell = cells.get(code_idx).map(String::as_str).unwrap_or("");
                let digits: String = code_cell.chars().filter(char::is_ascii_digit).collect();
                if name.is_empty() || digits.is_empty() {
                    continue;
                }
                entries.push((name.to_string(), format!("{:0>6}", digits)));
            }
        }
    }

    if columns.is_none() {
        return Err(anyhow!(
            "Company listing has no table with '{}' and '{}' columns",
            config.name_header,
            config.code_header
        ));
    }
    Ok(entries)
}

/// Extracts `(name, code)` pairs from `<option value="CODE">NAME</option>`
/// entries. The empty-value "select all" option is a sentinel and skipped;
/// non-digit characters are stripped from the value.
fn parse_fund_options(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);
    let Ok(option_selector) = Selector::parse("option") else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for option in document.select(&option_selector) {
        let value = option.value().attr("value").unwrap_or("");
        if value.trim().is_empty() {
            continue;
        }
        let code: String = value.chars().filter(char::is_ascii_digit).collect();
        let name = option.text().collect::<String>().trim().to_string();
        if code.is_empty() || name.is_empty() {
            continue;
        }
        entries.push((name, code));
    }
    entries
}
