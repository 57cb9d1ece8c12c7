pub mod config;
pub mod core;
pub mod directory;
pub mod providers;
pub mod report;

use anyhow::{Result, bail};
use chrono::Local;
use console::style;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::core::QuoteSource;
use crate::directory::CorpDirectory;
use crate::providers::kind::KindClient;
use crate::providers::naver_daily::NaverDailyQuotes;

pub struct FetchRequest {
    pub corp_name: String,
    pub save_dir: PathBuf,
    pub refresh_corplist: bool,
}

/// Resolves the company's exchange code, fetches the latest close at or
/// before today, and persists it under `save_dir`.
pub async fn run(request: FetchRequest, config_path: Option<&str>) -> Result<()> {
    info!("Price fetch starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::default(),
    };
    debug!("Loaded config: {config:#?}");

    let kind_config = config.sources.kind.clone().unwrap_or_default();
    let daily_config = config.sources.daily.clone().unwrap_or_default();

    let directory = CorpDirectory::new(KindClient::new(kind_config)?, &config.cache_path);
    if request.refresh_corplist {
        directory.load_or_build(true).await?;
    }

    let Some(code) = directory.resolve(&request.corp_name).await? else {
        bail!("No exchange code found for company: {}", request.corp_name);
    };
    println!("{} {}", style("code").dim(), style(&code).bold());

    let source = NaverDailyQuotes::new(daily_config)?;
    let today = Local::now().date_naive();
    let value = source.latest_close_on_or_before(&code, today).await?;

    let path = report::write_price_file(&request.save_dir, &code, today, value)?;
    println!(
        "{} {} {} {}",
        style("close").dim(),
        value,
        style("→").dim(),
        style(path.display()).green()
    );
    Ok(())
}
