use anyhow::Result;
use clap::Parser;
use kquote::core::log::init_logging;
use std::path::PathBuf;

/// Fetch today's closing price for a listed company by display name.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Company display name as listed on the exchange
    corp_name: String,

    /// Directory the price file is written to
    #[arg(long)]
    save_dir: PathBuf,

    /// Rebuild the corp listing cache before resolving
    #[arg(long)]
    refresh_corplist: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long)]
    config_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = kquote::run(
        kquote::FetchRequest {
            corp_name: cli.corp_name,
            save_dir: cli.save_dir,
            refresh_corplist: cli.refresh_corplist,
        },
        cli.config_path.as_deref(),
    )
    .await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Price fetch failed");
    }
    result
}
