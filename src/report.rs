use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk result payload, one file per `(code, date)` pair.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PriceFile {
    pub value: f64,
}

/// Writes `{"value": <price>}` to `<save_dir>/<code>-<YYYYMMDD>` and
/// returns the path. `save_dir` is created if missing.
pub fn write_price_file(
    save_dir: &Path,
    code: &str,
    date: NaiveDate,
    value: f64,
) -> Result<PathBuf> {
    fs::create_dir_all(save_dir)
        .with_context(|| format!("Failed to create directory: {}", save_dir.display()))?;

    let path = save_dir.join(format!("{}-{}", code, date.format("%Y%m%d")));
    let payload = serde_json::to_string(&PriceFile { value })?;
    fs::write(&path, payload)
        .with_context(|| format!("Failed to write price file: {}", path.display()))?;
    Ok(path)
}
