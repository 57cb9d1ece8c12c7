use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::providers::kind::KindClient;

/// Names whose codes are pinned regardless of what the listings say.
/// Merged last, so they win every collision.
const MANUAL_OVERRIDES: &[(&str, &str)] = &[("삼성전자우", "005935")];

/// Name -> exchange-code directory backed by a local JSON cache file.
///
/// The cache is rebuilt wholesale from the disclosure site when the file
/// is missing or a refresh is forced; once present it is authoritative.
pub struct CorpDirectory {
    kind: KindClient,
    cache_path: PathBuf,
}

impl CorpDirectory {
    pub fn new(kind: KindClient, cache_path: impl Into<PathBuf>) -> Self {
        CorpDirectory {
            kind,
            cache_path: cache_path.into(),
        }
    }

    /// Case-insensitive exact lookup. `Ok(None)` when the name is not
    /// listed; the mapping is loaded or built first as needed.
    pub async fn resolve(&self, name: &str) -> Result<Option<String>> {
        let mapping = self.load_or_build(false).await?;
        let wanted = name.to_uppercase();
        Ok(mapping
            .iter()
            .find(|(listed, _)| listed.to_uppercase() == wanted)
            .map(|(_, code)| code.clone()))
    }

    pub async fn load_or_build(&self, force_refresh: bool) -> Result<BTreeMap<String, String>> {
        if force_refresh || !self.cache_path.exists() {
            let mapping = self.build().await?;
            self.persist(&mapping)?;
            info!(
                entries = mapping.len(),
                cache = %self.cache_path.display(),
                "Rebuilt corp listing cache"
            );
            return Ok(mapping);
        }

        debug!("Loading corp listing from {}", self.cache_path.display());
        let raw = fs::read_to_string(&self.cache_path).with_context(|| {
            format!("Failed to read corp listing: {}", self.cache_path.display())
        })?;
        serde_json::from_str(&raw).with_context(|| {
            format!("Failed to parse corp listing: {}", self.cache_path.display())
        })
    }

    /// Assembles the mapping in fixed precedence order: companies, then
    /// funds, then the manual overrides.
    async fn build(&self) -> Result<BTreeMap<String, String>> {
        let mut mapping = BTreeMap::new();
        for (name, code) in self.kind.fetch_company_listing().await? {
            mapping.insert(name, code);
        }
        for (name, code) in self.kind.fetch_fund_listing().await? {
            mapping.insert(name, code);
        }
        for (name, code) in MANUAL_OVERRIDES {
            mapping.insert((*name).to_string(), (*code).to_string());
        }
        Ok(mapping)
    }

    fn persist(&self, mapping: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let payload = serde_json::to_string(mapping)?;
        fs::write(&self.cache_path, payload).with_context(|| {
            format!("Failed to write corp listing: {}", self.cache_path.display())
        })
    }
}
