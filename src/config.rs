use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Exchange disclosure site serving the company and fund listings.
///
/// The header labels are upstream schema constants; the live site serves
/// them in Korean, so overrides are mostly useful for test fixtures.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KindSourceConfig {
    pub base_url: String,
    #[serde(default = "default_name_header")]
    pub name_header: String,
    #[serde(default = "default_code_header")]
    pub code_header: String,
}

impl Default for KindSourceConfig {
    fn default() -> Self {
        KindSourceConfig {
            base_url: "http://kind.krx.co.kr".to_string(),
            name_header: default_name_header(),
            code_header: default_code_header(),
        }
    }
}

fn default_name_header() -> String {
    "회사명".to_string()
}

fn default_code_header() -> String {
    "종목코드".to_string()
}

/// Paginated daily-price listing source.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DailySourceConfig {
    pub base_url: String,
    #[serde(default = "default_date_header")]
    pub date_header: String,
    #[serde(default = "default_close_header")]
    pub close_header: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Upper bound on pages scanned before the lookup gives up.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for DailySourceConfig {
    fn default() -> Self {
        DailySourceConfig {
            base_url: "https://finance.naver.com".to_string(),
            date_header: default_date_header(),
            close_header: default_close_header(),
            date_format: default_date_format(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_date_header() -> String {
    "날짜".to_string()
}

fn default_close_header() -> String {
    "종가".to_string()
}

fn default_date_format() -> String {
    "%Y.%m.%d".to_string()
}

fn default_max_pages() -> u32 {
    400
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourcesConfig {
    pub kind: Option<KindSourceConfig>,
    pub daily: Option<DailySourceConfig>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            kind: Some(KindSourceConfig::default()),
            daily: Some(DailySourceConfig::default()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Corp listing cache file, rebuilt wholesale when missing or on refresh.
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            sources: SourcesConfig::default(),
            cache_path: default_cache_path(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("data").join("corplist.json")
}

impl AppConfig {
    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
sources:
  kind:
    base_url: "http://example.com/kind"
  daily:
    base_url: "http://example.com/daily"
    max_pages: 5
cache_path: "/tmp/corplist.json"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        let kind = config.sources.kind.expect("kind source missing");
        assert_eq!(kind.base_url, "http://example.com/kind");
        assert_eq!(kind.name_header, "회사명");
        let daily = config.sources.daily.expect("daily source missing");
        assert_eq!(daily.base_url, "http://example.com/daily");
        assert_eq!(daily.max_pages, 5);
        assert_eq!(daily.date_format, "%Y.%m.%d");
        assert_eq!(config.cache_path, PathBuf::from("/tmp/corplist.json"));
    }

    #[test]
    fn test_defaults_point_at_live_endpoints() {
        let config = AppConfig::default();
        assert_eq!(
            config.sources.kind.unwrap().base_url,
            "http://kind.krx.co.kr"
        );
        let daily = config.sources.daily.unwrap();
        assert_eq!(daily.base_url, "https://finance.naver.com");
        assert_eq!(daily.max_pages, 400);
        assert_eq!(config.cache_path, PathBuf::from("data").join("corplist.json"));
    }
}
