use crate::data_sync::upstream::HttpUpstream;
use crate::error::SyncError;
use crate::utils::constants::{DEFAULT_CAPTURE_RATIO, DEFAULT_DATASOURCE, DEFAULT_UPSTREAM_URL, DEFAULT_USER_AGENT};
use crate::utils::config_loader::{LoadConfigError, load_from_file, load_from_file_sync};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the upstream client and the sync layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the upstream REST API, without trailing slash
    pub upstream_url: String,
    /// Value of the `datasource` query parameter sent with every request
    pub datasource: String,
    /// User-Agent header sent upstream
    pub user_agent: String,
    /// Per-request timeout in seconds. `None` means no timeout, in which case
    /// a hung request keeps its resource locked.
    pub upstream_timeout_secs: Option<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            datasource: DEFAULT_DATASOURCE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            upstream_timeout_secs: None,
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Ok(upstream_url) = std::env::var("UPSTREAM_URL") {
            let _url = Url::parse(&upstream_url).map_err(|e| eyre::eyre!("Invalid UPSTREAM_URL: {}", e))?;
            config.upstream_url = upstream_url;
        }

        if let Ok(datasource) = std::env::var("UPSTREAM_DATASOURCE") {
            config.datasource = datasource;
        }

        if let Ok(user_agent) = std::env::var("UPSTREAM_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Ok(timeout_str) = std::env::var("UPSTREAM_TIMEOUT_SECS") {
            let timeout: u64 = timeout_str.parse().map_err(|e| eyre::eyre!("Invalid UPSTREAM_TIMEOUT_SECS: {}", e))?;
            config.upstream_timeout_secs = Some(timeout);
        }

        Ok(config)
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }

    pub fn build_upstream(&self) -> Result<HttpUpstream, SyncError> {
        HttpUpstream::new(self.upstream_url.clone(), self.datasource.clone(), self.user_agent.clone(), self.upstream_timeout())
    }
}

/// Deal computation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealsConfig {
    /// Share of posted sell volume counted as capturable
    pub capture_ratio: f64,
    /// Truncate ranked deals to this many entries
    pub max_results: Option<usize>,
}

impl Default for DealsConfig {
    fn default() -> Self {
        Self { capture_ratio: DEFAULT_CAPTURE_RATIO, max_results: None }
    }
}

/// Top-level TOML document:
///
/// ```toml
/// [sync]
/// upstream_url = "${UPSTREAM_URL}"
/// upstream_timeout_secs = 30
///
/// [deals]
/// max_results = 100
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sync: SyncConfig,
    pub deals: DealsConfig,
}

impl AppConfig {
    pub async fn load(file_name: String) -> Result<Self, LoadConfigError> {
        load_from_file(file_name).await
    }

    pub fn load_sync(file_name: String) -> Result<Self, LoadConfigError> {
        load_from_file_sync(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.upstream_url, "https://esi.evetech.net/latest");
        assert_eq!(config.datasource, "tranquility");
        assert_eq!(config.upstream_timeout(), None);
    }

    #[test]
    fn test_timeout_duration() {
        let config = SyncConfig { upstream_timeout_secs: Some(10), ..SyncConfig::default() };
        assert_eq!(config.upstream_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("[deals]\nmax_results = 25\n").unwrap();
        assert_eq!(config.deals.max_results, Some(25));
        assert_eq!(config.deals.capture_ratio, DEFAULT_CAPTURE_RATIO);
        assert_eq!(config.sync, SyncConfig::default());
    }
}
