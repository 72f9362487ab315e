// ABOUTME: config.toml loading for the mediathek CLI.
// ABOUTME: Maps [fetch], [ard], [zdf] and [legacy] sections onto fetcher and adapter settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use mediathek_catalog::legacy::LegacyTableError;
use mediathek_catalog::{AdapterConfig, StaticLegacyTable};
use mediathek_fetch::{CachedFetcher, FetchError};
use serde::Deserialize;
use thiserror::Error;

/// CLI configuration. Every field is optional; missing values keep the library defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub ard: ArdConfig,
    pub zdf: ZdfConfig,
    pub legacy: LegacyConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub cache_dir: Option<PathBuf>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArdConfig {
    pub api_base: Option<String>,
    pub web_base: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ZdfConfig {
    pub api_base: Option<String>,
    pub web_base: Option<String>,
    pub rss_base: Option<String>,
    pub token_page: Option<String>,
    pub token_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyConfig {
    /// JSON legacy channel table.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to load legacy table: {0}")]
    Legacy(#[from] LegacyTableError),

    #[error("Failed to create HTTP client: {0}")]
    Fetch(#[from] FetchError),
}

impl Config {
    /// Loads `explicit`, or the default path if none is given.
    ///
    /// An explicit path must exist. A missing default file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;
        Self::parse(&content).map_err(|e| ConfigError::Parse { path, source: e })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// `~/.config/mediathek/config.toml` or the platform equivalent.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mediathek").join("config.toml"))
    }

    pub fn fetcher(&self) -> Result<CachedFetcher, ConfigError> {
        let mut builder = CachedFetcher::builder();
        if let Some(ref dir) = self.fetch.cache_dir {
            builder = builder.cache_dir(dir);
        }
        if let Some(ref ua) = self.fetch.user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(secs) = self.fetch.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }

    pub fn adapter_config(&self) -> Result<AdapterConfig, ConfigError> {
        let mut config = AdapterConfig::default();

        override_with(&mut config.ard.api_base, &self.ard.api_base);
        override_with(&mut config.ard.web_base, &self.ard.web_base);

        override_with(&mut config.zdf.api_base, &self.zdf.api_base);
        override_with(&mut config.zdf.web_base, &self.zdf.web_base);
        override_with(&mut config.zdf.rss_base, &self.zdf.rss_base);
        override_with(&mut config.zdf.token_page, &self.zdf.token_page);
        override_with(&mut config.zdf_token_file, &self.zdf.token_file);

        if let Some(ref path) = self.legacy.path {
            let table = StaticLegacyTable::from_path(path)?;
            config.legacy = Some(Arc::new(table));
        }

        Ok(config)
    }
}

fn override_with<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}
