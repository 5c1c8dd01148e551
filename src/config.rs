//! Configuration management for backurls
//!
//! Configuration is loaded from `./config/backurls.toml` when present,
//! otherwise from the built-in template. The template is the only place
//! defaults exist.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/backurls.toml";

/// Default configuration file content
pub const DEFAULT_CONFIG: &str = include_str!("../config/backurls.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid regex pattern in group '{group}': {pattern}: {error}")]
    InvalidRegex {
        group: String,
        pattern: String,
        error: String,
    },

    #[error("Invalid URL in '{field}': {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },

    #[error("Configuration file already exists at {0}")]
    AlreadyExists(PathBuf),
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub sources: SourcesConfig,
    pub filter: FilterConfig,
    pub patterns: PatternsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Total request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Upstream source endpoints. Base URLs are configuration values so that
/// alternative mirrors (or a test server) can be substituted.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub wayback_base_url: String,
    pub commoncrawl_base_url: String,
    /// Crawl index identifier, e.g. "CC-MAIN-2018-22"
    pub commoncrawl_index: String,
    pub virustotal_base_url: String,
    /// Environment variable holding the VirusTotal API key
    pub api_key_env: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    pub allowed_schemes: Vec<String>,
    pub min_url_length: usize,
}

/// Recon highlight pattern groups, evaluated in file order.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternsConfig {
    pub groups: Vec<PatternGroupConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatternGroupConfig {
    pub label: String,
    pub patterns: Vec<String>,
}

impl AppConfig {
    /// Load configuration from `./config/backurls.toml`, falling back to
    /// the built-in template when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = if path.exists() {
            fs::read_to_string(path)?
        } else {
            DEFAULT_CONFIG.to_string()
        };
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create the default configuration file, refusing to overwrite one
    /// that already exists.
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = PathBuf::from(CONFIG_PATH);
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, DEFAULT_CONFIG)?;
        Ok(path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("sources.wayback_base_url", &self.sources.wayback_base_url),
            ("sources.commoncrawl_base_url", &self.sources.commoncrawl_base_url),
            ("sources.virustotal_base_url", &self.sources.virustotal_base_url),
        ] {
            if Url::parse(value).is_err() {
                return Err(ConfigError::InvalidUrl {
                    field: field.to_string(),
                    url: value.clone(),
                });
            }
        }

        if self.filter.allowed_schemes.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "filter.allowed_schemes".to_string(),
            });
        }
        if self.sources.commoncrawl_index.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "sources.commoncrawl_index".to_string(),
            });
        }

        // Regex validity is checked here so a broken pattern fails at
        // startup rather than mid-analysis.
        for group in &self.patterns.groups {
            for pattern in &group.patterns {
                if let Err(e) = regex::RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                {
                    return Err(ConfigError::InvalidRegex {
                        group: group.label.clone(),
                        pattern: pattern.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
