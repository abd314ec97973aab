//! Configuration module
//!
//! Handles the client configuration, TOML configuration files, CLI argument
//! parsing, and validation. Precedence, lowest first: built-in defaults, TOML
//! file, environment, CLI flags.

pub mod cli;
pub mod toml;
pub mod validator;

use crate::error::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the dataset repository URL
pub const ENV_DATASET_URL: &str = "QSIMBENCH_DATASET";
/// Environment variable holding the optional access token
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
/// Environment variable holding the cache directory
pub const ENV_CACHE_DIR: &str = "QSIMBENCH_CACHE_DIR";
/// Environment variable holding the cache TTL in seconds
pub const ENV_CACHE_TIMEOUT: &str = "QSIMBENCH_CACHE_TIMEOUT";

pub const DEFAULT_DATASET_URL: &str = "https://github.com/superceccho/qsimbench-dataset";
pub const DEFAULT_CACHE_DIR: &str = ".qsimbench_cache";
/// 30 days
pub const DEFAULT_CACHE_TIMEOUT_SECS: u64 = 30 * 24 * 60 * 60;

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Dataset repository URL (`https://github.com/<owner>/<repo>`)
    pub dataset_url: String,
    /// Optional access token sent as a bearer token
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Root of the local record cache
    pub cache_dir: PathBuf,
    /// Cache entries younger than this are served without network access
    pub cache_timeout_secs: u64,
    /// HTTP client settings
    pub http: HttpConfig,
    /// Maximum entries per memoized lookup (index, metadata)
    pub memo_capacity: usize,
    /// Ceiling on draws made by the random strategy
    pub max_random_draws: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            token: None,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            cache_timeout_secs: DEFAULT_CACHE_TIMEOUT_SECS,
            http: HttpConfig::default(),
            memo_capacity: 64,
            max_random_draws: 10_000_000,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Retries after the first attempt
    pub retries: u32,
    /// Exponential backoff factor in milliseconds
    pub backoff_factor_ms: u64,
    /// Statuses that trigger a retry
    pub retry_statuses: Vec<u16>,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff_factor_ms: 500,
            retry_statuses: vec![429, 500, 502, 503, 504],
            timeout_ms: 1000,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ClientConfig {
    /// Defaults overridden by whatever the environment provides
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Apply environment-style overrides from `lookup`
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_DATASET_URL) {
            self = self.with_dataset_url(&url)?;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            self.cache_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_CACHE_TIMEOUT) {
            self.cache_timeout_secs = raw.trim().parse().map_err(|_| {
                Error::Validation(format!(
                    "{} must be a non-negative integer, got {:?}",
                    ENV_CACHE_TIMEOUT, raw
                ))
            })?;
        }
        Ok(self)
    }

    /// Replace the dataset URL; must be http(s), trailing `/` is dropped
    pub fn with_dataset_url(mut self, url: &str) -> Result<Self> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::Validation(
                "dataset URL must start with 'http://' or 'https://'".to_string(),
            ));
        }
        self.dataset_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_cache_timeout_secs(mut self, secs: u64) -> Self {
        self.cache_timeout_secs = secs;
        self
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_secs(self.cache_timeout_secs)
    }

    /// `(owner, repo)` taken from the last two path segments of the dataset URL
    pub fn repo_coordinates(&self) -> Result<(String, String)> {
        let mut segments = self
            .dataset_url
            .trim_end_matches('/')
            .splitn(4, '/')
            .nth(3)
            .unwrap_or("")
            .rsplit('/')
            .filter(|s| !s.is_empty());
        match (segments.next(), segments.next()) {
            (Some(repo), Some(owner)) => Ok((owner.to_string(), repo.to_string())),
            _ => Err(Error::Validation(format!(
                "dataset URL {} must name an owner and a repository",
                self.dataset_url
            ))),
        }
    }

    /// Raw-content base under which every version directory lives
    pub fn raw_base_url(&self) -> Result<String> {
        let (owner, repo) = self.repo_coordinates()?;
        Ok(format!(
            "https://raw.githubusercontent.com/{owner}/{repo}/refs/heads/main/dataset"
        ))
    }

    /// Git tree API endpoint for the repository's main branch
    pub fn tree_api_url(&self) -> Result<String> {
        let (owner, repo) = self.repo_coordinates()?;
        Ok(format!("https://api.github.com/repos/{owner}/{repo}/git/trees/main"))
    }
}
