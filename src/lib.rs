//! Person profile aggregation
//!
//! Resolves a person's name into one consolidated record built from three
//! sources: search-result snippets, the search engine's knowledge panel, and
//! an encyclopedia summary API. Browser-backed sources run through chromiumoxide.

pub mod aggregator;
pub mod browser;
pub mod browser_setup;
pub mod extraction;
pub mod knowledge_panel;
mod manager;
pub mod profile;
pub mod reference_api;
pub mod report;
pub mod service;
pub mod store;
pub mod utils;
pub mod web_search;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::extraction::StrategyTable;
use crate::profile::{MAX_SNIPPETS, MIN_SNIPPET_LENGTH};
use crate::utils::constants::{
    CHROME_USER_AGENT, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_LOCALE, REFERENCE_ENDPOINT,
    REFERENCE_USER_AGENT, SEARCH_ENDPOINT, SEARCH_QUERY_SUFFIX,
};
use crate::utils::{validate_navigation_timeout, validate_settle_timeout};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub navigation: NavigationConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub strategies: StrategyTable,

    #[serde(default)]
    pub reference: ReferenceConfig,

    /// Deadline for one query: session start plus every source
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

/// Browser launch and fingerprint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_locale")]
    pub locale: String,

    /// Value of the Accept-Language header sent with every request
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Window dimensions
    #[serde(default)]
    pub window: WindowConfig,

    /// CDP request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Disable web security features (Same-Origin Policy, etc.)
    /// WARNING: Only enable for trusted content
    #[serde(default = "default_disable_security")]
    pub disable_security: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,

    #[serde(default = "default_window_height")]
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Bound on page load and on the network-idle wait
    #[serde(default = "default_navigation_timeout_ms")]
    pub timeout_ms: u64,

    /// How long the network must stay quiet to count as idle
    #[serde(default = "default_network_idle_ms")]
    pub network_idle_ms: u64,

    #[serde(default)]
    pub settle: SettleStrategy,
}

/// How to let dynamic results finish rendering before extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SettleStrategy {
    /// Sleep a fixed delay
    Fixed {
        #[serde(default = "default_settle_delay_ms")]
        delay_ms: u64,
    },
    /// Poll until any snippet locator matches, up to `timeout_ms`
    ContentReady {
        #[serde(default = "default_settle_delay_ms")]
        timeout_ms: u64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Appended to the name to bias results toward biographical pages
    #[serde(default = "default_query_suffix")]
    pub query_suffix: String,

    #[serde(default = "default_max_snippets")]
    pub max_snippets: usize,

    /// Snippets must be strictly longer than this many characters
    ///
    /// Can only be raised above the built-in minimum; `max_snippets` can only
    /// be lowered below the built-in cap.
    #[serde(default = "default_min_snippet_length")]
    pub min_snippet_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_reference_base_url")]
    pub base_url: String,

    #[serde(default = "default_reference_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_reference_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

fn default_query_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    CHROME_USER_AGENT.to_string()
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_accept_language() -> String {
    DEFAULT_ACCEPT_LANGUAGE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_disable_security() -> bool {
    false
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}

fn default_network_idle_ms() -> u64 {
    500
}

fn default_settle_delay_ms() -> u64 {
    2_000
}

fn default_search_endpoint() -> String {
    SEARCH_ENDPOINT.to_string()
}

fn default_query_suffix() -> String {
    SEARCH_QUERY_SUFFIX.to_string()
}

fn default_max_snippets() -> usize {
    MAX_SNIPPETS
}

fn default_min_snippet_length() -> usize {
    MIN_SNIPPET_LENGTH
}

fn default_reference_base_url() -> String {
    REFERENCE_ENDPOINT.to_string()
}

fn default_reference_user_agent() -> String {
    REFERENCE_USER_AGENT.to_string()
}

fn default_reference_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            navigation: NavigationConfig::default(),
            search: SearchConfig::default(),
            strategies: StrategyTable::default(),
            reference: ReferenceConfig::default(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            locale: default_locale(),
            accept_language: default_accept_language(),
            window: WindowConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
            disable_security: default_disable_security(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_navigation_timeout_ms(),
            network_idle_ms: default_network_idle_ms(),
            settle: SettleStrategy::default(),
        }
    }
}

impl Default for SettleStrategy {
    fn default() -> Self {
        Self::Fixed {
            delay_ms: default_settle_delay_ms(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            query_suffix: default_query_suffix(),
            max_snippets: default_max_snippets(),
            min_snippet_length: default_min_snippet_length(),
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_reference_base_url(),
            user_agent: default_reference_user_agent(),
            timeout_secs: default_reference_timeout_secs(),
        }
    }
}

impl Config {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_navigation_timeout("navigation.timeout_ms", self.navigation.timeout_ms)?;
        validate_navigation_timeout("navigation.network_idle_ms", self.navigation.network_idle_ms)?;
        match &self.navigation.settle {
            SettleStrategy::Fixed { delay_ms } => {
                validate_settle_timeout("navigation.settle.delay_ms", *delay_ms)?;
            }
            SettleStrategy::ContentReady { timeout_ms } => {
                validate_settle_timeout("navigation.settle.timeout_ms", *timeout_ms)?;
            }
        }

        if self.query_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                "query_timeout_secs must be at least 1 second".to_string(),
            ));
        }
        if self.search.max_snippets == 0 || self.search.max_snippets > MAX_SNIPPETS {
            return Err(ConfigError::Invalid(format!(
                "search.max_snippets must be between 1 and {MAX_SNIPPETS}. Received: {}",
                self.search.max_snippets
            )));
        }
        if self.search.min_snippet_length < MIN_SNIPPET_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "search.min_snippet_length cannot be below {MIN_SNIPPET_LENGTH}. Received: {}",
                self.search.min_snippet_length
            )));
        }
        if self.strategies.snippets.is_empty() {
            return Err(ConfigError::Invalid(
                "strategies.snippets must list at least one locator".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load config from `path`, or from config.yaml in the package root
///
/// Falls back to defaults when no path is given and no config.yaml exists.
/// The loaded config is validated.
pub fn load_yaml_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.yaml");
            default_path.exists().then_some(default_path)
        }
    };

    let config = match config_path {
        Some(config_path) => {
            let contents = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
                path: config_path.clone(),
                source,
            })?;
            serde_yaml::from_str(&contents)?
        }
        None => Config::default(),
    };

    config.validate()?;
    Ok(config)
}

/// Resolve `name` with a fresh browser session and the default config
///
/// Reads config.yaml from the package root when present.
pub async fn resolve_profile(name: &str) -> anyhow::Result<ProfileRecord> {
    let config = load_yaml_config(None)?;
    let query = ProfileQuery::new(name)?;
    let aggregator = ProfileAggregator::new(std::sync::Arc::new(SessionManager::new()), config)?;
    Ok(aggregator.aggregate(&query).await?)
}

pub use aggregator::{ProfileAggregator, ProfileError};
pub use browser::{
    BrowserError, BrowserResult, BrowserSession, BrowserWrapper, SessionLauncher, SessionPage,
    download_managed_browser, find_browser_executable,
};
pub use browser_setup::launch_browser;
pub use manager::{ChromiumSession, SessionManager};
pub use profile::{
    KnowledgePanel, ProfileQuery, ProfileRecord, QueryError, ReferenceSummary, SnippetList,
};
pub use report::{HtmlReport, PdfReport, ReportError, ReportRenderer};
pub use service::{ProfileService, RecordSource};
pub use store::{FileProfileStore, MemoryProfileStore, ProfileStore, StoreError};
