//! Configuration.
//!
//! resolvit is driven by a TOML file, `/etc/resolvit/resolvit.conf` by
//! default; the `RESOLVIT_CONFIG` environment variable points elsewhere.
//! Loading resolves defaults, extracts per-list filtering tables, and
//! validates everything up front so startup fails fast on bad input.

pub mod loader;
pub mod validation;

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::filtering::ListConfig;
use crate::Result;

/// Default configuration path when `RESOLVIT_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/resolvit/resolvit.conf";

/// Environment variable overriding the configuration path.
pub const CONFIG_ENV_VAR: &str = "RESOLVIT_CONFIG";

/// Server-level settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Address both the UDP and TCP listeners bind to.
    #[serde(default)]
    pub listen: String,
}

/// Upstream resolver settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UpstreamConfig {
    /// Forwarder targets, tried in order. `:53` is appended when the
    /// entry carries no port.
    #[serde(default)]
    pub servers: Vec<String>,
}

/// Log settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Minimum severity: debug|info|warn|error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Sink: `stdout` or a file path
    #[serde(default = "default_log_file")]
    pub file: String,
    /// Maximum parser diagnostics per blocklist
    #[serde(default = "default_error_limit")]
    pub blocklist_error_limit: i64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "stdout".to_string()
}

fn default_error_limit() -> i64 {
    20
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
            blocklist_error_limit: default_error_limit(),
        }
    }
}

/// Local records file settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecordsConfig {
    /// Records file path; empty disables local resolution.
    pub resolve_from: String,
}

/// Allowlist settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AllowlistConfig {
    pub path: String,
}

/// Custom blocklist sources.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CustomConfig {
    /// Extra sources, each a path or URL.
    pub list: Vec<String>,
}

/// Content filtering settings.
///
/// Besides the fixed keys, any other table under `[filtering]` is a
/// per-list configuration keyed by list id (`[filtering.<id>]`).
#[derive(Debug, Clone, Deserialize)]
pub struct FilteringConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Refresh period as a duration string (`24h`, `30m`, …); empty or
    /// `0` disables periodic refresh.
    #[serde(default = "default_update_interval")]
    pub update_interval: String,
    #[serde(default)]
    pub blocked_log: String,
    #[serde(default)]
    pub block_subdomains: bool,
    #[serde(default)]
    pub allowlist: AllowlistConfig,
    #[serde(default)]
    pub custom: CustomConfig,

    /// Remaining `[filtering.*]` tables, resolved by the loader.
    #[serde(flatten)]
    other: HashMap<String, toml::Value>,

    /// Per-list configurations extracted from `other`.
    #[serde(skip)]
    pub lists: HashMap<String, ListConfig>,
}

fn default_cache_dir() -> String {
    "/var/cache/resolvit".to_string()
}

fn default_update_interval() -> String {
    "24h".to_string()
}

impl Default for FilteringConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cache_dir: default_cache_dir(),
            update_interval: default_update_interval(),
            blocked_log: String::new(),
            block_subdomains: false,
            allowlist: AllowlistConfig::default(),
            custom: CustomConfig::default(),
            other: HashMap::new(),
            lists: HashMap::new(),
        }
    }
}

impl FilteringConfig {
    /// Parsed refresh interval; `validate` has already checked the string.
    pub fn update_interval_duration(&self) -> Duration {
        loader::parse_duration(&self.update_interval).unwrap_or(Duration::ZERO)
    }
}

/// All runtime options for the resolvit server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub records: RecordsConfig,
    #[serde(default)]
    pub filtering: FilteringConfig,
}

impl Config {
    /// Load and validate the configuration from the default path or
    /// `RESOLVIT_CONFIG`.
    pub fn setup() -> Result<Self> {
        loader::load_from_env()
    }

    /// Load and validate the configuration from an explicit path.
    pub fn from_file(path: &str) -> Result<Self> {
        loader::load_from_file(path)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        loader::load_from_toml(contents)
    }
}
