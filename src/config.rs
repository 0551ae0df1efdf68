//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub journal: JournalConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub insights: InsightsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which repository implementation stores entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Sqlite,
    Log,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "sqlite" => Ok(StorageBackend::Sqlite),
            "log" => Ok(StorageBackend::Log),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Entry storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_sync_writes")]
    pub sync_writes: bool,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("diary").to_string_lossy().to_string())
        .unwrap_or_else(|| "./diary_data".to_string())
}

fn default_sync_writes() -> bool {
    true
}

impl StorageConfig {
    /// Data directory with a leading `~/` expanded to the home directory
    pub fn data_path(&self) -> PathBuf {
        match (self.data_dir.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.data_dir),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
            sync_writes: default_sync_writes(),
        }
    }
}

/// Journal rules
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    /// Reject a second entry for a calendar day that already has one
    #[serde(default)]
    pub one_entry_per_day: bool,

    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

fn default_max_content_chars() -> usize {
    10_000
}

/// Hard ceiling on `max_content_chars`; keeps an entry of four-byte
/// characters inside one log record
pub const CONTENT_CHARS_CEILING: usize = 200_000;

impl JournalConfig {
    /// Effective content limit in characters
    pub fn content_limit(&self) -> usize {
        self.max_content_chars.min(CONTENT_CHARS_CEILING)
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            one_entry_per_day: false,
            max_content_chars: default_max_content_chars(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_enable_export")]
    pub enable_export: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

fn default_enable_export() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
            enable_export: default_enable_export(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Insight generation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InsightsConfig {
    /// Base URL of the text-generation service; local rules only when unset
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Overall budget before falling back to local rules
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    3
}

fn default_deadline_ms() -> u64 {
    15_000
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            url: None,
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut config: Config = toml::from_str(content).map_err(|e| e.to_string())?;
        if config.journal.max_content_chars > CONTENT_CHARS_CEILING {
            tracing::warn!(
                configured = config.journal.max_content_chars,
                ceiling = CONTENT_CHARS_CEILING,
                "journal.max_content_chars lowered to the ceiling"
            );
            config.journal.max_content_chars = CONTENT_CHARS_CEILING;
        }
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("diary").join("config.toml")),
            Some(PathBuf::from("/etc/diary/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (environment in production)
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Storage overrides
        if let Some(data_dir) = lookup("DIARY_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(backend) = lookup("DIARY_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(b) => self.storage.backend = b,
                Err(e) => tracing::warn!("Ignoring DIARY_STORAGE_BACKEND: {}", e),
            }
        }

        // API overrides
        if let Some(host) = lookup("DIARY_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("DIARY_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Insight service overrides
        if let Some(url) = lookup("DIARY_INSIGHTS_URL") {
            self.insights.url = if url.trim().is_empty() { None } else { Some(url) };
        }

        // Logging overrides
        if let Some(level) = lookup("DIARY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("DIARY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Diary Configuration
#
# Environment variables override these settings:
# - DIARY_DATA_DIR
# - DIARY_STORAGE_BACKEND
# - DIARY_API_HOST
# - DIARY_API_PORT
# - DIARY_INSIGHTS_URL
# - DIARY_LOG_LEVEL
# - DIARY_LOG_FORMAT

[storage]
# Entry store: sqlite, log or memory
backend = "sqlite"

# Directory for entries.db / entries.log
data_dir = "~/.local/share/diary"

# Fsync every write (log backend)
sync_writes = true

[journal]
# Reject a second entry for the same calendar day
one_entry_per_day = false

# Longest accepted entry, in characters
max_content_chars = 10000

[api]
# API server host
host = "127.0.0.1"

# API server port
port = 8090

# Allowed CORS origins (empty = permissive)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

# Enable the export endpoint
enable_export = true

[insights]
# Text-generation service; leave unset to use local rules only
# url = "http://localhost:8081"

# Per-request timeout in milliseconds
request_timeout_ms = 5000

# Attempts per generation call
max_retries = 3

# Total budget before falling back to local rules (ms)
deadline_ms = 15000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
