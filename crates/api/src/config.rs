use domain::services::{
    CacheOptions, ConfigurationOptions, ContentOptions, MediaOptions, NotifierOptions,
};
use domain::AdminOptions;
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound for request bodies; media uploads arrive base64-encoded.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL, or `memory://` for in-process stores.
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` or `pretty`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_max_size")]
    pub max_size: usize,

    #[serde(default = "default_cache_ttl")]
    pub default_ttl_secs: u64,

    /// Interval of the expired-entry sweep. 0 disables the job.
    #[serde(default = "default_cache_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// How long a cached setting is trusted before the store is consulted.
    #[serde(default = "default_freshness_window")]
    pub freshness_window_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: default_cache_max_size(),
            default_ttl_secs: default_cache_ttl(),
            cleanup_interval_secs: default_cache_cleanup_interval(),
            freshness_window_secs: default_freshness_window(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default = "default_max_listener_errors")]
    pub max_listener_errors: u32,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            max_listener_errors: default_max_listener_errors(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,

    #[serde(default = "default_keep_versions")]
    pub default_keep_versions: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: default_max_content_bytes(),
            default_keep_versions: default_keep_versions(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    // 50 MiB of media plus base64 overhead
    72 * 1024 * 1024
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_cache_max_size() -> usize {
    1000
}
fn default_cache_ttl() -> u64 {
    3600
}
fn default_cache_cleanup_interval() -> u64 {
    300
}
fn default_freshness_window() -> u64 {
    300
}
fn default_history_limit() -> usize {
    1000
}
fn default_max_listener_errors() -> u32 {
    5
}
fn default_max_content_bytes() -> usize {
    1024 * 1024
}
fn default_keep_versions() -> usize {
    10
}
fn default_upload_dir() -> String {
    "uploads".to_string()
}
fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

fn secs(value: u64) -> chrono::Duration {
    chrono::Duration::seconds(value.min(i64::MAX as u64 / 1000) as i64)
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with ADMIN__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("ADMIN").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration from embedded defaults plus overrides, without
    /// touching the filesystem or environment.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""

            [logging]
            level = "info"
            format = "json"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "ADMIN__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.cache.max_size == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "cache.max_size must be at least 1".to_string(),
            ));
        }

        if self.content.default_keep_versions == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "content.default_keep_versions must be at least 1".to_string(),
            ));
        }

        if self.media.upload_dir.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "media.upload_dir must be set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }

    /// True when `database.url` selects the in-memory stores.
    pub fn uses_memory_store(&self) -> bool {
        persistence::db::DatabaseConfig::from(&self.database).is_memory()
    }

    /// Component options derived from this configuration.
    pub fn admin_options(&self) -> AdminOptions {
        AdminOptions {
            cache: CacheOptions {
                max_size: self.cache.max_size,
                default_ttl: secs(self.cache.default_ttl_secs),
            },
            notifier: NotifierOptions {
                history_limit: self.notifier.history_limit,
                max_listener_errors: self.notifier.max_listener_errors,
            },
            configuration: ConfigurationOptions {
                freshness_window: secs(self.cache.freshness_window_secs),
                history_limit: self.notifier.history_limit,
            },
            content: ContentOptions {
                max_content_bytes: self.content.max_content_bytes,
                default_keep_versions: self.content.default_keep_versions,
            },
            media: MediaOptions {
                max_upload_bytes: self.media.max_upload_bytes,
            },
        }
    }
}
