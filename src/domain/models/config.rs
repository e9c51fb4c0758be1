use serde::{Deserialize, Serialize};

/// Main configuration structure for stepsync
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Sync engine tuning
    #[serde(default)]
    pub sync: SyncConfig,

    /// External collaborator endpoints
    #[serde(default)]
    pub collaborators: CollaboratorsConfig,

    /// HTTP API server
    #[serde(default)]
    pub server: ServerConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".stepsync/stepsync.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl DatabaseConfig {
    /// `sqlx` connection URL for the configured path
    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rolling policy for file output: daily, hourly, never
    #[serde(default = "default_log_rotation")]
    pub rotation: String,

    /// Number of days to retain logs
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

const fn default_retention_days() -> u32 {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_log_rotation(),
            retention_days: default_retention_days(),
        }
    }
}

/// Sync engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncConfig {
    /// Maximum records returned by one convergence pull
    #[serde(default = "default_pull_page_size")]
    pub pull_page_size: usize,

    /// Look-back window used when a pull carries no cursor
    #[serde(default = "default_pull_lookback_days")]
    pub pull_lookback_days: u32,

    /// Longest range (in days) a range query may span
    #[serde(default = "default_max_range_days")]
    pub max_range_days: u32,

    /// Budget for the body-weight lookup before falling back to "unknown"
    #[serde(default = "default_weight_lookup_timeout_ms")]
    pub weight_lookup_timeout_ms: u64,
}

const fn default_pull_page_size() -> usize {
    100
}

const fn default_pull_lookback_days() -> u32 {
    30
}

const fn default_max_range_days() -> u32 {
    366
}

const fn default_weight_lookup_timeout_ms() -> u64 {
    1500
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            pull_page_size: default_pull_page_size(),
            pull_lookback_days: default_pull_lookback_days(),
            max_range_days: default_max_range_days(),
            weight_lookup_timeout_ms: default_weight_lookup_timeout_ms(),
        }
    }
}

/// Endpoints of the services this engine consumes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CollaboratorsConfig {
    /// Base URL of the weight service; weight is treated as unknown when unset
    #[serde(default)]
    pub weight_service_url: Option<String>,

    /// Base URL of the activity-level service; notifications are skipped when unset
    #[serde(default)]
    pub activity_level_url: Option<String>,

    /// Per-request timeout for collaborator calls
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

const fn default_request_timeout_ms() -> u64 {
    5000
}

impl Default for CollaboratorsConfig {
    fn default() -> Self {
        Self {
            weight_service_url: None,
            activity_level_url: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    9200
}

const fn default_enable_cors() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: default_enable_cors(),
        }
    }
}
