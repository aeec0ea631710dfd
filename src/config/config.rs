use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// HTTP server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// One of `error`, `warn`, `info`, `debug`, `trace`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// ClickHouse connection configuration.
///
/// Holds the columnar mirrors of the fact tables (`rb_kw`, `rb_pdp_olap`)
/// used for high-cardinality aggregates.
#[derive(Debug, Deserialize, Clone)]
pub struct ClickHouseSettings {
    pub url: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// PostgreSQL database connection configuration.
///
/// Used for:
/// - Dimension tables (brands, locations, platforms)
/// - SKU content and zone ad-performance tables
/// - The `key_metrics` table owned by this service
#[derive(Debug, Deserialize, Clone)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_pool_size() -> usize {
    16
}

/// Cache lifetimes and capacity.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    /// TTL for key-metric lookups (rarely changing values)
    #[serde(default = "default_metric_ttl_secs")]
    pub metric_ttl_secs: u64,
    /// TTL for dashboard responses and dimension listings
    #[serde(default = "default_response_ttl_secs")]
    pub response_ttl_secs: u64,
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            metric_ttl_secs: default_metric_ttl_secs(),
            response_ttl_secs: default_response_ttl_secs(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_metric_ttl_secs() -> u64 {
    86_400 // 24 hours
}

fn default_response_ttl_secs() -> u64 {
    300
}

fn default_max_capacity() -> u64 {
    10_000
}

/// Defaults applied to dashboard queries when the caller leaves them out.
#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsSettings {
    /// Keyword impressions ranked at or above this position count toward share of search
    #[serde(default = "default_sos_rank_window")]
    pub sos_rank_window: u32,
    #[serde(default = "default_period_days")]
    pub default_period_days: u32,
    #[serde(default = "default_months")]
    pub default_months: u32,
    #[serde(default = "default_day_range")]
    pub default_day_range: u32,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            sos_rank_window: default_sos_rank_window(),
            default_period_days: default_period_days(),
            default_months: default_months(),
            default_day_range: default_day_range(),
        }
    }
}

fn default_sos_rank_window() -> u32 {
    10
}

fn default_period_days() -> u32 {
    30
}

fn default_months() -> u32 {
    6
}

fn default_day_range() -> u32 {
    7
}

/// Root application configuration.
///
/// Loaded from an optional `config.yaml`, then overridden by environment
/// variables such as `SHELFWATCH__POSTGRES__HOST`.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub clickhouse: ClickHouseSettings,
    pub postgres: PostgresSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("SHELFWATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}
