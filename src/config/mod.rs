#[allow(clippy::module_inception)]
mod config;

pub use config::{
    AnalyticsSettings, CacheSettings, ClickHouseSettings, PostgresSettings, ServerSettings,
    Settings,
};
