pub mod analytics;
pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod metrics;
pub mod utils;

pub use api::{construct_router, AppState};
pub use cache::QueryCache;
pub use config::Settings;
pub use db::Database;
pub use metrics::{KeyMetricStore, MetricLookup, MetricRepository};
