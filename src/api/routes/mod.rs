pub mod availability;
pub mod content;
pub mod filters;
pub mod health;
pub mod key_metrics;
pub mod performance;
pub mod watchtower;
