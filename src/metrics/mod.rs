//! Cache-aside store for named key metrics.
//!
//! - [`repository`] - Backing-store seam, implemented by [`PostgresClient`](crate::db::PostgresClient)
//! - [`store`] - TTL-cached reads and invalidating writes that never fail the caller

mod repository;
mod store;

pub use repository::MetricRepository;
pub use store::{KeyMetricStore, MetricLookup};
