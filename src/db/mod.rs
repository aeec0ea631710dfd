use std::{future::Future, sync::Arc, time::Duration};

use log::{info, warn};

use crate::config::Settings;

pub mod clickhouse;
pub mod models;
pub mod postgres;

pub use clickhouse::ClickhouseClient;
pub use postgres::PostgresClient;

const MAX_CONNECT_ATTEMPTS: u32 = 3;

/// Combined database client for both stores.
///
/// PostgreSQL holds the dimension tables, SKU content, zone ad-performance
/// and `key_metrics`. ClickHouse holds the keyword-impression and sales/PDP
/// facts.
#[derive(Clone)]
pub struct Database {
    pub clickhouse: Arc<ClickhouseClient>,
    pub postgres: Arc<PostgresClient>,
}

impl Database {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let clickhouse = ClickhouseClient::new(settings.clickhouse.clone()).await?;
        let postgres = PostgresClient::new(settings.postgres.clone()).await?;

        // Only the relational store carries tables owned by this service
        postgres.migrate().await?;

        info!("Database clients ready (ClickHouse + PostgreSQL)");

        Ok(Self {
            clickhouse: Arc::new(clickhouse),
            postgres: Arc::new(postgres),
        })
    }

    /// Ping both stores.
    pub async fn health_check(&self) -> anyhow::Result<()> {
        futures::try_join!(
            self.clickhouse.health_check(),
            self.postgres.health_check()
        )?;
        Ok(())
    }
}

/// Run `attempt` up to three times with exponential backoff (200ms, 400ms).
pub(crate) async fn connect_with_retry<F, Fut>(store: &str, mut attempt: F) -> anyhow::Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let mut retries = 0;

    loop {
        match attempt().await {
            Ok(()) => return Ok(()),
            Err(e) => {
                retries += 1;

                if retries >= MAX_CONNECT_ATTEMPTS {
                    return Err(e.context(format!(
                        "Failed to connect to {} after {} attempts",
                        store, MAX_CONNECT_ATTEMPTS
                    )));
                }

                let delay = Duration::from_millis(100 * 2_u64.pow(retries));
                warn!(
                    "Failed to connect to {} (attempt {}/{}), retrying in {:?}... Error: {}",
                    store, retries, MAX_CONNECT_ATTEMPTS, delay, e
                );
                tokio::time::sleep(delay).await;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_succeeds_after_transient_failure() {
        let attempts = AtomicU32::new(0);
        let result = connect_with_retry("test", || async {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(anyhow::anyhow!("refused"))
            } else {
                Ok(())
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_three_attempts() {
        let attempts = AtomicU32::new(0);
        let result = connect_with_retry("test", || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("refused"))
        })
        .await;

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("after 3 attempts"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
