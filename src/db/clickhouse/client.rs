use anyhow::Context;
use clickhouse::Client;
use log::info;
use url::Url;

use crate::{config::ClickHouseSettings, db::connect_with_retry};

/// ClickHouse client for the fact-table mirrors.
///
/// Read-only: the keyword-impression and sales/PDP tables are loaded by
/// upstream pipelines and only aggregated here.
#[derive(Clone)]
pub struct ClickhouseClient {
    pub client: Client,
}

impl ClickhouseClient {
    pub async fn new(settings: ClickHouseSettings) -> anyhow::Result<Self> {
        let url = Url::parse(&settings.url)
            .with_context(|| format!("Invalid ClickHouse URL: {}", settings.url))?;

        info!(
            "Connecting to ClickHouse at {}/{}",
            url.host_str().unwrap_or("localhost"),
            settings.database
        );

        let client = Client::default()
            .with_url(settings.url.clone())
            .with_user(settings.user.clone())
            .with_password(settings.password.clone())
            .with_database(settings.database.clone());

        connect_with_retry("ClickHouse", || async {
            client
                .query("SELECT 1")
                .fetch_one::<u8>()
                .await
                .map(|_| ())
                .map_err(anyhow::Error::from)
        })
        .await?;

        info!("Successfully connected to ClickHouse");
        Ok(Self { client })
    }

    /// Health check - verify connection is still alive
    pub async fn health_check(&self) -> anyhow::Result<()> {
        self.client
            .query("SELECT 1")
            .fetch_one::<u8>()
            .await
            .context("ClickHouse health check failed")?;
        Ok(())
    }
}
