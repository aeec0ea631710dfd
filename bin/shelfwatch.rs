use std::{str::FromStr, sync::Arc};

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use shelfwatch::{api, AppState, Database, Settings};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let settings = Arc::new(
        Settings::new().context("Failed to load configuration from config.yaml / SHELFWATCH__* env")?,
    );

    let level = LevelFilter::from_str(&settings.server.log_level).unwrap_or(LevelFilter::Info);
    SimpleLogger::new()
        .with_level(level)
        .init()
        .context("Failed to initialize logger")?;

    let db = Database::new(&settings)
        .await
        .context("Failed to initialize database connections")?;

    let state = AppState::new(settings.clone(), db);

    let cancellation_token = CancellationToken::new();

    let server_token = cancellation_token.child_token();
    let mut server_handle = tokio::spawn(api::serve(state, server_token));

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Dashboard backend running. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
            result = &mut server_handle => {
                result.context("HTTP server task panicked")??;
                anyhow::bail!("HTTP server stopped without a shutdown signal");
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            result = &mut server_handle => {
                result.context("HTTP server task panicked")??;
                anyhow::bail!("HTTP server stopped without a shutdown signal");
            },
        };
    }

    cancellation_token.cancel();

    info!("Waiting for in-flight requests to finish...");
    server_handle
        .await
        .context("HTTP server task panicked")??;

    info!("Shutdown complete");
    Ok(())
}
