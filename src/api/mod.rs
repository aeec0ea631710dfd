//! HTTP JSON API consumed by the dashboard frontend.

use std::time::Duration;

use anyhow::Context;
use axum::{middleware::from_fn, routing::get, Router};
use log::info;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::AppState;

pub fn construct_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/watchtower", routes::watchtower::routes())
        .nest("/availability-analysis", routes::availability::routes())
        .route("/content-analysis", get(routes::content::content_analysis))
        .nest("/performance-marketing", routes::performance::routes())
        .nest("/filters", routes::filters::routes())
        .nest("/key-metrics", routes::key_metrics::routes());

    Router::new()
        .nest("/api", api)
        .nest("/health", routes::health::routes())
        .with_state(state)
        .layer(from_fn(middleware::log_requests))
        .layer(CorsLayer::permissive().max_age(Duration::from_secs(60 * 60)))
}

/// Serve until `cancellation_token` fires, then drain in-flight requests.
pub async fn serve(state: AppState, cancellation_token: CancellationToken) -> anyhow::Result<()> {
    let address = format!("{}:{}", state.settings.server.host, state.settings.server.port);
    let app = construct_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(cancellation_token.cancelled_owned())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
    use serde_json::{json, Value};
    use tokio_postgres::NoTls;
    use tower::ServiceExt;

    use crate::{
        config::{
            AnalyticsSettings, CacheSettings, ClickHouseSettings, PostgresSettings, ServerSettings,
            Settings,
        },
        db::{ClickhouseClient, Database, PostgresClient},
    };

    // Nothing listens here, so every store call is refused immediately
    const DEAD_PORT: u16 = 1;

    fn offline_settings(http_port: u16) -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: http_port,
                ..ServerSettings::default()
            },
            clickhouse: ClickHouseSettings {
                url: format!("http://127.0.0.1:{}", DEAD_PORT),
                user: "default".to_string(),
                password: String::new(),
                database: "retail".to_string(),
            },
            postgres: PostgresSettings {
                host: "127.0.0.1".to_string(),
                port: DEAD_PORT,
                user: "postgres".to_string(),
                password: "postgres".to_string(),
                database: "retail".to_string(),
                pool_size: 2,
            },
            cache: CacheSettings::default(),
            analytics: AnalyticsSettings::default(),
        }
    }

    /// State whose clients connect lazily to stores that are down
    fn offline_state(http_port: u16) -> AppState {
        let settings = offline_settings(http_port);

        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&settings.postgres.host)
            .port(settings.postgres.port)
            .user(&settings.postgres.user)
            .password(&settings.postgres.password)
            .dbname(&settings.postgres.database)
            .connect_timeout(Duration::from_secs(2));
        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager).max_size(2).build().unwrap();

        let client = ::clickhouse::Client::default()
            .with_url(settings.clickhouse.url.clone())
            .with_database(settings.clickhouse.database.clone());

        let db = Database {
            clickhouse: Arc::new(ClickhouseClient { client }),
            postgres: Arc::new(PostgresClient { pool }),
        };

        AppState::new(Arc::new(settings), db)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = construct_router(offline_state(0))
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_ok_without_stores() {
        let (status, body) = send(get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_db_health_reports_unavailable() {
        let (status, body) = send(get_request("/health/db")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "unavailable");
    }

    #[tokio::test]
    async fn test_key_metric_read_is_ok_when_store_is_down() {
        let (status, body) = send(get_request("/api/key-metrics/foo")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "key": "foo", "value": null, "display": null, "status": "unavailable" })
        );
    }

    #[tokio::test]
    async fn test_keys_route_is_not_a_metric_key() {
        let (status, body) = send(get_request("/api/key-metrics/keys")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, body) = send(get_request("/api/key-metrics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn test_key_metric_write_reports_failure() {
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/api/key-metrics/foo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"value":"1500"}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": false }));

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/key-metrics/foo")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(request).await;
        assert_eq!(body, json!({ "deleted": false }));
    }

    #[tokio::test]
    async fn test_summary_failure_is_internal_error() {
        let (status, body) = send(get_request("/api/watchtower/summary?brand=Amul")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn test_serve_fails_when_port_is_taken() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let result = serve(offline_state(port), CancellationToken::new()).await;

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to bind"));
    }
}
