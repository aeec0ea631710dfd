use std::time::Instant;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::api::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/db", get(db_health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct DbHealthResponse {
    /// Round trip to both stores, in milliseconds
    pub rtt: u128,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn db_health(State(state): State<AppState>) -> Result<Json<DbHealthResponse>, AppError> {
    let now = Instant::now();
    state
        .db
        .health_check()
        .await
        .map_err(|e| AppError::Unavailable(format!("{:#}", e)))?;

    Ok(Json(DbHealthResponse {
        rtt: now.elapsed().as_millis(),
    }))
}
