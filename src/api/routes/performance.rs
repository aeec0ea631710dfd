use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::api::{
    error::AppError,
    state::{AppState, LookupKey},
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/zones", get(zones))
}

pub async fn zones(State(state): State<AppState>) -> Result<Json<Arc<Vec<String>>>, AppError> {
    let postgres = &state.db.postgres;
    let zones = state
        .lookups
        .get_or_load(LookupKey::Zones, async {
            postgres.get_zones().await.map(Arc::new)
        })
        .await?;

    Ok(Json(zones))
}
