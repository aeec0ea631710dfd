use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{
    analytics::ALL,
    api::{
        error::AppError,
        state::{AppState, LookupKey},
    },
    db::models::Dimension,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/{dimension}", get(dimension_values))
}

/// Dropdown options for a filter, `"All"` first.
pub async fn dimension_values(
    State(state): State<AppState>,
    Path(dimension): Path<Dimension>,
) -> Result<Json<Arc<Vec<String>>>, AppError> {
    let postgres = &state.db.postgres;
    let values = state
        .lookups
        .get_or_load(LookupKey::Dimension(dimension), async {
            let mut values = vec![ALL.to_string()];
            values.extend(postgres.get_dimension_values(dimension).await?);
            Ok::<_, anyhow::Error>(Arc::new(values))
        })
        .await?;

    Ok(Json(values))
}
