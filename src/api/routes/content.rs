use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    analytics::{analyze_content, ContentAnalysis, ContentQuery},
    api::{error::AppError, state::AppState},
};

pub async fn content_analysis(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<ContentAnalysis>, AppError> {
    let filter = query.resolve();
    let skus = state.db.postgres.get_sku_content(&filter).await?;

    Ok(Json(analyze_content(&filter, skus)))
}
