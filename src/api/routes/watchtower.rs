use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Local;

use crate::{
    analytics::{build_summary, DashboardQuery, WatchtowerSummary},
    api::{error::AppError, state::AppState},
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/summary", get(summary))
}

pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Arc<WatchtowerSummary>>, AppError> {
    let analytics = &state.settings.analytics;
    let filter = query.resolve(Local::now().date_naive(), analytics);
    let db = &state.db;

    let summary = state
        .summaries
        .get_or_load(filter.cache_key(), async {
            build_summary(db, &filter, analytics.sos_rank_window)
                .await
                .map(Arc::new)
        })
        .await?;

    Ok(Json(summary))
}
