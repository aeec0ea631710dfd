use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::{
    analytics::{pivot_availability, AvailabilityGrid, AvailabilityQuery},
    api::{error::AppError, state::AppState},
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/brand-sku-city-day", get(brand_sku_city_day))
}

pub async fn brand_sku_city_day(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityGrid>, AppError> {
    let filter = query.resolve(&state.settings.analytics);
    let cells = state.db.clickhouse.get_availability_cells(&filter).await?;

    Ok(Json(pivot_availability(&filter, cells)))
}
