use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{api::state::AppState, db::models::KeyMetric, utils::format_currency_str};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(all_metrics))
        .route("/keys", get(metric_keys))
        .route(
            "/{key}",
            get(get_metric).put(set_metric).delete(delete_metric),
        )
}

/// Never an error: an unavailable store reads as `status: "unavailable"`.
#[derive(Debug, Serialize)]
pub struct MetricResponse {
    pub key: String,
    pub value: Option<String>,
    /// Stored value rendered as currency, `"0"` when it is not numeric
    pub display: Option<String>,
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SetMetricBody {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SetMetricResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteMetricResponse {
    pub deleted: bool,
}

pub async fn all_metrics(State(state): State<AppState>) -> Json<BTreeMap<String, String>> {
    Json(state.metrics.get_all_metrics().await)
}

pub async fn metric_keys(State(state): State<AppState>) -> Json<Vec<KeyMetric>> {
    Json(state.metrics.get_all_metric_keys().await)
}

pub async fn get_metric(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<MetricResponse> {
    let lookup = state.metrics.lookup_metric(&key).await;
    let status = lookup.status();
    let value = lookup.into_value();

    Json(MetricResponse {
        key,
        display: value.as_deref().map(format_currency_str),
        value,
        status,
    })
}

pub async fn set_metric(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<SetMetricBody>,
) -> Json<SetMetricResponse> {
    Json(SetMetricResponse {
        success: state.metrics.set_metric(&key, &body.value).await,
    })
}

pub async fn delete_metric(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteMetricResponse> {
    Json(DeleteMetricResponse {
        deleted: state.metrics.delete_metric(&key).await,
    })
}
