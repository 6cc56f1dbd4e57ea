//! HTTP request handlers for API endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use super::error::ApiError;
use super::state::AppState;
use crate::datasource::{CheckHealthResult, HealthStatus};
use crate::query::{QueryDataRequest, QueryDataResponse};

/// GET /health - Report whether the data source is configured
pub async fn check_health(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<CheckHealthResult>) {
    let result = state.datasource.check_health();
    let status = match result.status {
        HealthStatus::Ok => StatusCode::OK,
        HealthStatus::Error => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(result))
}

/// POST /query - Execute a batch of queries
///
/// Headers of the HTTP request are merged into the batch headers so that
/// identity forwarding works without the caller repeating them in the body.
pub async fn query_data(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<QueryDataRequest>, JsonRejection>,
) -> Result<Json<QueryDataResponse>, ApiError> {
    let Json(mut request) = payload?;

    for (name, value) in &headers {
        let present = request
            .headers
            .keys()
            .any(|key| key.eq_ignore_ascii_case(name.as_str()));
        if let (false, Ok(value)) = (present, value.to_str()) {
            request
                .headers
                .insert(name.as_str().to_string(), value.to_string());
        }
    }

    Ok(Json(state.datasource.query_data(request).await))
}
