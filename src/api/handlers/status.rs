use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::error;

use crate::api::{state::AppState, types::ApiError};
use crate::snapshot::build_snapshot;

/// GET / and GET /api/factory-status
pub async fn get_factory_status(State(state): State<AppState>) -> Result<Response, ApiError> {
    let snapshot = build_snapshot(&state.gateway, &state.config, Utc::now()).await;

    let body = serde_json::to_vec(&snapshot).map_err(|e| {
        error!(error = %e, "Failed to serialize snapshot");
        ApiError::internal(e.to_string())
    })?;
    let cache_control =
        HeaderValue::from_str(&state.cache_control()).map_err(|e| ApiError::internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (header::CACHE_CONTROL, cache_control),
        ],
        body,
    )
        .into_response())
}

/// OPTIONS on the snapshot paths
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
