use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;
use tracing::error;

use crate::api::{
    state::AppState,
    types::{ApiError, HealthResponse},
};

/// GET /healthz -- liveness probe, never touches the record source
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        source: state.gateway.source_name().to_string(),
        uptime_secs: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Turn a handler panic into the same 500 body as any other assembly fault.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(panic = %detail, "Snapshot handler panicked");
    ApiError::internal(detail).into_response()
}
