use axum::{
    http::{header, Method, StatusCode},
    middleware,
    response::Response,
    routing::get,
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

/// Browser preflights are answered by the CORS layer; report them as 204 like plain OPTIONS.
async fn options_no_content(method: Method, mut response: Response) -> Response {
    if method == Method::OPTIONS && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Snapshot endpoints
        .route(
            "/",
            get(handlers::get_factory_status).options(handlers::preflight),
        )
        .route(
            "/api/factory-status",
            get(handlers::get_factory_status).options(handlers::preflight),
        )
        // Liveness
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .layer(cors)
        .layer(middleware::map_response(options_no_content))
}
