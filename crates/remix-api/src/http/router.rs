//! Axum router configuration with middleware.
//!
//! `/remix` (and `/api/remix`) is the generation boundary; saved posts live
//! under `/api/v1`. Middleware: CORS, request tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let remix = post(handlers::remix::remix).fallback(handlers::remix::method_not_allowed);

    let api_routes = Router::new()
        .route(
            "/posts",
            get(handlers::post::list_posts).post(handlers::post::create_post),
        )
        .route(
            "/posts/{id}",
            get(handlers::post::get_post)
                .put(handlers::post::update_post)
                .delete(handlers::post::delete_post),
        );

    Router::new()
        .route("/remix", remix.clone())
        .route("/api/remix", remix)
        .route("/test", get(handlers::remix::provider_check))
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness check; does not touch the provider.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
