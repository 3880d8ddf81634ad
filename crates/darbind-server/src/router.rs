//! Router assembly.
//!
//! The historical front-end variants served the same protocol under
//! different prefixes (`/desktop`, `/edit/textilla`, bare). That difference
//! is one nest call here, driven by configuration.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::routes;
use crate::state::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, route_prefix: &str) -> Router {
    // Concurrency-limit init: it is the one route that mints filesystem
    // state, and reload storms should queue rather than pile up.
    let init_routes = routes::init::router().layer(tower::limit::ConcurrencyLimitLayer::new(32));

    let api = Router::new()
        .merge(init_routes)
        .merge(routes::dars::router(Arc::clone(&state)))
        .merge(routes::checkouts::router())
        .merge(routes::sessions::router())
        .with_state(state);

    let app = if route_prefix.is_empty() {
        api
    } else {
        Router::new().nest(route_prefix, api)
    };

    // CORS: editors are served from a static bucket on another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ]);

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}
