//! Routing module for the menu service

use crate::menu::state::SharedState;
use axum::{body::Body, extract::Request, middleware::Next, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Creates and configures the application router with all routes and middleware
pub fn create_app_router(state: SharedState) -> Router {
    // Middleware: Log requests
    let log_layer = axum::middleware::from_fn(|req: Request<Body>, next: Next| async move {
        let method = req.method().clone();
        let uri = req.uri().clone();
        info!(%method, %uri, "request");
        let res = next.run(req).await;
        if !res.status().is_success() {
            warn!(%method, %uri, status = %res.status(), "request failed");
        }
        res
    });

    // Middleware: CORS (knowledge-base crawlers and browsers alike)
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new().merge(crate::menu::routes());
    if !state.config.disable_debug_routes {
        router = router.merge(crate::debug::routes());
    }

    router.layer(log_layer).layer(cors_layer).with_state(state)
}
