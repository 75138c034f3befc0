//! REST API handlers for the menu feed
//!
//! JSON and plain-text menu renderings, cache diagnostics, forced refresh
//! and health.

use super::{helpers::*, models::*, state::SharedState};
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

/// Creates routes for menu-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(root))
        .route("/menu", get(menu_json))
        .route("/menu/text", get(menu_text))
        .route("/menu/refresh", get(refresh_get).post(refresh_post))
        .route("/cache-status", get(cache_status))
        .route("/health", get(health))
}

/// Endpoint: GET /
/// Service metadata and endpoint directory.
async fn root(State(state): State<SharedState>) -> Json<Value> {
    let status = state.menu.cache_status();
    let snapshot = state.menu.snapshot();
    let policy = describe_refresh_policy(state.menu.window());

    Json(json!({
        "service": format!("{} - Menu API", state.config.restaurant_name),
        "purpose": "Provides real-time menu data to voice assistants",
        "server": SERVER_NAME,
        "version": SERVICE_VERSION,
        "environment": state.config.environment,
        "total_items": snapshot.items.len(),
        "refresh_policy": format!("{} (or force refresh anytime)", policy),
        "cache_status": status,
        "endpoints": {
            "menu_json": "/menu - JSON format (recommended for knowledge bases)",
            "menu_text": "/menu/text - Plain text format",
            "refresh": "/menu/refresh - Force refresh immediately",
            "cache_status": "/cache-status - View cache details",
            "health": "/health - Service health check"
        }
    }))
}

/// Endpoint: GET /menu
/// Menu grouped by category. Refreshes first if the cache is stale.
async fn menu_json(State(state): State<SharedState>) -> Json<MenuResponse> {
    let snapshot = state.menu.get_menu().await;
    let status = state.menu.cache_status();

    Json(build_menu_response(
        &snapshot,
        &status,
        &state.config.restaurant_name,
        &state.config.environment,
    ))
}

/// Endpoint: GET /menu/text
/// Plain-text rendering of the same menu.
async fn menu_text(State(state): State<SharedState>) -> impl IntoResponse {
    let snapshot = state.menu.get_menu().await;
    let status = state.menu.cache_status();

    let text = render_menu_text(
        &snapshot,
        &status,
        &state.config.restaurant_name,
        state.menu.window(),
    );

    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text)
}

/// Endpoint: GET /cache-status
async fn cache_status(State(state): State<SharedState>) -> Json<Value> {
    let status = state.menu.cache_status();
    let window_minutes = state.menu.window().num_minutes();

    let message = if status.is_fresh {
        "Cache is fresh"
    } else {
        "Cache is stale - will refresh on next request"
    };
    let cycles_avoided = match (status.cache_age_minutes, window_minutes) {
        (Some(age), window) if window > 0 => age / window,
        _ => 0,
    };

    Json(json!({
        "cache_status": status,
        "message": message,
        "stats": {
            "total_items_in_menu": status.items,
            "refresh_interval_minutes": window_minutes,
            "api_calls_saved": format!("Estimated {} refresh cycles avoided", cycles_avoided)
        }
    }))
}

/// Endpoint: POST /menu/refresh
async fn refresh_post(State(state): State<SharedState>) -> Json<RefreshResponse> {
    info!(method = "POST", "manual refresh requested");
    Json(force_refresh(&state).await)
}

/// Endpoint: GET /menu/refresh
/// Browser-friendly variant of the forced refresh.
async fn refresh_get(State(state): State<SharedState>) -> Json<RefreshResponse> {
    info!(method = "GET", "manual refresh requested");
    Json(force_refresh(&state).await)
}

async fn force_refresh(state: &SharedState) -> RefreshResponse {
    let success = state.menu.refresh(true).await;
    let snapshot = state.menu.snapshot();
    let items = snapshot.items.len();

    let message = if success {
        format!("Menu refreshed, now showing {} items", items)
    } else {
        format!("Error refreshing menu, still showing {} cached items", items)
    };

    RefreshResponse {
        success,
        items,
        updated: snapshot.last_refresh.map(|ts| ts.to_rfc3339()),
        message,
        cache_status: state.menu.cache_status(),
    }
}

/// Endpoint: GET /health
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let snapshot = state.menu.snapshot();

    Json(HealthResponse {
        status: "healthy",
        environment: state.config.environment.clone(),
        items: snapshot.items.len(),
        last_refresh: snapshot.last_refresh.map(|ts| ts.to_rfc3339()),
        cache_info: state.menu.cache_status(),
    })
}
