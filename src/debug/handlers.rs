//! Catalog passthrough handlers
//!
//! Forward raw catalog API responses so operators can see category ids and
//! item shapes when setting up a whitelist.

use crate::{catalog::CatalogError, menu::SharedState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

/// Sample size when the query string does not give one
const DEFAULT_SAMPLE_LIMIT: usize = 5;
const MAX_SAMPLE_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct SampleQuery {
    pub limit: Option<usize>,
}

/// Creates the /debug routes
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/debug/categories", get(categories))
        .route("/debug/sample-items", get(sample_items))
}

/// Endpoint: GET /debug/categories
async fn categories(State(state): State<SharedState>) -> Response {
    passthrough(state.menu.client().fetch_categories().await)
}

/// Endpoint: GET /debug/sample-items?limit=N
async fn sample_items(
    State(state): State<SharedState>,
    Query(query): Query<SampleQuery>,
) -> Response {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SAMPLE_LIMIT)
        .clamp(1, MAX_SAMPLE_LIMIT);
    passthrough(state.menu.client().fetch_sample_items(limit).await)
}

fn passthrough(result: Result<Value, CatalogError>) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            error!(error = %e, "catalog passthrough failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
