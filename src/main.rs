use anyhow::Context;
use catalog_menu_rust::config::Config;
use catalog_menu_rust::menu::AppState;
use catalog_menu_rust::router::create_app_router;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    if config.token.is_empty() {
        warn!("CLOVER_TOKEN is not set; catalog requests will be rejected");
    }

    info!(
        restaurant = %config.restaurant_name,
        environment = %config.environment,
        "starting menu API"
    );
    info!(
        cache_minutes = config.cache_minutes,
        whitelist = ?config.whitelist(),
        debug_routes = !config.disable_debug_routes,
        "cache strategy"
    );

    // Initialize application state and warm the cache
    let state = Arc::new(AppState::new(config).context("building catalog client")?);
    if !state.menu.refresh(true).await {
        warn!("starting with an empty menu; will retry on the next request");
    }

    // Build application router with all routes and middleware
    let app = create_app_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
