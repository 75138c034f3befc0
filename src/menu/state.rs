//! Menu Cache and Application State
//!
//! The cache holds one immutable snapshot behind an `Arc`. A successful
//! refresh builds a complete new snapshot and swaps it in; readers holding
//! the old `Arc` keep a consistent view.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::{
    helpers::{
        compute_cache_status, format_timestamp, next_refresh_at, normalize_items,
        NormalizeOptions,
    },
    models::{CacheStatus, MenuSnapshot, RefreshOutcome},
};
use crate::{
    catalog::{CatalogClient, CatalogError, CatalogSettings},
    config::Config,
};

// =============================================================================
// Menu Cache
// =============================================================================

/// Time-boxed cache over the normalized catalog
pub struct MenuCache {
    client: CatalogClient,
    options: NormalizeOptions,
    window: Duration,
    snapshot: RwLock<Arc<MenuSnapshot>>,
    /// Serializes fetch cycles
    refresh_lock: Mutex<()>,
}

impl MenuCache {
    /// Creates an empty cache. Nothing is fetched until the first refresh.
    pub fn new(client: CatalogClient, options: NormalizeOptions, window: Duration) -> Self {
        Self {
            client,
            options,
            window,
            snapshot: RwLock::new(Arc::new(MenuSnapshot::default())),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// The current snapshot, without triggering a refresh.
    pub fn snapshot(&self) -> Arc<MenuSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, next: MenuSnapshot) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
    }

    fn is_fresh_at(&self, snapshot: &MenuSnapshot, now: DateTime<Utc>) -> bool {
        snapshot
            .last_refresh
            .is_some_and(|last| now - last < self.window)
    }

    /// Refreshes if forced or stale, reporting failures as a flag.
    ///
    /// A failed cycle is logged and the previous snapshot keeps serving. The
    /// new snapshot is stamped once the refresh lock is held, so a refresh
    /// queued behind a slow fetch is never stamped earlier than the one it
    /// replaces.
    pub async fn refresh(&self, force: bool) -> bool {
        self.report(self.run_refresh(force, Utc::now).await)
    }

    /// [`MenuCache::refresh`] against an explicit clock.
    pub async fn refresh_at(&self, now: DateTime<Utc>, force: bool) -> bool {
        self.report(self.try_refresh(now, force).await)
    }

    fn report(&self, result: Result<RefreshOutcome, CatalogError>) -> bool {
        match result {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "menu refresh failed");
                warn!(
                    items = self.snapshot().items.len(),
                    "keeping cached menu until next refresh attempt"
                );
                false
            }
        }
    }

    /// Runs one refresh decision at `now`.
    ///
    /// Returns `Cached` without any network call when not forced and the
    /// snapshot is inside the freshness window. Otherwise fetches, normalizes
    /// and swaps in a new snapshot stamped `now`. On error the current
    /// snapshot is left as it was.
    pub async fn try_refresh(
        &self,
        now: DateTime<Utc>,
        force: bool,
    ) -> Result<RefreshOutcome, CatalogError> {
        self.run_refresh(force, move || now).await
    }

    async fn run_refresh<F>(&self, force: bool, clock: F) -> Result<RefreshOutcome, CatalogError>
    where
        F: Fn() -> DateTime<Utc>,
    {
        if !force && self.is_fresh_at(&self.snapshot(), clock()) {
            debug!("using cached menu");
            return Ok(RefreshOutcome::Cached);
        }

        let _guard = self.refresh_lock.lock().await;
        let now = clock();

        // Another request may have refreshed while we waited.
        if !force && self.is_fresh_at(&self.snapshot(), now) {
            return Ok(RefreshOutcome::Cached);
        }

        info!(
            merchant = self.client.merchant_id(),
            whitelist = self.options.whitelist_mode(),
            "fetching fresh menu from catalog"
        );
        let raw_items = self
            .client
            .fetch_items(self.options.whitelist_mode())
            .await?;
        let fetched = raw_items.len();
        let items = normalize_items(raw_items, &self.options);
        let count = items.len();

        self.replace(MenuSnapshot {
            items,
            last_refresh: Some(now),
        });

        let next_refresh = next_refresh_at(now, self.window)
            .map(format_timestamp)
            .unwrap_or_else(|| "never".to_string());
        info!(fetched, items = count, %next_refresh, "menu refreshed");
        Ok(RefreshOutcome::Refreshed { items: count })
    }

    /// Non-forced refresh followed by the current sorted snapshot.
    pub async fn get_menu(&self) -> Arc<MenuSnapshot> {
        self.refresh(false).await;
        self.snapshot()
    }

    pub fn cache_status(&self) -> CacheStatus {
        self.cache_status_at(Utc::now())
    }

    pub fn cache_status_at(&self, now: DateTime<Utc>) -> CacheStatus {
        compute_cache_status(&self.snapshot(), self.window, now)
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between handlers
pub type SharedState = Arc<AppState>;

/// Configuration plus the menu cache, owned by the composition root
pub struct AppState {
    pub config: Config,
    pub menu: MenuCache,
}

impl AppState {
    /// Wires the catalog client and cache from configuration.
    pub fn new(config: Config) -> Result<Self, CatalogError> {
        let client = CatalogClient::new(CatalogSettings {
            base_url: config.base_url.clone(),
            merchant_id: config.merchant_id.clone(),
            token: config.token.clone(),
            page_limit: config.page_limit,
            max_pages: config.max_pages,
            timeout: config.request_timeout(),
        })?;

        let options = NormalizeOptions {
            whitelist: config.whitelist().into_iter().collect(),
            strip_ordinals: !config.keep_ordinals,
        };

        let menu = MenuCache::new(client, options, config.cache_window());

        Ok(Self { config, menu })
    }
}
