//! Menu Domain Models
//!
//! Display-ready items, the cached snapshot, and the response bodies the
//! menu routes serialize.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

// =============================================================================
// Menu Constants
// =============================================================================

/// Timestamp layout used in every human-facing field
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Service identifier
pub const SERVER_NAME: &str = "catalog-menu-rust";
/// Version reported on the root endpoint
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Menu Domain Models
// =============================================================================

/// A normalized catalog entry
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MenuItem {
    pub name: String,

    /// Price in dollars
    pub price: f64,

    pub category: String,

    pub available: bool,
}

/// One completed fetch cycle. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct MenuSnapshot {
    /// Sorted by (category, name)
    pub items: Vec<MenuItem>,
    pub last_refresh: Option<DateTime<Utc>>,
}

/// Result of a refresh request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cache was fresh; nothing was fetched
    Cached,
    /// A new snapshot with this many items replaced the old one
    Refreshed { items: usize },
}

/// Cache age and freshness, as reported by the diagnostics endpoints
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CacheStatus {
    pub cached: bool,
    pub items: usize,
    pub last_refresh: Option<String>,
    pub next_refresh: Option<String>,
    pub cache_age_seconds: Option<i64>,
    pub cache_age_minutes: Option<i64>,
    pub is_fresh: bool,
}

// =============================================================================
// Response Models
// =============================================================================

/// Item line inside the grouped JSON menu
#[derive(Debug, Serialize)]
pub struct MenuEntry {
    pub name: String,
    /// Formatted as `$12.99`
    pub price: String,
    /// `✓` or `✗`
    pub available: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MenuCacheInfo {
    pub is_fresh: bool,
    pub cache_age_minutes: Option<i64>,
    pub next_auto_refresh: Option<String>,
}

/// Response for `GET /menu`
#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub restaurant: String,
    pub environment: String,
    pub last_updated: String,
    pub total_items: usize,
    pub cache_info: MenuCacheInfo,
    pub categories: BTreeMap<String, Vec<MenuEntry>>,
}

/// Response for both refresh endpoints
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub items: usize,
    pub updated: Option<String>,
    pub message: String,
    pub cache_status: CacheStatus,
}

/// Response for `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub environment: String,
    pub items: usize,
    pub last_refresh: Option<String>,
    pub cache_info: CacheStatus,
}
