//! Service configuration
//!
//! Every setting can be given as a command-line flag or through the
//! environment variable named next to it. Defaults match a single-merchant
//! production deployment.

use clap::{ArgAction, Parser};
use std::{fmt, time::Duration};

/// Longest accepted freshness window: one year
pub const MAX_CACHE_MINUTES: u64 = 60 * 24 * 365;

/// Catalog menu service - republishes a point-of-sale catalog as a menu feed
#[derive(Parser, Clone)]
#[command(name = "catalog_menu_rust")]
#[command(about = "Serves a cached, cleaned-up point-of-sale menu as JSON or text")]
#[command(version)]
#[command(args_override_self = true)]
pub struct Config {
    /// Merchant whose catalog is published
    #[arg(long, env = "MERCHANT_ID", default_value = "FFW0J7HB213K1")]
    pub merchant_id: String,

    /// Static bearer token for the catalog API
    #[arg(long, env = "CLOVER_TOKEN", default_value = "", hide_env_values = true)]
    pub token: String,

    /// Base URL of the catalog API
    #[arg(long, env = "CLOVER_BASE_URL", default_value = "https://api.clover.com")]
    pub base_url: String,

    /// Port the HTTP server listens on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Freshness window in minutes; 0 refreshes on every request
    #[arg(
        long,
        env = "CACHE_MINUTES",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(0..=MAX_CACHE_MINUTES)
    )]
    pub cache_minutes: u64,

    /// Items requested per catalog page
    #[arg(long, env = "PAGE_LIMIT", default_value_t = 100)]
    pub page_limit: usize,

    /// Upper bound on pages fetched in one refresh cycle
    #[arg(long, env = "MAX_PAGES", default_value_t = 50)]
    pub max_pages: usize,

    /// Per-request timeout against the catalog API
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Comma separated category ids; when set, only items in these categories are served
    #[arg(long, env = "CATEGORY_WHITELIST", value_delimiter = ',')]
    pub category_whitelist: Vec<String>,

    /// Keep leading "12. " ordinals in item names
    #[arg(long, env = "KEEP_ORDINALS", default_value_t = false, action = ArgAction::Set)]
    pub keep_ordinals: bool,

    /// Name shown in menu headers
    #[arg(long, env = "RESTAURANT_NAME", default_value = "Aroma Indian Restaurant")]
    pub restaurant_name: String,

    /// Environment label reported by the service
    #[arg(long, env = "SERVICE_ENVIRONMENT", default_value = "PRODUCTION")]
    pub environment: String,

    /// Do not mount the /debug passthrough routes
    #[arg(
        long,
        env = "DISABLE_DEBUG_ROUTES",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub disable_debug_routes: bool,
}

impl Config {
    /// Freshness window as a chrono duration, capped at [`MAX_CACHE_MINUTES`].
    pub fn cache_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cache_minutes.min(MAX_CACHE_MINUTES) as i64)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whitelist ids with blanks removed (a trailing comma in the env var is common).
    pub fn whitelist(&self) -> Vec<String> {
        self.category_whitelist
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("merchant_id", &self.merchant_id)
            .field("token", &if self.token.is_empty() { "<unset>" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("port", &self.port)
            .field("cache_minutes", &self.cache_minutes)
            .field("page_limit", &self.page_limit)
            .field("max_pages", &self.max_pages)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("category_whitelist", &self.category_whitelist)
            .field("keep_ordinals", &self.keep_ordinals)
            .field("restaurant_name", &self.restaurant_name)
            .field("environment", &self.environment)
            .field("disable_debug_routes", &self.disable_debug_routes)
            .finish()
    }
}
