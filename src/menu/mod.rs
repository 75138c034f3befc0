//! Menu Domain Module
//!
//! Everything between the raw catalog and the published feed:
//! - Domain models (MenuItem, MenuSnapshot, CacheStatus, responses)
//! - Normalization and rendering helpers
//! - The snapshot cache and application state
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use state::{AppState, MenuCache, SharedState};
