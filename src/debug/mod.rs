//! Diagnostics Module
//!
//! Raw catalog passthrough routes, mounted unless disabled in configuration.

pub mod handlers;

pub use handlers::routes;
