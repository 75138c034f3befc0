//! Catalog Menu Library
//!
//! This library fetches a merchant's catalog from a point-of-sale API,
//! normalizes it into a menu, caches it briefly and serves it over HTTP as
//! JSON or plain text.

// Domain modules
pub mod catalog;
pub mod menu;

// Infrastructure
pub mod config;
pub mod debug;
pub mod router;
