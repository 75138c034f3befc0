//! Catalog API Module
//!
//! Talks to the point-of-sale platform:
//! - Wire models (RawItem, category shapes, pages)
//! - The paginated client and its error type

pub mod client;
pub mod models;

pub use client::{CatalogClient, CatalogError, CatalogSettings};
pub use models::RawItem;
