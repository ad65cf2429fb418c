pub mod catalog_service;

pub use catalog_service::{CatalogError, CatalogService, RECENT_LIMIT};
