//! Business logic services for the catalog.
//!
//! # Services
//!
//! - `catalog` - Product CRUD with soft delete and visibility rules

pub mod catalog;

pub use catalog::{CatalogError, CatalogService};
