//! Domain models for the catalog.

pub mod page;
pub mod product;

pub use page::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, Page, PageMeta, PageRequest};
pub use product::{CreateProductInput, Product, ProductChanges, ProductFilter, ProductPatch};
