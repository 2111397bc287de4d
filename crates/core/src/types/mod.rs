//! Core types for the product catalog.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;

pub use id::*;
pub use price::{MAX_PRICE_SCALE, Price, PriceError};
