//! Product domain models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use product_catalog_core::{Price, ProductId};

use crate::validation::{self, ValidationError, Violations};

/// A persisted product.
///
/// A product is *active* iff `available` is true. Inactive products are kept
/// for history but behave as if they did not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned identifier.
    pub id: ProductId,
    /// Display name, never empty.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Soft-delete flag.
    pub available: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product is visible to callers.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.available
    }
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProductInput {
    pub name: String,
    pub price: Price,
}

impl CreateProductInput {
    /// Validate an untyped creation payload.
    ///
    /// Only `name` and `price` are read; any other key (including `id` and
    /// `available`) is ignored.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` listing every violated rule.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let fields = validation::as_object(payload)?;

        let mut violations = Violations::default();
        let name = validation::check_name(fields.get("name"), &mut violations);
        let price = validation::check_price(fields.get("price"), &mut violations);

        let (Some(name), Some(price)) = (name, price) else {
            return Err(violations.into_error());
        };
        Ok(Self { name, price })
    }
}

/// Validated partial update for a product.
///
/// `id` and `available` are never part of a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Price>,
}

impl ProductPatch {
    /// Validate an untyped patch payload.
    ///
    /// Absent and `null` fields are left unchanged. The `id` key is stripped
    /// and `available` is ignored.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` listing every violated rule among the
    /// fields that are present.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let mut fields = validation::as_object(payload)?.clone();
        fields.remove("id");
        fields.remove("available");

        let mut violations = Violations::default();
        let name = present(fields.get("name"))
            .and_then(|v| validation::check_name(Some(v), &mut violations));
        let price = present(fields.get("price"))
            .and_then(|v| validation::check_price(Some(v), &mut violations));

        violations.finish(|| Self { name, price })
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none()
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Column changes applied by the store in a single conditional update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub available: Option<bool>,
}

impl ProductChanges {
    /// Changes that soft-delete a product.
    #[must_use]
    pub fn deactivate() -> Self {
        Self {
            available: Some(false),
            ..Self::default()
        }
    }
}

impl From<ProductPatch> for ProductChanges {
    fn from(patch: ProductPatch) -> Self {
        Self {
            name: patch.name,
            price: patch.price,
            available: None,
        }
    }
}

/// Row filter used by listing, counting and conditional updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Restrict to products with this availability.
    pub available: Option<bool>,
}

impl ProductFilter {
    /// Matches active products only.
    #[must_use]
    pub const fn active() -> Self {
        Self {
            available: Some(true),
        }
    }

    /// Whether `product` satisfies the filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.available.is_none_or(|a| product.available == a)
    }
}
