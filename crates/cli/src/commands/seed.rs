//! Seed the catalog with sample products.
//!
//! Products are created through [`CatalogService`], so every row passes the
//! same validation as an API request.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use product_catalog::config::CatalogConfig;
use product_catalog::db::{self, PgProductStore};
use product_catalog::services::CatalogService;

const SAMPLE_NAMES: &[&str] = &[
    "Notebook", "Pen", "Pencil", "Stapler", "Eraser", "Ruler", "Marker", "Binder",
];

/// Payload for the `index`-th sample product.
///
/// Prices cycle through two-decimal amounts between 0.99 and 99.99.
fn sample_payload(index: u32) -> serde_json::Value {
    let name = usize::try_from(index)
        .ok()
        .and_then(|i| SAMPLE_NAMES.get(i % SAMPLE_NAMES.len()))
        .copied()
        .unwrap_or("Product");
    let cents = 99 + (u64::from(index) * 137) % 9_900;

    json!({
        "name": format!("{name} #{}", index + 1),
        "price": format!("{}.{:02}", cents / 100, cents % 100),
    })
}

/// Create `count` sample products.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is
/// unreachable, or a product cannot be created.
pub async fn products(count: u32) -> Result<(), Box<dyn std::error::Error>> {
    let config = CatalogConfig::from_env()?;
    let pool = db::create_pool(&config.database_url, config.max_connections).await?;
    let catalog = CatalogService::new(Arc::new(PgProductStore::new(pool.clone())));

    info!(count, "Seeding products");
    for index in 0..count {
        let product = catalog.create(&sample_payload(index)).await?;
        info!(product_id = %product.id, name = %product.name, "Created product");
    }

    pool.close().await;
    info!(count, "Seeding complete");
    Ok(())
}
