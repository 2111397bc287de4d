//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::CatalogConfig;
use crate::db::{PgProductStore, ProductStore};
use crate::services::CatalogService;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    config: CatalogConfig,
    catalog: CatalogService,
}

impl AppState {
    /// Build state backed by a `PostgreSQL` pool.
    #[must_use]
    pub fn new(config: CatalogConfig, pool: PgPool) -> Self {
        Self::with_store(config, Arc::new(PgProductStore::new(pool)))
    }

    /// Build state over any product store.
    #[must_use]
    pub fn with_store(config: CatalogConfig, store: Arc<dyn ProductStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: CatalogService::new(store),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }
}
