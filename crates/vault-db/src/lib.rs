//! # vault-db
//!
//! Storage layer and query engine for the vault product catalog.
//!
//! This crate provides:
//! - Connection pool management
//! - `PgProductStore`, searching the `products` table with PostgreSQL
//!   `simple` text search and a `count(*) OVER()` windowed total
//! - `MemoryProductStore`, an in-process store with equivalent semantics
//! - `ProductCatalog`, the validated, deadline-bounded search/import engine
//!
//! ## Example
//!
//! ```rust,ignore
//! use vault_db::{Database, Filters};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/vault").await?;
//!     let catalog = db.catalog();
//!
//!     let page = catalog.search("tee", "", &Filters::new(1, 20, "-msrp")).await?;
//!     println!("{} of {} products", page.products.len(), page.metadata.total_records);
//!     Ok(())
//! }
//! ```
pub mod catalog;
pub mod memory;
pub mod pool;
pub mod products;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can share them
pub mod test_fixtures;

use std::sync::Arc;

// Re-export core types
pub use vault_core::*;

pub use catalog::{CatalogConfig, ProductCatalog};
pub use memory::MemoryProductStore;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use products::PgProductStore;

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Product store over the `products` table.
    pub products: PgProductStore,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            products: PgProductStore::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Query engine over the products table with default settings.
    pub fn catalog(&self) -> ProductCatalog {
        self.catalog_with_config(CatalogConfig::default())
    }

    /// Query engine over the products table.
    pub fn catalog_with_config(&self, config: CatalogConfig) -> ProductCatalog {
        ProductCatalog::with_config(Arc::new(self.products.clone()), config)
    }
}
