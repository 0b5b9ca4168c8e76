//! Product and reading persistence.
//!
//! Every operation touches a single product record (plus, for deletion, the
//! readings it owns). Derived freshness is never stored.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use shelfwatch_common::decay::Conditions;
use shelfwatch_common::product::{Product, ProductId};
use shelfwatch_common::reading::SensorReading;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A reading was written for a product that does not exist.
    #[error("Product not found: {0}")]
    UnknownProduct(ProductId),
    #[error("database pool setup failed: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),
    #[error("database pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Storage backend selected at startup.
#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Postgres(PgStore),
}

impl Store {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Memory(_) => "memory",
            Store::Postgres(_) => "postgres",
        }
    }

    pub async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        match self {
            Store::Memory(s) => s.insert_product(product),
            Store::Postgres(s) => s.insert_product(product).await,
        }
    }

    /// Insert a new product together with its first reading, atomically.
    pub async fn insert_product_with_reading(
        &self,
        product: &Product,
        reading: &SensorReading,
    ) -> Result<(), StoreError> {
        match self {
            Store::Memory(s) => s.insert_product_with_reading(product, reading),
            Store::Postgres(s) => s.insert_product_with_reading(product, reading).await,
        }
    }

    pub async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        match self {
            Store::Memory(s) => Ok(s.find_product(id)),
            Store::Postgres(s) => s.find_product(id).await,
        }
    }

    /// All products ordered by intake time, then id.
    pub async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        match self {
            Store::Memory(s) => Ok(s.list_products()),
            Store::Postgres(s) => s.list_products().await,
        }
    }

    /// Remove a product and all of its readings. Returns false if it did not exist.
    pub async fn delete_product(&self, id: &ProductId) -> Result<bool, StoreError> {
        match self {
            Store::Memory(s) => Ok(s.delete_product(id)),
            Store::Postgres(s) => s.delete_product(id).await,
        }
    }

    pub async fn insert_reading(&self, reading: &SensorReading) -> Result<(), StoreError> {
        match self {
            Store::Memory(s) => s.insert_reading(reading),
            Store::Postgres(s) => s.insert_reading(reading).await,
        }
    }

    /// Append a reading and set it as the product's latest condition, atomically.
    /// Fails with [`StoreError::UnknownProduct`] if the product is gone.
    pub async fn record_reading(&self, reading: &SensorReading) -> Result<(), StoreError> {
        match self {
            Store::Memory(s) => s.record_reading(reading),
            Store::Postgres(s) => s.record_reading(reading).await,
        }
    }

    /// Up to `limit` readings of a product, newest first.
    pub async fn list_readings(
        &self,
        product_id: &ProductId,
        limit: usize,
    ) -> Result<Vec<SensorReading>, StoreError> {
        match self {
            Store::Memory(s) => Ok(s.list_readings(product_id, limit)),
            Store::Postgres(s) => s.list_readings(product_id, limit).await,
        }
    }

    /// Set the latest observed condition. Returns false if the product does not exist.
    pub async fn update_product_condition(
        &self,
        id: &ProductId,
        conditions: Conditions,
    ) -> Result<bool, StoreError> {
        match self {
            Store::Memory(s) => Ok(s.update_product_condition(id, conditions)),
            Store::Postgres(s) => s.update_product_condition(id, conditions).await,
        }
    }
}
