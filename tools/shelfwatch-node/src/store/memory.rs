use std::sync::Arc;

use dashmap::DashMap;
use shelfwatch_common::decay::Conditions;
use shelfwatch_common::product::{Product, ProductId};
use shelfwatch_common::reading::SensorReading;

use super::StoreError;

/// A product together with the readings it owns, kept under one map entry so
/// that deletion drops both at once.
struct Entry {
    product: Product,
    /// Sorted by timestamp, oldest first.
    readings: Vec<SensorReading>,
}

impl Entry {
    /// Keep timestamp order even if a late reading arrives.
    fn push_reading(&mut self, reading: &SensorReading) {
        let at = self
            .readings
            .partition_point(|r| r.timestamp <= reading.timestamp);
        self.readings.insert(at, reading.clone());
    }
}

/// Process-local store backed by a concurrent map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<ProductId, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.entries.insert(
            product.id.clone(),
            Entry {
                product: product.clone(),
                readings: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn insert_product_with_reading(
        &self,
        product: &Product,
        reading: &SensorReading,
    ) -> Result<(), StoreError> {
        if reading.product_id != product.id {
            return Err(StoreError::UnknownProduct(reading.product_id.clone()));
        }
        self.entries.insert(
            product.id.clone(),
            Entry {
                product: product.clone(),
                readings: vec![reading.clone()],
            },
        );
        Ok(())
    }

    pub fn find_product(&self, id: &ProductId) -> Option<Product> {
        self.entries.get(id).map(|e| e.product.clone())
    }

    pub fn list_products(&self) -> Vec<Product> {
        let mut products: Vec<Product> =
            self.entries.iter().map(|e| e.product.clone()).collect();
        products.sort_by(|a, b| a.added_date.cmp(&b.added_date).then_with(|| a.id.cmp(&b.id)));
        products
    }

    pub fn delete_product(&self, id: &ProductId) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn insert_reading(&self, reading: &SensorReading) -> Result<(), StoreError> {
        let mut entry = self
            .entries
            .get_mut(&reading.product_id)
            .ok_or_else(|| StoreError::UnknownProduct(reading.product_id.clone()))?;
        entry.push_reading(reading);
        Ok(())
    }

    /// Append a reading and make it the latest condition under one entry lock.
    pub fn record_reading(&self, reading: &SensorReading) -> Result<(), StoreError> {
        let mut entry = self
            .entries
            .get_mut(&reading.product_id)
            .ok_or_else(|| StoreError::UnknownProduct(reading.product_id.clone()))?;
        entry.push_reading(reading);
        entry.product.set_conditions(reading.conditions());
        Ok(())
    }

    pub fn list_readings(&self, product_id: &ProductId, limit: usize) -> Vec<SensorReading> {
        self.entries
            .get(product_id)
            .map(|e| e.readings.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    pub fn update_product_condition(&self, id: &ProductId, conditions: Conditions) -> bool {
        match self.entries.get_mut(id) {
            Some(mut entry) => {
                entry.product.set_conditions(conditions);
                true
            }
            None => false,
        }
    }
}
