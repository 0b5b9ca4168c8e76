use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decay::Conditions;
use crate::product::ProductId;

/// Unique reading identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingId(pub String);

impl ReadingId {
    pub fn generate() -> Self {
        ReadingId(uuid::Uuid::new_v4().to_string())
    }
}

/// One timestamped temperature/humidity observation of a product.
/// Readings are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: ReadingId,
    pub product_id: ProductId,
    pub temperature: f64,
    pub humidity: f64,
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    pub fn new(product_id: ProductId, conditions: Conditions, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: ReadingId::generate(),
            product_id,
            temperature: conditions.temperature,
            humidity: conditions.humidity,
            timestamp,
        }
    }

    pub fn conditions(&self) -> Conditions {
        Conditions::new(self.temperature, self.humidity)
    }
}
