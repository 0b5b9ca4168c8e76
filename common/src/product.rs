use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::ProductType;
use crate::decay::{compute_shelf_life, Conditions, FreshnessTier};
use crate::error::ShelfError;

/// Opaque product identifier (random UUID).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn generate() -> Self {
        ProductId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unit a product's quantity is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityUnit {
    #[serde(rename = "L")]
    Liters,
    #[serde(rename = "kg")]
    Kilograms,
}

impl QuantityUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            QuantityUnit::Liters => "L",
            QuantityUnit::Kilograms => "kg",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" => Some(QuantityUnit::Liters),
            "kg" => Some(QuantityUnit::Kilograms),
            _ => None,
        }
    }
}

/// A tracked product as stored. Derived freshness is never stored; see [`ProductView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub product_type: ProductType,
    pub batch_number: String,
    pub quantity: f64,
    pub unit: QuantityUnit,
    /// Intake time, fixed at creation.
    pub added_date: DateTime<Utc>,
    /// Latest observed temperature, °C.
    pub current_temperature: Option<f64>,
    /// Latest observed humidity, %RH.
    pub current_humidity: Option<f64>,
}

impl Product {
    /// Latest condition, if both temperature and humidity have been observed.
    pub fn conditions(&self) -> Option<Conditions> {
        match (self.current_temperature, self.current_humidity) {
            (Some(t), Some(h)) => Some(Conditions::new(t, h)),
            _ => None,
        }
    }

    pub fn set_conditions(&mut self, conditions: Conditions) {
        self.current_temperature = Some(conditions.temperature);
        self.current_humidity = Some(conditions.humidity);
    }

    /// Recompute freshness from the raw record as of `now`.
    pub fn evaluate(&self, now: DateTime<Utc>) -> ProductView {
        let estimate = self
            .conditions()
            .map(|c| compute_shelf_life(self.product_type, self.added_date, now, c));
        ProductView {
            status: estimate.as_ref().map(|e| e.status),
            shelf_life_percentage: estimate.as_ref().map(|e| e.percentage),
            estimated_expiry: estimate.map(|e| e.estimated_expiry),
            product: self.clone(),
        }
    }
}

/// A product with freshness computed at read time.
///
/// The derived fields are `None` for a product that has no observed condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub status: Option<FreshnessTier>,
    pub shelf_life_percentage: Option<f64>,
    pub estimated_expiry: Option<DateTime<Utc>>,
}

/// Request to register a new product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub product_type: String,
    pub batch_number: String,
    pub quantity: f64,
    pub unit: String,
}

impl CreateProduct {
    /// Check the request and build the product record.
    ///
    /// The new product starts at its type's optimal conditions.
    pub fn into_product(self, id: ProductId, now: DateTime<Utc>) -> Result<Product, ShelfError> {
        let product_type = self.product_type.parse::<ProductType>()?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(ShelfError::Validation("name must not be empty".into()));
        }
        let batch_number = self.batch_number.trim();
        if batch_number.is_empty() {
            return Err(ShelfError::Validation("batch_number must not be empty".into()));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(ShelfError::Validation(format!(
                "quantity must be a positive number, got {}",
                self.quantity
            )));
        }
        let unit = QuantityUnit::parse(&self.unit).ok_or_else(|| {
            ShelfError::Validation(format!("unit must be 'L' or 'kg', got '{}'", self.unit))
        })?;

        let mut product = Product {
            id,
            name: name.to_string(),
            product_type,
            batch_number: batch_number.to_string(),
            quantity: self.quantity,
            unit,
            added_date: now,
            current_temperature: None,
            current_humidity: None,
        };
        product.set_conditions(Conditions::optimal_for(product_type));
        Ok(product)
    }
}
