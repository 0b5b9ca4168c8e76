use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShelfError;

/// Kind of dairy product tracked for shelf life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Milk,
    Cheese,
    Yogurt,
    Butter,
    Cream,
}

/// Storage parameters for one product type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageProfile {
    /// Ideal storage temperature in °C.
    pub optimal_temperature: f64,
    /// Deviation from the optimal temperature (°C) that causes no extra decay.
    pub temperature_tolerance: f64,
    /// Ideal relative humidity in %RH.
    pub optimal_humidity: f64,
    /// Shelf life in days when kept at optimal conditions.
    pub base_shelf_life_days: f64,
    pub icon: &'static str,
}

const MILK: StorageProfile = StorageProfile {
    optimal_temperature: 4.0,
    temperature_tolerance: 2.0,
    optimal_humidity: 50.0,
    base_shelf_life_days: 7.0,
    icon: "🥛",
};

const CHEESE: StorageProfile = StorageProfile {
    optimal_temperature: 5.0,
    temperature_tolerance: 3.0,
    optimal_humidity: 60.0,
    base_shelf_life_days: 30.0,
    icon: "🧀",
};

const YOGURT: StorageProfile = StorageProfile {
    optimal_temperature: 4.0,
    temperature_tolerance: 2.0,
    optimal_humidity: 50.0,
    base_shelf_life_days: 14.0,
    icon: "🥣",
};

const BUTTER: StorageProfile = StorageProfile {
    optimal_temperature: 4.0,
    temperature_tolerance: 3.0,
    optimal_humidity: 40.0,
    base_shelf_life_days: 60.0,
    icon: "🧈",
};

const CREAM: StorageProfile = StorageProfile {
    optimal_temperature: 3.0,
    temperature_tolerance: 1.5,
    optimal_humidity: 50.0,
    base_shelf_life_days: 10.0,
    icon: "🥛",
};

impl ProductType {
    pub fn all() -> &'static [ProductType] {
        &[
            ProductType::Milk,
            ProductType::Cheese,
            ProductType::Yogurt,
            ProductType::Butter,
            ProductType::Cream,
        ]
    }

    /// Catalog entry for this type.
    pub fn profile(self) -> &'static StorageProfile {
        match self {
            ProductType::Milk => &MILK,
            ProductType::Cheese => &CHEESE,
            ProductType::Yogurt => &YOGURT,
            ProductType::Butter => &BUTTER,
            ProductType::Cream => &CREAM,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProductType::Milk => "milk",
            ProductType::Cheese => "cheese",
            ProductType::Yogurt => "yogurt",
            ProductType::Butter => "butter",
            ProductType::Cream => "cream",
        }
    }

    pub fn info(self) -> ProductTypeInfo {
        let profile = self.profile();
        ProductTypeInfo {
            product_type: self,
            icon: profile.icon.to_string(),
            optimal_temp: profile.optimal_temperature,
            temp_tolerance: profile.temperature_tolerance,
            optimal_humidity: profile.optimal_humidity,
            shelf_life_days: profile.base_shelf_life_days,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = ShelfError;

    /// Case-insensitive lookup; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProductType::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ShelfError::UnknownProductType(s.to_string()))
    }
}

/// Public view of a catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTypeInfo {
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub icon: String,
    pub optimal_temp: f64,
    pub temp_tolerance: f64,
    pub optimal_humidity: f64,
    pub shelf_life_days: f64,
}

/// The full catalog in display order.
pub fn catalog() -> Vec<ProductTypeInfo> {
    ProductType::all().iter().map(|t| t.info()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("milk".parse::<ProductType>().unwrap(), ProductType::Milk);
        assert_eq!("Cheese".parse::<ProductType>().unwrap(), ProductType::Cheese);
        assert_eq!(" YOGURT ".parse::<ProductType>().unwrap(), ProductType::Yogurt);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = "kefir".parse::<ProductType>().unwrap_err();
        assert_eq!(err, ShelfError::UnknownProductType("kefir".into()));
    }

    #[test]
    fn catalog_has_five_types_in_order() {
        let names: Vec<_> = catalog().iter().map(|i| i.product_type.as_str()).collect();
        assert_eq!(names, ["milk", "cheese", "yogurt", "butter", "cream"]);
    }

    #[test]
    fn milk_profile_matches_reference_values() {
        let milk = ProductType::Milk.profile();
        assert_eq!(milk.optimal_temperature, 4.0);
        assert_eq!(milk.temperature_tolerance, 2.0);
        assert_eq!(milk.optimal_humidity, 50.0);
        assert_eq!(milk.base_shelf_life_days, 7.0);
    }

    #[test]
    fn info_serializes_type_key() {
        let json = serde_json::to_value(ProductType::Butter.info()).unwrap();
        assert_eq!(json["type"], "butter");
        assert_eq!(json["shelf_life_days"], 60.0);
        assert_eq!(json["icon"], "🧈");
    }
}
