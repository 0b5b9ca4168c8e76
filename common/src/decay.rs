//! Shelf-life decay model.
//!
//! Storage abuse shortens the nominal shelf life of a product type:
//!
//! - every °C beyond the type's temperature tolerance adds 15% to the decay rate
//! - every %RH beyond 20 points from optimal humidity adds 0.5% to the decay rate
//!
//! The two factors multiply. Remaining life is the unexpired share of the
//! adjusted shelf life, measured from intake.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{ProductType, StorageProfile};
use crate::error::ShelfError;

const SECONDS_PER_DAY: f64 = 86_400.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Decay rate increase per °C beyond tolerance.
pub const TEMPERATURE_PENALTY_PER_DEGREE: f64 = 0.15;
/// Humidity deviation (%RH) tolerated without penalty.
pub const HUMIDITY_TOLERANCE: f64 = 20.0;
/// Decay rate increase per %RH beyond [`HUMIDITY_TOLERANCE`].
pub const HUMIDITY_PENALTY_PER_POINT: f64 = 0.005;

/// Freshness tier, ordered from freshest to spoiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessTier {
    Fresh,
    Good,
    Warning,
    Expired,
}

impl FreshnessTier {
    /// Cut points are exclusive on the lower side: 70 is good, 40 is warning.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage > 70.0 {
            FreshnessTier::Fresh
        } else if percentage > 40.0 {
            FreshnessTier::Good
        } else if percentage > 0.0 {
            FreshnessTier::Warning
        } else {
            FreshnessTier::Expired
        }
    }

    /// True for tiers surfaced by the alert scan.
    pub fn needs_attention(self) -> bool {
        matches!(self, FreshnessTier::Warning | FreshnessTier::Expired)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FreshnessTier::Fresh => "fresh",
            FreshnessTier::Good => "good",
            FreshnessTier::Warning => "warning",
            FreshnessTier::Expired => "expired",
        }
    }
}

impl std::fmt::Display for FreshnessTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A temperature/humidity observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    /// °C
    pub temperature: f64,
    /// %RH
    pub humidity: f64,
}

impl Conditions {
    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature,
            humidity,
        }
    }

    /// The type's optimal storage conditions.
    pub fn optimal_for(product_type: ProductType) -> Self {
        let profile = product_type.profile();
        Self::new(profile.optimal_temperature, profile.optimal_humidity)
    }
}

/// Output of the decay model for one product at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfLifeEstimate {
    /// Remaining life in `[0, 100]`.
    pub percentage: f64,
    pub status: FreshnessTier,
    /// Intake plus the adjusted shelf life. Only valid for the conditions it
    /// was computed from.
    pub estimated_expiry: DateTime<Utc>,
    pub adjusted_shelf_life_days: f64,
}

/// Multiplier on the decay rate from temperature abuse (1.0 within tolerance).
pub fn temperature_factor(profile: &StorageProfile, temperature: f64) -> f64 {
    let deviation = (temperature - profile.optimal_temperature).abs();
    if deviation > profile.temperature_tolerance {
        1.0 + (deviation - profile.temperature_tolerance) * TEMPERATURE_PENALTY_PER_DEGREE
    } else {
        1.0
    }
}

/// Multiplier on the decay rate from humidity abuse (1.0 within tolerance).
pub fn humidity_factor(profile: &StorageProfile, humidity: f64) -> f64 {
    let deviation = (humidity - profile.optimal_humidity).abs();
    if deviation > HUMIDITY_TOLERANCE {
        1.0 + (deviation - HUMIDITY_TOLERANCE) * HUMIDITY_PENALTY_PER_POINT
    } else {
        1.0
    }
}

/// Nominal shelf life shortened by both penalty factors, in days.
pub fn adjusted_shelf_life_days(profile: &StorageProfile, conditions: Conditions) -> f64 {
    profile.base_shelf_life_days
        / (temperature_factor(profile, conditions.temperature)
            * humidity_factor(profile, conditions.humidity))
}

/// Days between intake and `now`, clamped at zero when the clock is behind intake.
pub fn elapsed_days(intake: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - intake).num_milliseconds() as f64;
    (millis / 1000.0 / SECONDS_PER_DAY).max(0.0)
}

/// Evaluate remaining shelf life for a product of `product_type` taken in at
/// `intake`, currently stored at `conditions`.
pub fn compute_shelf_life(
    product_type: ProductType,
    intake: DateTime<Utc>,
    now: DateTime<Utc>,
    conditions: Conditions,
) -> ShelfLifeEstimate {
    let profile = product_type.profile();
    let adjusted = adjusted_shelf_life_days(profile, conditions);
    let elapsed = elapsed_days(intake, now);

    let percentage = ((adjusted - elapsed) / adjusted * 100.0).clamp(0.0, 100.0);
    let estimated_expiry =
        intake + Duration::milliseconds((adjusted * MILLIS_PER_DAY).round() as i64);

    ShelfLifeEstimate {
        percentage,
        status: FreshnessTier::from_percentage(percentage),
        estimated_expiry,
        adjusted_shelf_life_days: adjusted,
    }
}

/// Like [`compute_shelf_life`], keyed by the type's name.
pub fn compute_shelf_life_for(
    product_type: &str,
    intake: DateTime<Utc>,
    now: DateTime<Utc>,
    conditions: Conditions,
) -> Result<ShelfLifeEstimate, ShelfError> {
    let product_type = product_type.parse::<ProductType>()?;
    Ok(compute_shelf_life(product_type, intake, now, conditions))
}
