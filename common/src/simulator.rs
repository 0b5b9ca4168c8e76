//! Synthetic sensor ticks for products without real hardware.
//!
//! Temperature swings more above optimal than below so simulated excursions
//! lean toward spoilage.

use rand::Rng;

use crate::catalog::ProductType;
use crate::decay::Conditions;

/// Temperature offset range from optimal, °C.
pub const TEMPERATURE_SPREAD: (f64, f64) = (-3.0, 5.0);
/// Humidity offset range from optimal, %RH.
pub const HUMIDITY_SPREAD: (f64, f64) = (-10.0, 15.0);

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Draw a plausible reading around the optimal conditions of `product_type`.
pub fn simulate_reading<R: Rng>(product_type: ProductType, rng: &mut R) -> Conditions {
    let profile = product_type.profile();
    let temperature =
        profile.optimal_temperature + rng.gen_range(TEMPERATURE_SPREAD.0..=TEMPERATURE_SPREAD.1);
    let humidity = profile.optimal_humidity + rng.gen_range(HUMIDITY_SPREAD.0..=HUMIDITY_SPREAD.1);
    Conditions::new(round_tenth(temperature), round_tenth(humidity))
}

/// [`simulate_reading`] using the thread-local RNG.
#[cfg(feature = "std")]
pub fn simulate_reading_now(product_type: ProductType) -> Conditions {
    simulate_reading(product_type, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn is_one_decimal(v: f64) -> bool {
        ((v * 10.0).round() - v * 10.0).abs() < 1e-6
    }

    #[test]
    fn readings_stay_within_spread() {
        let mut rng = StdRng::seed_from_u64(7);
        for &ty in ProductType::all() {
            let profile = ty.profile();
            for _ in 0..500 {
                let c = simulate_reading(ty, &mut rng);
                let dt = c.temperature - profile.optimal_temperature;
                let dh = c.humidity - profile.optimal_humidity;
                assert!((-3.05..=5.05).contains(&dt), "{ty}: temp offset {dt}");
                assert!((-10.05..=15.05).contains(&dh), "{ty}: humidity offset {dh}");
                assert!(is_one_decimal(c.temperature));
                assert!(is_one_decimal(c.humidity));
            }
        }
    }

    #[test]
    fn warm_excursions_reach_beyond_cold_ones() {
        let mut rng = StdRng::seed_from_u64(42);
        let optimal = ProductType::Milk.profile().optimal_temperature;
        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for _ in 0..2000 {
            let c = simulate_reading(ProductType::Milk, &mut rng);
            min = min.min(c.temperature - optimal);
            max = max.max(c.temperature - optimal);
        }
        assert!(max > 4.0);
        assert!(min > -3.05);
    }

    #[test]
    fn same_seed_same_reading() {
        let a = simulate_reading(ProductType::Cheese, &mut StdRng::seed_from_u64(1));
        let b = simulate_reading(ProductType::Cheese, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn rounding_to_tenths() {
        assert_eq!(round_tenth(4.26), 4.3);
        assert_eq!(round_tenth(-0.04), -0.0);
        assert_eq!(round_tenth(50.0), 50.0);
    }
}
