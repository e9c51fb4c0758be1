//! Physiological metric derivation.
//!
//! Distance, calories and active minutes are never stored independently of
//! the step count: every accepted step change runs [`derive`] again.

use serde::{Deserialize, Serialize};

/// Average stride length in metres.
pub const STEP_LENGTH_M: f64 = 0.7;

/// Steps that count as one active minute.
pub const STEPS_PER_MINUTE: u32 = 100;

/// Kilocalories burned per step per kilogram of body weight.
pub const CALORIE_FACTOR: f64 = 0.000_45;

/// Metrics derived from a day's step count.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Walked distance in kilometres, rounded to two decimals
    pub distance_km: f64,
    /// Burned kilocalories, zero when body weight is unknown
    pub kcal: u32,
    /// Whole minutes of activity
    pub active_minutes: u32,
}

impl DerivedMetrics {
    /// Metrics of a day without any steps.
    pub const ZERO: Self = Self {
        distance_km: 0.0,
        kcal: 0,
        active_minutes: 0,
    };
}

/// Derive metrics from a step count and an optional body weight.
///
/// Pure and deterministic: identical inputs always yield bit-identical output.
pub fn derive(steps: u32, weight_kg: Option<f64>) -> DerivedMetrics {
    let steps_f = f64::from(steps);

    let distance_km = round2(steps_f * STEP_LENGTH_M / 1000.0);
    let active_minutes = steps / STEPS_PER_MINUTE;
    let kcal = weight_kg
        .filter(|w| w.is_finite() && *w > 0.0)
        .map_or(0, |w| to_kcal((steps_f * w * CALORIE_FACTOR).round()));

    DerivedMetrics {
        distance_km,
        kcal,
        active_minutes,
    }
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_kcal(value: f64) -> u32 {
    // Saturating float-to-int cast; inputs are bounded by the steps domain.
    value as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_reference_day() {
        let metrics = derive(10_000, Some(70.0));
        assert!((metrics.distance_km - 7.0).abs() < f64::EPSILON);
        assert_eq!(metrics.active_minutes, 100);
        assert_eq!(metrics.kcal, 315);
    }

    #[test]
    fn test_derive_without_weight_has_no_calories() {
        let metrics = derive(10_000, None);
        assert_eq!(metrics.kcal, 0);
        assert_eq!(metrics.active_minutes, 100);
    }

    #[test]
    fn test_derive_ignores_nonsense_weight() {
        assert_eq!(derive(5_000, Some(-3.0)).kcal, 0);
        assert_eq!(derive(5_000, Some(f64::NAN)).kcal, 0);
    }

    #[test]
    fn test_derive_rounds_distance_and_floors_minutes() {
        let metrics = derive(1_234, None);
        // 1234 * 0.7 / 1000 = 0.8638
        assert!((metrics.distance_km - 0.86).abs() < f64::EPSILON);
        assert_eq!(metrics.active_minutes, 12);
    }

    #[test]
    fn test_derive_zero_steps() {
        assert_eq!(derive(0, Some(80.0)), DerivedMetrics::ZERO);
    }

    #[test]
    fn test_derive_is_deterministic() {
        let a = derive(87_654, Some(81.3));
        let b = derive(87_654, Some(81.3));
        assert_eq!(a.distance_km.to_bits(), b.distance_km.to_bits());
        assert_eq!(a, b);
    }
}
