//! Planner tuning constants and their validation.
//!
//! Fuel and travel time are flat linear conversions from distance, not a
//! flight model. Both divisors can be overridden from a JSON config:
//!
//! ```
//! use haulplan_logic::config::{validate_config, PlannerConfig};
//!
//! let config: PlannerConfig =
//!     serde_json::from_str(r#"{"distance_per_minute": 2500000.0}"#).unwrap();
//! assert_eq!(config.fuel_distance_per_unit, 1_000_000.0);
//! assert!(validate_config(&config).is_empty());
//! assert_eq!(config.minutes_for(5_000_000.0), 2);
//! ```

use serde::{Deserialize, Serialize};

/// Distance covered per unit of fuel.
pub const DEFAULT_FUEL_DISTANCE_PER_UNIT: f64 = 1_000_000.0;
/// Distance covered per minute of travel.
pub const DEFAULT_DISTANCE_PER_MINUTE: f64 = 5_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub fuel_distance_per_unit: f64,
    pub distance_per_minute: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            fuel_distance_per_unit: DEFAULT_FUEL_DISTANCE_PER_UNIT,
            distance_per_minute: DEFAULT_DISTANCE_PER_MINUTE,
        }
    }
}

impl PlannerConfig {
    /// Fuel units for a distance, rounded up.
    pub fn fuel_for(&self, distance: f64) -> u64 {
        ceil_ratio(distance, self.fuel_distance_per_unit)
    }

    /// Travel minutes for a distance, rounded up.
    pub fn minutes_for(&self, distance: f64) -> u64 {
        ceil_ratio(distance, self.distance_per_minute)
    }
}

fn ceil_ratio(distance: f64, divisor: f64) -> u64 {
    if distance <= 0.0 || divisor <= 0.0 || !divisor.is_finite() {
        return 0;
    }
    (distance / divisor).ceil() as u64
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Fuel divisor must be positive and finite.
    InvalidFuelDivisor(f64),
    /// Time divisor must be positive and finite.
    InvalidTimeDivisor(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidFuelDivisor(v) => {
                write!(f, "fuel_distance_per_unit must be positive, got {}", v)
            }
            ConfigError::InvalidTimeDivisor(v) => {
                write!(f, "distance_per_minute must be positive, got {}", v)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate a planner config, returning all errors found.
pub fn validate_config(config: &PlannerConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    if !(config.fuel_distance_per_unit.is_finite() && config.fuel_distance_per_unit > 0.0) {
        errors.push(ConfigError::InvalidFuelDivisor(
            config.fuel_distance_per_unit,
        ));
    }
    if !(config.distance_per_minute.is_finite() && config.distance_per_minute > 0.0) {
        errors.push(ConfigError::InvalidTimeDivisor(config.distance_per_minute));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&PlannerConfig::default()).is_empty());
    }

    #[test]
    fn test_fuel_rounds_up() {
        let config = PlannerConfig::default();
        assert_eq!(config.fuel_for(0.0), 0);
        assert_eq!(config.fuel_for(1.0), 1);
        assert_eq!(config.fuel_for(1_000_000.0), 1);
        assert_eq!(config.fuel_for(1_000_001.0), 2);
    }

    #[test]
    fn test_minutes_round_up() {
        let config = PlannerConfig::default();
        assert_eq!(config.minutes_for(4_999_999.0), 1);
        assert_eq!(config.minutes_for(10_000_000.0), 2);
        assert_eq!(config.minutes_for(10_000_001.0), 3);
    }

    #[test]
    fn test_invalid_divisors_collected() {
        let config = PlannerConfig {
            fuel_distance_per_unit: 0.0,
            distance_per_minute: f64::NAN,
        };
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ConfigError::InvalidFuelDivisor(_)));
        assert!(matches!(errors[1], ConfigError::InvalidTimeDivisor(_)));
    }

    #[test]
    fn test_invalid_divisor_yields_zero() {
        let config = PlannerConfig {
            fuel_distance_per_unit: -1.0,
            ..PlannerConfig::default()
        };
        assert_eq!(config.fuel_for(5_000_000.0), 0);
    }
}
