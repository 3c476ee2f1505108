//! # Validation Module
//!
//! Input validation utilities for MeterMate.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller UI / CLI arguments                                    │
//! │  ├── Type checks (clap / JSON deserialization)                         │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  ├── Tariff well-formedness (slab ordering, rate ranges)               │
//! │  └── Reading sanity (finite numbers, named meters)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: The engine itself                                            │
//! │  └── Clamps whatever still slips through to degenerate zeros           │
//! │                                                                         │
//! │  The engine NEVER faults; this layer exists so bad input fails loudly  │
//! │  at the boundary instead of silently producing a zero bill.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use metermate_core::types::TariffConfig;
//! use metermate_core::validation::{validate_tariff, validate_units};
//!
//! validate_tariff(&TariffConfig::default()).unwrap();
//! validate_units(142.5).unwrap();
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::{MeterReading, TariffConfig};
use crate::MAX_SUB_METERS;

// =============================================================================
// Numeric Helpers
// =============================================================================

fn require_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

// =============================================================================
// Tariff Validation
// =============================================================================

/// Validates a tariff configuration.
///
/// ## Rules
/// - Slab limits are finite, positive, and strictly increasing
/// - Slab rates are finite and non-negative
/// - Fixed charges and fees are finite and non-negative
/// - `vat_rate` is a fraction in `[0, 1]`
/// - `reverse_epsilon` is finite and non-negative
///
/// An empty slab list is allowed: the engine treats it as "no energy cost",
/// which is a degenerate tariff, not a malformed one.
pub fn validate_tariff(tariff: &TariffConfig) -> ValidationResult<()> {
    let mut previous_limit = 0.0;
    for (index, slab) in tariff.slabs.iter().enumerate() {
        require_finite(&format!("slabs[{index}].limit"), slab.limit)?;
        require_non_negative(&format!("slabs[{index}].rate"), slab.rate)?;

        if slab.limit <= previous_limit {
            return Err(ValidationError::SlabOrder {
                index,
                limit: slab.limit,
                previous: previous_limit,
            });
        }
        previous_limit = slab.limit;
    }

    require_non_negative("demandCharge", tariff.demand_charge)?;
    require_non_negative("meterRent", tariff.meter_rent)?;
    require_non_negative("bkashCharge", tariff.bkash_charge)?;
    require_non_negative("lateFee", tariff.late_fee)?;
    require_non_negative("reverseEpsilon", tariff.reverse_epsilon)?;

    require_finite("vatRate", tariff.vat_rate)?;
    if !(0.0..=1.0).contains(&tariff.vat_rate) {
        return Err(ValidationError::OutOfRange {
            field: "vatRate".to_string(),
            min: 0.0,
            max: 1.0,
            value: tariff.vat_rate,
        });
    }

    Ok(())
}

// =============================================================================
// Input Validation
// =============================================================================

/// Validates a consumption figure before a forward calculation.
pub fn validate_units(units: f64) -> ValidationResult<()> {
    require_non_negative("units", units)
}

/// Validates a bill amount before a reverse calculation.
pub fn validate_bill_amount(bill: f64) -> ValidationResult<()> {
    require_non_negative("bill", bill)
}

/// Validates a single meter reading.
///
/// ## Rules
/// - `name` must not be blank
/// - `previous` and `current` must be finite and non-negative
///
/// Note that `current < previous` is *not* an error here: rollover is a real
/// phenomenon and the engine floors it to zero consumption.
pub fn validate_reading(reading: &MeterReading) -> ValidationResult<()> {
    if reading.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    require_non_negative("previous", reading.previous)?;
    require_non_negative("current", reading.current)?;

    Ok(())
}

/// Validates the number of sub-meters on one bill.
///
/// ## Rules
/// - At least one participant (an empty split is a caller bug, the engine
///   would just return zeros)
/// - At most [`MAX_SUB_METERS`]
pub fn validate_participant_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "meters".to_string(),
        });
    }

    if count > MAX_SUB_METERS {
        return Err(ValidationError::TooManyMeters {
            count,
            max: MAX_SUB_METERS,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Slab;

    #[test]
    fn test_default_tariff_validates() {
        assert!(validate_tariff(&TariffConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_slabs_are_allowed() {
        let tariff = TariffConfig {
            slabs: vec![],
            ..TariffConfig::default()
        };
        assert!(validate_tariff(&tariff).is_ok());
    }

    #[test]
    fn test_non_increasing_slab_limits_rejected() {
        let tariff = TariffConfig {
            slabs: vec![Slab::new(75.0, 4.5), Slab::new(75.0, 6.0)],
            ..TariffConfig::default()
        };
        let err = validate_tariff(&tariff).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::SlabOrder { index: 1, .. }
        ));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let tariff = TariffConfig {
            slabs: vec![Slab::new(75.0, -4.5)],
            ..TariffConfig::default()
        };
        assert!(validate_tariff(&tariff).is_err());
    }

    #[test]
    fn test_vat_rate_must_be_fraction() {
        let tariff = TariffConfig {
            vat_rate: 5.0, // someone typed a percentage
            ..TariffConfig::default()
        };
        assert!(matches!(
            validate_tariff(&tariff).unwrap_err(),
            ValidationError::OutOfRange { .. }
        ));
    }

    #[test]
    fn test_non_finite_inputs_rejected() {
        assert!(validate_units(f64::NAN).is_err());
        assert!(validate_units(f64::INFINITY).is_err());
        assert!(validate_bill_amount(f64::NAN).is_err());
    }

    #[test]
    fn test_negative_inputs_rejected() {
        assert!(validate_units(-1.0).is_err());
        assert!(validate_bill_amount(-0.01).is_err());
        assert!(validate_units(0.0).is_ok());
    }

    #[test]
    fn test_reading_requires_name() {
        let mut m = MeterReading::new("  ");
        m.current = 100.0;
        assert!(matches!(
            validate_reading(&m).unwrap_err(),
            ValidationError::Required { .. }
        ));
    }

    #[test]
    fn test_rollover_reading_is_valid() {
        let mut m = MeterReading::new("Flat A");
        m.previous = 900.0;
        m.current = 100.0;
        assert!(validate_reading(&m).is_ok());
    }

    #[test]
    fn test_participant_count_bounds() {
        assert!(validate_participant_count(0).is_err());
        assert!(validate_participant_count(1).is_ok());
        assert!(validate_participant_count(MAX_SUB_METERS).is_ok());
        assert!(validate_participant_count(MAX_SUB_METERS + 1).is_err());
    }
}
