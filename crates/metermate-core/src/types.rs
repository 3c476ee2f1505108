//! # Domain Types
//!
//! Core domain types used throughout MeterMate.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  TariffConfig   │   │  MeterReading   │   │   BillConfig    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  slabs          │   │  id (UUID)      │   │  month          │       │
//! │  │  demand_charge  │   │  name           │   │  date_generated │       │
//! │  │  meter_rent     │   │  previous       │   │  include_late.. │       │
//! │  │  vat_rate       │   │  current        │   │  include_bkash..│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │      Slab       │   One consumption band: everything up to `limit`  │
//! │  │  limit, rate    │   (cumulative kWh) is billed at `rate` per unit.  │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! A meter has:
//! - `id`: UUID v4 - immutable, survives renames
//! - `name`: human-readable tenant label, freely editable
//!
//! ## JSON Shape
//! All types serialize with camelCase field names so a web frontend (or a
//! hand-written tariff file) reads naturally: `demandCharge`, `vatRate`, etc.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::DEFAULT_REVERSE_EPSILON;

// =============================================================================
// Slab
// =============================================================================

/// A consumption band within a tiered tariff.
///
/// `limit` is the *cumulative* upper bound in kWh covered by this band and
/// all bands before it; `rate` is the per-unit price inside the band.
///
/// ## Example
/// Slabs `[{limit: 75, rate: 4.5}, {limit: 200, rate: 6.0}]` mean:
/// units 0–75 cost 4.5 each, units 75–200 cost 6.0 each, and anything past
/// 200 keeps costing 6.0 (the last band is open-ended).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Slab {
    /// Cumulative upper bound of consumption (kWh) for this band.
    pub limit: f64,
    /// Per-unit price (currency/kWh) inside this band.
    pub rate: f64,
}

impl Slab {
    /// Convenience constructor, mostly for tests and defaults.
    #[inline]
    pub const fn new(limit: f64, rate: f64) -> Self {
        Slab { limit, rate }
    }
}

// =============================================================================
// Tariff Configuration
// =============================================================================

/// The complete tariff structure a bill is computed under.
///
/// Immutable from the engine's point of view: calculations borrow it and
/// never mutate it. Invariants (strictly increasing slab limits, non-negative
/// charges) are enforced by [`crate::validation::validate_tariff`], not here -
/// the engine itself never fails on a well-formed `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TariffConfig {
    /// Ordered consumption bands. The last band is open-ended in practice:
    /// consumption past its limit is billed at its rate indefinitely.
    pub slabs: Vec<Slab>,

    /// Fixed monthly demand charge, independent of consumption.
    pub demand_charge: f64,

    /// Fixed monthly meter rent, independent of consumption.
    pub meter_rent: f64,

    /// VAT as a fraction (0.05 = 5%), applied to energy cost + fixed charges.
    pub vat_rate: f64,

    /// Payment-processing fee (bKash), added only when
    /// [`BillConfig::include_bkash_fee`] is set.
    pub bkash_charge: f64,

    /// Late-payment penalty, added only when
    /// [`BillConfig::include_late_fee`] is set.
    pub late_fee: f64,

    /// Tolerance for leftover cost in the reverse calculation.
    ///
    /// ## Why configurable?
    /// The reverse walk can leave a tiny floating-point residue after the
    /// defined slabs are exhausted. Residue above this threshold is treated
    /// as real consumption at the last slab's rate; below it, it is noise.
    /// The right threshold depends on the currency's precision, so callers
    /// can tune it. Defaults to [`DEFAULT_REVERSE_EPSILON`].
    #[serde(default = "default_reverse_epsilon")]
    pub reverse_epsilon: f64,
}

fn default_reverse_epsilon() -> f64 {
    DEFAULT_REVERSE_EPSILON
}

impl Default for TariffConfig {
    /// Returns a residential tariff suitable for development and the CLI's
    /// out-of-the-box behavior.
    ///
    /// ## Default Values
    /// - Slabs: 0–75 @ 4.50, 75–200 @ 6.00, 200–300 @ 6.30,
    ///   300–400 @ 6.60, 400–600 @ 10.40 (open-ended past 600)
    /// - Demand charge: 50.00, meter rent: 20.00
    /// - VAT: 5%
    /// - bKash charge: 20.00, late fee: 50.00
    fn default() -> Self {
        TariffConfig {
            slabs: vec![
                Slab::new(75.0, 4.5),
                Slab::new(200.0, 6.0),
                Slab::new(300.0, 6.3),
                Slab::new(400.0, 6.6),
                Slab::new(600.0, 10.4),
            ],
            demand_charge: 50.0,
            meter_rent: 20.0,
            vat_rate: 0.05,
            bkash_charge: 20.0,
            late_fee: 50.0,
            reverse_epsilon: DEFAULT_REVERSE_EPSILON,
        }
    }
}

impl TariffConfig {
    /// Sum of the fixed charges (demand charge + meter rent).
    #[inline]
    pub fn fixed_charges(&self) -> f64 {
        self.demand_charge + self.meter_rent
    }

    /// Rate of the last (open-ended) slab, or `None` for an empty tariff.
    #[inline]
    pub fn last_rate(&self) -> Option<f64> {
        self.slabs.last().map(|s| s.rate)
    }
}

// =============================================================================
// Meter Reading
// =============================================================================

/// A single meter's previous and current readings for one billing period.
///
/// Used for both the main (utility) meter and tenant sub-meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MeterReading {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant / meter label shown on the receipt.
    pub name: String,

    /// Reading at the start of the period (kWh).
    pub previous: f64,

    /// Reading at the end of the period (kWh).
    pub current: f64,
}

impl MeterReading {
    /// Creates a reading with a fresh UUID and zeroed counters.
    pub fn new(name: impl Into<String>) -> Self {
        MeterReading {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            previous: 0.0,
            current: 0.0,
        }
    }

    /// Consumption for the period, floored at zero.
    ///
    /// A current reading below the previous one (meter rollover, entry error)
    /// yields 0, never a negative number. Non-finite garbage also collapses
    /// to 0 because `f64::max` discards the NaN operand.
    ///
    /// ## Example
    /// ```rust
    /// use metermate_core::types::MeterReading;
    ///
    /// let mut m = MeterReading::new("Flat 2B");
    /// m.previous = 1200.0;
    /// m.current = 1283.5;
    /// assert_eq!(m.units(), 83.5);
    ///
    /// m.current = 1100.0; // rollover / typo
    /// assert_eq!(m.units(), 0.0);
    /// ```
    #[inline]
    pub fn units(&self) -> f64 {
        (self.current - self.previous).max(0.0)
    }
}

// =============================================================================
// Bill Configuration
// =============================================================================

/// Per-bill settings: which period this is and which optional fees apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillConfig {
    /// Billing month label, e.g. "January".
    pub month: String,

    /// Date the bill was generated (shown on the receipt header).
    #[ts(as = "String")]
    pub date_generated: NaiveDate,

    /// Whether the late-payment penalty is collected this period.
    #[serde(default)]
    pub include_late_fee: bool,

    /// Whether the bKash processing fee is collected this period.
    #[serde(default)]
    pub include_bkash_fee: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_normal_delta() {
        let mut m = MeterReading::new("A");
        m.previous = 100.0;
        m.current = 180.0;
        assert_eq!(m.units(), 80.0);
    }

    #[test]
    fn test_units_zero_floor_on_rollover() {
        let mut m = MeterReading::new("A");
        m.previous = 500.0;
        m.current = 120.0;
        assert_eq!(m.units(), 0.0);
    }

    #[test]
    fn test_units_nan_collapses_to_zero() {
        let mut m = MeterReading::new("A");
        m.previous = f64::NAN;
        m.current = 100.0;
        assert_eq!(m.units(), 0.0);
    }

    #[test]
    fn test_new_reading_gets_unique_ids() {
        let a = MeterReading::new("A");
        let b = MeterReading::new("B");
        assert_ne!(a.id, b.id);
        assert!(uuid::Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_default_tariff_is_ordered() {
        let t = TariffConfig::default();
        for pair in t.slabs.windows(2) {
            assert!(pair[0].limit < pair[1].limit);
        }
        assert_eq!(t.last_rate(), Some(10.4));
        assert_eq!(t.fixed_charges(), 70.0);
    }

    #[test]
    fn test_tariff_json_uses_camel_case_and_defaults_epsilon() {
        let json = r#"{
            "slabs": [{"limit": 75, "rate": 4.5}],
            "demandCharge": 50,
            "meterRent": 20,
            "vatRate": 0.05,
            "bkashCharge": 20,
            "lateFee": 50
        }"#;
        let t: TariffConfig = serde_json::from_str(json).unwrap();
        assert_eq!(t.demand_charge, 50.0);
        assert_eq!(t.reverse_epsilon, DEFAULT_REVERSE_EPSILON);
    }

    #[test]
    fn test_bill_config_fee_flags_default_off() {
        let json = r#"{"month": "January", "dateGenerated": "2025-01-05"}"#;
        let c: BillConfig = serde_json::from_str(json).unwrap();
        assert!(!c.include_late_fee);
        assert!(!c.include_bkash_fee);
    }
}
