//! # Tariff Engine
//!
//! The forward (units → bill) and reverse (bill → units) slab calculators.
//!
//! ## How Slab Billing Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TIERED (SLAB) BILLING                                                  │
//! │                                                                         │
//! │  Slabs: [{limit: 75, rate: 4.5}, {limit: 200, rate: 6.0}]              │
//! │                                                                         │
//! │  kWh:   0 ────────── 75 ─────────────────── 200 ──────────────► ∞      │
//! │  rate:      4.5/unit          6.0/unit            6.0/unit             │
//! │                                             (last band is open-ended)  │
//! │                                                                         │
//! │  100 units = 75 × 4.5  +  25 × 6.0  = 487.50 energy cost               │
//! │                                                                         │
//! │  total payable = (energy + demand charge + meter rent) × (1 + VAT)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Round-Trip Contract
//! [`compute_units_from_bill`] is the exact inverse of [`compute_bill`]:
//! the VAT portion comes out of the closed form `bill × vat / (1 + vat)`
//! rather than an iterative search, so
//! `compute_bill(compute_units_from_bill(b).total_units).total_payable ≈ b`
//! holds to floating-point tolerance for any bill the tariff can produce.
//! Preserve the closed form when touching this module.
//!
//! ## Purity
//! Both functions are deterministic, allocation-free, and never fail. Bad
//! input (negative, NaN) is clamped to zero rather than propagated - callers
//! wanting loud failures run [`crate::validation`] first.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::TariffConfig;

// =============================================================================
// Result Types
// =============================================================================

/// Breakdown of a forward (units → bill) calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillBreakdown {
    /// Cost of consumed energy across all slabs, before charges and VAT.
    pub energy_cost: f64,
    /// Energy cost + demand charge + meter rent (the taxable base).
    pub total_subject_to_vat: f64,
    /// VAT on the taxable base.
    pub vat_amount: f64,
    /// Final payable amount: taxable base + VAT.
    pub total_payable: f64,
}

/// Breakdown of a reverse (bill → units) calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UnitsBreakdown {
    /// Implied consumption in kWh (fractional - this is an inversion, not a
    /// meter reading).
    pub total_units: f64,
    /// The energy-cost portion of the bill, after VAT and fixed charges are
    /// peeled off. Zero when the bill doesn't cover the fixed charges.
    pub energy_cost: f64,
    /// The VAT embedded in the bill.
    pub vat_amount: f64,
}

// =============================================================================
// Forward: units → bill
// =============================================================================

/// Computes a bill from consumption under a tiered tariff.
///
/// Walks the slabs in ascending order with a running remainder; consumption
/// beyond the last defined limit is billed at the last slab's rate (the
/// open-ended final band). Empty slabs mean zero energy cost - fixed charges
/// and VAT still apply.
///
/// Negative or NaN `units` are clamped to 0.
///
/// ## Example
/// ```rust
/// use metermate_core::tariff::compute_bill;
/// use metermate_core::types::{Slab, TariffConfig};
///
/// let tariff = TariffConfig {
///     slabs: vec![Slab::new(75.0, 4.5), Slab::new(200.0, 6.0)],
///     demand_charge: 50.0,
///     meter_rent: 20.0,
///     vat_rate: 0.05,
///     ..TariffConfig::default()
/// };
///
/// let bill = compute_bill(100.0, &tariff);
/// assert_eq!(bill.energy_cost, 487.5);      // 75×4.5 + 25×6.0
/// assert_eq!(bill.total_payable, 585.375);  // (487.5 + 70) × 1.05
/// ```
pub fn compute_bill(units: f64, tariff: &TariffConfig) -> BillBreakdown {
    // max() also swallows NaN: f64::max keeps the non-NaN operand.
    let mut remaining = units.max(0.0);
    let mut energy_cost = 0.0;
    let mut previous_limit = 0.0;

    for slab in &tariff.slabs {
        let slab_size = slab.limit - previous_limit;
        let consumed = remaining.min(slab_size);

        if consumed > 0.0 {
            energy_cost += consumed * slab.rate;
            remaining -= consumed;
        }
        previous_limit = slab.limit;
        if remaining <= 0.0 {
            break;
        }
    }

    // Residual past the highest defined limit: open-ended final band.
    if remaining > 0.0 {
        if let Some(last_rate) = tariff.last_rate() {
            energy_cost += remaining * last_rate;
        }
    }

    let total_subject_to_vat = energy_cost + tariff.fixed_charges();
    let vat_amount = total_subject_to_vat * tariff.vat_rate;
    let total_payable = total_subject_to_vat + vat_amount;

    BillBreakdown {
        energy_cost,
        total_subject_to_vat,
        vat_amount,
        total_payable,
    }
}

// =============================================================================
// Reverse: bill → units
// =============================================================================

/// Computes the consumption implied by a total payable amount.
///
/// The VAT portion is extracted directly by solving
/// `bill = base × (1 + vat)`, i.e. `vat_amount = bill × vat / (1 + vat)` -
/// no search. Fixed charges come off the base; the remaining energy cost is
/// walked back through the slabs. Leftover cost above
/// [`TariffConfig::reverse_epsilon`] after the defined slabs converts at the
/// last slab's rate, mirroring the forward open-ended band.
///
/// A bill that doesn't cover the fixed charges implies zero consumption:
/// `total_units` and `energy_cost` are both 0 (never negative).
pub fn compute_units_from_bill(bill: f64, tariff: &TariffConfig) -> UnitsBreakdown {
    let bill = bill.max(0.0);

    let vat_amount = bill * tariff.vat_rate / (1.0 + tariff.vat_rate);
    let taxable_base = bill - vat_amount;
    let energy_cost = taxable_base - tariff.fixed_charges();

    if energy_cost <= 0.0 {
        return UnitsBreakdown {
            total_units: 0.0,
            energy_cost: 0.0,
            vat_amount,
        };
    }

    let mut remaining_cost = energy_cost;
    let mut total_units = 0.0;
    let mut previous_limit = 0.0;

    for slab in &tariff.slabs {
        let slab_size = slab.limit - previous_limit;
        let max_cost_for_slab = slab_size * slab.rate;

        if remaining_cost >= max_cost_for_slab {
            // The whole band is consumed.
            total_units += slab_size;
            remaining_cost -= max_cost_for_slab;
        } else {
            // Remainder is absorbed inside this band. rate > 0 here: a zero
            // rate makes max_cost_for_slab 0, which takes the branch above.
            total_units += remaining_cost / slab.rate;
            remaining_cost = 0.0;
            break;
        }
        previous_limit = slab.limit;
    }

    // Cost past the highest defined limit, minus float residue.
    if remaining_cost > tariff.reverse_epsilon {
        if let Some(last_rate) = tariff.last_rate() {
            if last_rate > 0.0 {
                total_units += remaining_cost / last_rate;
            }
        }
    }

    UnitsBreakdown {
        total_units,
        energy_cost,
        vat_amount,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
