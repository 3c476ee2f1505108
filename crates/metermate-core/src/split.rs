//! # Bill Splitting
//!
//! Apportions one utility bill across sub-metered tenants.
//!
//! ## Money Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bill Apportionment                               │
//! │                                                                         │
//! │  sub-meter units ──► Σ ──► compute_bill(total) ──► energy + VAT        │
//! │                                                                         │
//! │  energy cost ──────────► split by USAGE (units × realized rate)        │
//! │  demand charge ─────┐                                                   │
//! │  meter rent ────────┤                                                   │
//! │  VAT ───────────────┼──► split EQUALLY across participants             │
//! │  late fee (opt) ────┤                                                   │
//! │  bKash fee (opt) ───┘                                                   │
//! │                                                                         │
//! │  main meter − Σ sub-meters = system loss (reported, never billed)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! The split itself is exact `f64` arithmetic; only the per-tenant *display*
//! amounts round to whole currency units. Rounding each tenant independently
//! can drift the printed subtotal from the printed collection total by up to
//! one unit per tenant - `rounded_user_total` exists so receipts show the sum
//! of what tenants actually pay, and the drift bound is pinned by a test.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::tariff::compute_bill;
use crate::types::{BillConfig, MeterReading, TariffConfig};

// =============================================================================
// Result Types
// =============================================================================

/// One tenant's share of the bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserShare {
    /// Meter id this share was computed from.
    pub id: String,
    /// Tenant label.
    pub name: String,
    /// Previous reading (echoed for the receipt).
    pub previous: f64,
    /// Current reading (echoed for the receipt).
    pub current: f64,
    /// Consumption for the period, zero-floored.
    pub units_used: f64,
    /// Usage-proportional part: `units_used × calculated_rate`.
    pub energy_cost: f64,
    /// Full share: energy cost + equal slice of the fixed pool.
    pub total_payable: f64,
}

impl UserShare {
    /// The amount actually printed on the receipt: whole currency units.
    #[inline]
    pub fn rounded_payable(&self) -> i64 {
        self.total_payable.round() as i64
    }
}

/// The complete result of splitting one bill, with every figure the receipt
/// shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillSplit {
    /// Sum of sub-meter consumption - the billed units.
    pub total_units: f64,
    /// Main (utility) meter consumption.
    pub main_units: f64,
    /// Unbilled line loss: `max(0, main − Σ sub)`. Reported, not charged.
    pub system_loss: f64,

    /// Energy cost of `total_units` under the tariff.
    pub energy_cost: f64,
    /// Total VAT on energy + fixed charges.
    pub vat_amount: f64,
    /// VAT attributable to the fixed charges alone. Display-only: the shared
    /// pool below always carries the *total* VAT.
    pub vat_on_fixed: f64,

    /// Late fee collected this period (0 when the toggle is off).
    pub late_fee: f64,
    /// bKash processing fee collected this period (0 when the toggle is off).
    pub bkash_fee: f64,

    /// The utility bill proper: collection minus late fee and bKash fee.
    pub base_bill: f64,
    /// Everything collected from tenants: base bill + late fee + bKash fee.
    pub total_collection: f64,

    /// Realized per-unit rate: `energy_cost / total_units` (0 when no units).
    pub calculated_rate: f64,
    /// Equal slice of the shared pool (fixed charges + VAT + optional fees)
    /// each tenant pays regardless of consumption. 0 with no participants.
    pub fixed_cost_per_user: f64,

    /// Per-tenant shares, in input order.
    pub users: Vec<UserShare>,
}

impl BillSplit {
    /// Exact sum of the per-tenant shares. Equals `total_collection` up to
    /// floating-point noise.
    pub fn user_total(&self) -> f64 {
        self.users.iter().map(|u| u.total_payable).sum()
    }

    /// Sum of the *rounded* per-tenant amounts - what is actually collected
    /// once everyone pays whole currency units.
    pub fn rounded_user_total(&self) -> i64 {
        self.users.iter().map(|u| u.rounded_payable()).sum()
    }
}

// =============================================================================
// Splitting
// =============================================================================

/// Splits one billing period's costs across sub-metered tenants.
///
/// The bill is computed from the *sum of sub-meter* consumption (tenants pay
/// for what their meters recorded; line loss between the main meter and the
/// sub-meters is reported as `system_loss` but charged to no one). Energy
/// cost is divided in proportion to usage at the realized rate; every shared
/// cost - demand charge, meter rent, the whole VAT amount, and the optional
/// late/bKash fees - is divided equally. This keeps
/// `Σ share ≈ total_collection` exactly, before display rounding.
///
/// Degenerate inputs degrade to zeros instead of faults: no sub-meters means
/// no shares and a zero fixed cost; zero total units means a zero realized
/// rate.
pub fn split_bill(
    main: &MeterReading,
    subs: &[MeterReading],
    bill: &BillConfig,
    tariff: &TariffConfig,
) -> BillSplit {
    let main_units = main.units();
    let total_units: f64 = subs.iter().map(MeterReading::units).sum();
    let system_loss = (main_units - total_units).max(0.0);

    let breakdown = compute_bill(total_units, tariff);

    let late_fee = if bill.include_late_fee {
        tariff.late_fee
    } else {
        0.0
    };
    let bkash_fee = if bill.include_bkash_fee {
        tariff.bkash_charge
    } else {
        0.0
    };

    let base_bill = breakdown.total_payable;
    let total_collection = base_bill + late_fee + bkash_fee;

    let calculated_rate = if total_units > 0.0 {
        breakdown.energy_cost / total_units
    } else {
        0.0
    };

    let shared_pool =
        tariff.fixed_charges() + breakdown.vat_amount + late_fee + bkash_fee;
    let fixed_cost_per_user = if subs.is_empty() {
        0.0
    } else {
        shared_pool / subs.len() as f64
    };

    let users = subs
        .iter()
        .map(|meter| {
            let units_used = meter.units();
            let energy_cost = units_used * calculated_rate;
            UserShare {
                id: meter.id.clone(),
                name: meter.name.clone(),
                previous: meter.previous,
                current: meter.current,
                units_used,
                energy_cost,
                total_payable: energy_cost + fixed_cost_per_user,
            }
        })
        .collect();

    BillSplit {
        total_units,
        main_units,
        system_loss,
        energy_cost: breakdown.energy_cost,
        vat_amount: breakdown.vat_amount,
        vat_on_fixed: tariff.fixed_charges() * tariff.vat_rate,
        late_fee,
        bkash_fee,
        base_bill,
        total_collection,
        calculated_rate,
        fixed_cost_per_user,
        users,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Slab;

    fn tariff() -> TariffConfig {
        TariffConfig {
            slabs: vec![Slab::new(75.0, 4.5), Slab::new(200.0, 6.0)],
            demand_charge: 50.0,
            meter_rent: 20.0,
            vat_rate: 0.05,
            bkash_charge: 20.0,
            late_fee: 50.0,
            ..TariffConfig::default()
        }
    }

    fn bill_config(late: bool, bkash: bool) -> BillConfig {
        BillConfig {
            month: "January".to_string(),
            date_generated: chrono::NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            include_late_fee: late,
            include_bkash_fee: bkash,
        }
    }

    fn reading(name: &str, previous: f64, current: f64) -> MeterReading {
        let mut m = MeterReading::new(name);
        m.previous = previous;
        m.current = current;
        m
    }

    #[test]
    fn test_three_tenant_split_reconciles() {
        let main = reading("Main", 1000.0, 1105.0);
        let subs = vec![
            reading("Flat A", 200.0, 240.0),   // 40 units
            reading("Flat B", 300.0, 335.0),   // 35 units
            reading("Flat C", 500.0, 525.0),   // 25 units
        ];
        let split = split_bill(&main, &subs, &bill_config(false, false), &tariff());

        // 100 billed units: energy 487.5, VAT 27.875, collection 585.375.
        assert_eq!(split.total_units, 100.0);
        assert_eq!(split.energy_cost, 487.5);
        assert_eq!(split.total_collection, 585.375);
        assert_eq!(split.base_bill, 585.375);
        assert_eq!(split.calculated_rate, 4.875);

        // Exact shares sum back to the collection.
        assert!((split.user_total() - split.total_collection).abs() < 1e-6);

        // Display rounding drifts at most ±1 per tenant.
        let rounded_total = split.rounded_user_total();
        let collection_rounded = split.total_collection.round() as i64;
        assert!((rounded_total - collection_rounded).abs() <= subs.len() as i64);
    }

    #[test]
    fn test_usage_proportional_energy_equal_fixed() {
        let main = reading("Main", 0.0, 100.0);
        let subs = vec![
            reading("Heavy", 0.0, 80.0),
            reading("Light", 0.0, 20.0),
        ];
        let split = split_bill(&main, &subs, &bill_config(false, false), &tariff());

        let heavy = &split.users[0];
        let light = &split.users[1];
        assert_eq!(heavy.energy_cost, 80.0 * split.calculated_rate);
        assert_eq!(light.energy_cost, 20.0 * split.calculated_rate);
        // Fixed slice is identical regardless of consumption.
        assert_eq!(
            heavy.total_payable - heavy.energy_cost,
            light.total_payable - light.energy_cost
        );
    }

    #[test]
    fn test_fee_toggles_feed_the_shared_pool() {
        let main = reading("Main", 0.0, 100.0);
        let subs = vec![reading("A", 0.0, 50.0), reading("B", 0.0, 50.0)];

        let without = split_bill(&main, &subs, &bill_config(false, false), &tariff());
        let with = split_bill(&main, &subs, &bill_config(true, true), &tariff());

        assert_eq!(without.late_fee, 0.0);
        assert_eq!(without.bkash_fee, 0.0);
        assert_eq!(with.late_fee, 50.0);
        assert_eq!(with.bkash_fee, 20.0);

        // Fees land in the collection and are shared equally.
        assert_eq!(with.total_collection, without.total_collection + 70.0);
        assert_eq!(
            with.fixed_cost_per_user,
            without.fixed_cost_per_user + 35.0
        );
        // Base bill excludes them either way.
        assert_eq!(with.base_bill, without.base_bill);
        assert!((with.user_total() - with.total_collection).abs() < 1e-6);
    }

    #[test]
    fn test_system_loss_reported_not_billed() {
        let main = reading("Main", 0.0, 120.0);
        let subs = vec![reading("A", 0.0, 100.0)];
        let split = split_bill(&main, &subs, &bill_config(false, false), &tariff());

        assert_eq!(split.main_units, 120.0);
        assert_eq!(split.total_units, 100.0);
        assert_eq!(split.system_loss, 20.0);
        // The bill is computed from the 100 sub-metered units only.
        assert_eq!(split.energy_cost, 487.5);
    }

    #[test]
    fn test_system_loss_never_negative() {
        // Sub-meters reading more than the main meter (main rollover).
        let main = reading("Main", 900.0, 950.0);
        let subs = vec![reading("A", 0.0, 80.0)];
        let split = split_bill(&main, &subs, &bill_config(false, false), &tariff());
        assert_eq!(split.system_loss, 0.0);
    }

    #[test]
    fn test_no_participants_degrades_to_zeros() {
        let main = reading("Main", 0.0, 100.0);
        let split = split_bill(&main, &[], &bill_config(true, true), &tariff());

        assert_eq!(split.total_units, 0.0);
        assert_eq!(split.calculated_rate, 0.0);
        assert_eq!(split.fixed_cost_per_user, 0.0);
        assert!(split.users.is_empty());
    }

    #[test]
    fn test_zero_consumption_tenants_still_share_fixed_costs() {
        let main = reading("Main", 0.0, 0.0);
        let subs = vec![reading("A", 10.0, 10.0), reading("B", 20.0, 20.0)];
        let split = split_bill(&main, &subs, &bill_config(false, false), &tariff());

        assert_eq!(split.calculated_rate, 0.0);
        // (50 + 20) × 1.05 = 73.5, split two ways.
        assert_eq!(split.fixed_cost_per_user, 36.75);
        assert_eq!(split.users[0].total_payable, 36.75);
        assert!((split.user_total() - split.total_collection).abs() < 1e-9);
    }

    #[test]
    fn test_rollover_sub_meter_counts_as_zero() {
        let main = reading("Main", 0.0, 50.0);
        let subs = vec![
            reading("OK", 0.0, 50.0),
            reading("Rolled", 9990.0, 5.0), // current < previous
        ];
        let split = split_bill(&main, &subs, &bill_config(false, false), &tariff());
        assert_eq!(split.users[1].units_used, 0.0);
        assert_eq!(split.total_units, 50.0);
    }

    #[test]
    fn test_vat_on_fixed_is_display_only() {
        let main = reading("Main", 0.0, 100.0);
        let subs = vec![reading("A", 0.0, 100.0)];
        let split = split_bill(&main, &subs, &bill_config(false, false), &tariff());

        assert_eq!(split.vat_on_fixed, 70.0 * 0.05);
        // The pool carries the total VAT, not just the fixed-charge VAT:
        // one tenant pays the whole collection.
        assert!((split.users[0].total_payable - split.total_collection).abs() < 1e-9);
    }
}
