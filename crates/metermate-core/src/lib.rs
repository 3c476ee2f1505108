//! # metermate-core: Pure Business Logic for MeterMate
//!
//! This crate is the **heart** of MeterMate. It turns meter readings into a
//! tiered-tariff bill and splits that bill across sub-metered tenants, as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       MeterMate Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Callers (CLI today, web UI tomorrow)               │   │
//! │  │    readings in ──► breakdown out ──► receipt rendering          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ plain numeric values                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ metermate-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  tariff   │  │   split   │  │ validation│  │   │
//! │  │   │  Tariff   │  │  forward  │  │  shares   │  │   rules   │  │   │
//! │  │   │  Reading  │  │  reverse  │  │  sys loss │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (TariffConfig, MeterReading, BillConfig)
//! - [`tariff`] - The slab engine: units → bill and bill → units
//! - [`split`] - Apportioning one bill across tenants
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every calculation is deterministic - same tariff
//!    and readings, same bill
//! 2. **No I/O**: file, network, and terminal access are FORBIDDEN here
//! 3. **Never Faults**: degenerate input (empty tariff, zero tenants, meter
//!    rollover) yields degenerate zeros, not errors - validation is a
//!    separate, opt-in layer
//! 4. **Exact Inverse**: the reverse calculation uses a closed-form VAT
//!    extraction so forward and reverse round-trip within float tolerance
//!
//! ## Example Usage
//!
//! ```rust
//! use metermate_core::tariff::{compute_bill, compute_units_from_bill};
//! use metermate_core::types::TariffConfig;
//!
//! let tariff = TariffConfig::default();
//!
//! let bill = compute_bill(100.0, &tariff);
//! let back = compute_units_from_bill(bill.total_payable, &tariff);
//!
//! assert!((back.total_units - 100.0).abs() < 1e-2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod split;
pub mod tariff;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use metermate_core::TariffConfig` instead of
// `use metermate_core::types::TariffConfig`

pub use error::{CoreError, CoreResult, ValidationError};
pub use split::{split_bill, BillSplit, UserShare};
pub use tariff::{compute_bill, compute_units_from_bill, BillBreakdown, UnitsBreakdown};
pub use types::{BillConfig, MeterReading, Slab, TariffConfig};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tolerance for leftover cost in the reverse calculation.
///
/// ## Why 0.01?
/// One hundredth of a currency unit: residue smaller than the smallest coin
/// is floating-point noise, not consumption. Tariffs for currencies with a
/// different precision should override [`types::TariffConfig::reverse_epsilon`].
pub const DEFAULT_REVERSE_EPSILON: f64 = 0.01;

/// Maximum sub-meters allowed on a single bill.
///
/// ## Business Reason
/// Keeps one receipt legible and guards against a runaway reading sheet
/// (pasting the wrong file). Generous for the actual use case of one
/// building's tenants.
pub const MAX_SUB_METERS: usize = 50;
