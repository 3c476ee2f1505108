//! # MeterMate CLI
//!
//! Terminal front-end for the MeterMate calculation engine.
//!
//! ## Commands
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         metermate commands                              │
//! │                                                                         │
//! │  metermate bill  --units 100          units → bill breakdown           │
//! │  metermate units --bill 585.375       bill → implied units             │
//! │  metermate split --input sheet.json   apportion across sub-meters      │
//! │                                                                         │
//! │  All commands accept --tariff tariff.json; without it the built-in     │
//! │  residential tariff applies.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reading Sheet Format
//! ```json
//! {
//!   "month": "January",
//!   "dateGenerated": "2025-01-05",
//!   "mainMeter": { "previous": 1000.0, "current": 1105.0 },
//!   "meters": [
//!     { "name": "Flat A", "previous": 200.0, "current": 240.0 },
//!     { "name": "Flat B", "previous": 300.0, "current": 335.0 }
//!   ]
//! }
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use metermate_core::tariff::{compute_bill, compute_units_from_bill};
use metermate_core::types::{BillConfig, MeterReading, TariffConfig};
use metermate_core::validation::{
    validate_bill_amount, validate_participant_count, validate_reading, validate_tariff,
    validate_units,
};
use metermate_core::{split_bill, BillSplit};

// =============================================================================
// Argument Parsing
// =============================================================================

/// Split a tiered-tariff utility bill across sub-metered tenants.
#[derive(Parser, Debug)]
#[command(name = "metermate", version, about)]
struct Cli {
    /// Tariff configuration file (JSON). Defaults to the built-in
    /// residential tariff when omitted.
    #[arg(long, global = true)]
    tariff: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a bill from consumed units (kWh).
    Bill {
        /// Consumption in kWh.
        #[arg(long)]
        units: f64,
    },
    /// Compute the consumption implied by a total bill amount.
    Units {
        /// Total payable amount, VAT included.
        #[arg(long)]
        bill: f64,
    },
    /// Split one billing period across the sub-meters in a reading sheet.
    Split {
        /// Reading sheet (JSON): month, main meter, sub-meters.
        #[arg(long)]
        input: PathBuf,

        /// Collect the late-payment penalty this period.
        #[arg(long)]
        late_fee: bool,

        /// Collect the bKash processing fee this period.
        #[arg(long)]
        bkash: bool,
    },
}

// =============================================================================
// Reading Sheet (input file shape)
// =============================================================================

/// One meter's entry in the reading sheet file.
#[derive(Debug, Deserialize)]
struct SheetMeter {
    #[serde(default)]
    name: Option<String>,
    previous: f64,
    current: f64,
}

impl SheetMeter {
    fn into_reading(self, fallback_name: &str) -> MeterReading {
        let mut reading = MeterReading::new(
            self.name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| fallback_name.to_string()),
        );
        reading.previous = self.previous;
        reading.current = self.current;
        reading
    }
}

/// The reading sheet file for a `split` run.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadingSheet {
    month: String,
    date_generated: chrono::NaiveDate,
    main_meter: SheetMeter,
    #[serde(default)]
    meters: Vec<SheetMeter>,
}

// =============================================================================
// Entry Point
// =============================================================================

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let tariff = load_tariff(cli.tariff.as_deref())?;
    validate_tariff(&tariff).context("tariff configuration is invalid")?;
    debug!(slabs = tariff.slabs.len(), "Tariff loaded");

    match cli.command {
        Command::Bill { units } => {
            validate_units(units).context("invalid --units value")?;
            print_forward(units, &tariff);
        }
        Command::Units { bill } => {
            validate_bill_amount(bill).context("invalid --bill value")?;
            print_reverse(bill, &tariff);
        }
        Command::Split {
            input,
            late_fee,
            bkash,
        } => {
            let sheet = load_sheet(&input)?;
            let split = run_split(sheet, late_fee, bkash, &tariff)?;
            print_split(&split);
        }
    }

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=metermate=trace` - Trace for metermate crates only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,metermate=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Loading
// =============================================================================

fn load_tariff(path: Option<&std::path::Path>) -> Result<TariffConfig> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read tariff file {}", path.display()))?;
            let tariff = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse tariff file {}", path.display()))?;
            info!(path = %path.display(), "Tariff file loaded");
            Ok(tariff)
        }
        None => {
            debug!("No tariff file given, using built-in residential tariff");
            Ok(TariffConfig::default())
        }
    }
}

fn load_sheet(path: &std::path::Path) -> Result<ReadingSheet> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read reading sheet {}", path.display()))?;
    let sheet: ReadingSheet = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse reading sheet {}", path.display()))?;
    info!(
        path = %path.display(),
        meters = sheet.meters.len(),
        month = %sheet.month,
        "Reading sheet loaded"
    );
    Ok(sheet)
}

fn run_split(
    sheet: ReadingSheet,
    late_fee: bool,
    bkash: bool,
    tariff: &TariffConfig,
) -> Result<BillSplit> {
    validate_participant_count(sheet.meters.len())
        .context("reading sheet has no usable sub-meters")?;

    let main = sheet.main_meter.into_reading("Main");
    validate_reading(&main).context("main meter reading is invalid")?;

    let mut subs = Vec::with_capacity(sheet.meters.len());
    for (index, meter) in sheet.meters.into_iter().enumerate() {
        let reading = meter.into_reading(&format!("User {}", index + 1));
        validate_reading(&reading)
            .with_context(|| format!("sub-meter {} is invalid", index + 1))?;
        subs.push(reading);
    }

    let bill = BillConfig {
        month: sheet.month,
        date_generated: sheet.date_generated,
        include_late_fee: late_fee,
        include_bkash_fee: bkash,
    };

    Ok(split_bill(&main, &subs, &bill, tariff))
}

// =============================================================================
// Output
// =============================================================================

fn print_forward(units: f64, tariff: &TariffConfig) {
    let bill = compute_bill(units, tariff);

    println!("BILL FROM UNITS");
    println!("{}", "-".repeat(38));
    println!("{:<24}{:>13.2} kWh", "Total Units", units);
    println!("{:<24}{:>14.2}", "Energy Cost", bill.energy_cost);
    println!("{:<24}{:>14.2}", "Fixed Charges", tariff.fixed_charges());
    println!(
        "{:<24}{:>14.2}",
        format!("VAT ({:.0}%)", tariff.vat_rate * 100.0),
        bill.vat_amount
    );
    println!("{}", "-".repeat(38));
    println!("{:<24}{:>14}", "FINAL BILL", bill.total_payable.round());
}

fn print_reverse(bill: f64, tariff: &TariffConfig) {
    let units = compute_units_from_bill(bill, tariff);

    println!("UNITS FROM BILL");
    println!("{}", "-".repeat(38));
    println!("{:<24}{:>14.2}", "Total Bill", bill);
    println!("{:<24}{:>14.2}", "Energy Base", units.energy_cost);
    println!("{:<24}{:>14.2}", "VAT Component", units.vat_amount);
    println!("{}", "-".repeat(38));
    println!("{:<24}{:>13.2} kWh", "ESTIMATED UNITS", units.total_units);
}

fn print_split(split: &BillSplit) {
    println!("UTILITY TRANSACTION");
    println!("{}", "=".repeat(44));
    println!("{:<28}{:>16.2}", "Total Collection", split.total_collection);
    println!("{:<28}{:>16.2}", "Base Energy Bill", split.base_bill);
    println!("{}", "-".repeat(44));
    println!("{:<28}{:>12.1} kWh", "Main Total Energy", split.main_units);
    println!("{:<28}{:>12.1} kWh", "Total User Units", split.total_units);
    println!("{:<28}{:>12.1} kWh", "System Loss", split.system_loss);
    println!("{:<28}{:>16.2}", "Calculated Rate/Unit", split.calculated_rate);
    println!("{}", "-".repeat(44));
    println!("{:<28}{:>16.2}", "Total VAT Amt", split.vat_amount);
    println!("{:<28}{:>16.2}", "Fixed VAT", split.vat_on_fixed);
    println!("{:<28}{:>16.2}", "Late Fee Applied", split.late_fee);
    println!("{:<28}{:>16.2}", "bKash Charge", split.bkash_fee);
    println!("{:<28}{:>16.2}", "Fixed Cost / User", split.fixed_cost_per_user);
    println!("{}", "=".repeat(44));
    println!("USER ASSIGNMENTS");
    for user in &split.users {
        println!(
            "  {:<16}{:>8.1}u{:>16}",
            user.name,
            user.units_used,
            user.rounded_payable()
        );
    }
    println!("{}", "-".repeat(44));
    println!("{:<28}{:>16}", "USER TOTAL BILL", split.rounded_user_total());
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sheet() -> ReadingSheet {
        serde_json::from_str(
            r#"{
                "month": "January",
                "dateGenerated": "2025-01-05",
                "mainMeter": { "previous": 1000.0, "current": 1105.0 },
                "meters": [
                    { "name": "Flat A", "previous": 200.0, "current": 240.0 },
                    { "name": "", "previous": 300.0, "current": 335.0 },
                    { "previous": 500.0, "current": 525.0 }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_sheet_parses_and_splits() {
        let split = run_split(sample_sheet(), false, false, &TariffConfig::default()).unwrap();
        assert_eq!(split.users.len(), 3);
        assert_eq!(split.total_units, 100.0);
        assert_eq!(split.main_units, 105.0);
        assert_eq!(split.system_loss, 5.0);
    }

    #[test]
    fn test_unnamed_meters_get_fallback_names() {
        let split = run_split(sample_sheet(), false, false, &TariffConfig::default()).unwrap();
        assert_eq!(split.users[0].name, "Flat A");
        assert_eq!(split.users[1].name, "User 2");
        assert_eq!(split.users[2].name, "User 3");
    }

    #[test]
    fn test_empty_sheet_is_rejected() {
        let mut sheet = sample_sheet();
        sheet.meters.clear();
        assert!(run_split(sheet, false, false, &TariffConfig::default()).is_err());
    }

    #[test]
    fn test_fee_flags_reach_the_split() {
        let split = run_split(sample_sheet(), true, true, &TariffConfig::default()).unwrap();
        let tariff = TariffConfig::default();
        assert_eq!(split.late_fee, tariff.late_fee);
        assert_eq!(split.bkash_fee, tariff.bkash_charge);
    }
}
