//! # Error Types
//!
//! Domain-specific error types for metermate-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  metermate-core errors (this file)                                     │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  CLI errors (apps/cli)                                                 │
//! │  └── anyhow::Error    - file / JSON / argument problems with context   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → anyhow context → user             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, offending value)
//! 3. Errors are enum variants, never String
//! 4. The calculation engine itself never errors - these types belong to the
//!    opt-in validation layer that callers run *before* the engine

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// The tariff engine is infallible on well-formed numbers, so in practice
/// every `CoreError` originates from validation. The wrapper exists so app
/// layers have a single error type to translate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a tariff file or reading sheet doesn't meet requirements.
/// Used for early validation before any calculation runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be a finite number (no NaN / infinity).
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: String, value: f64 },

    /// Value must not be negative.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: String, value: f64 },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Slab limits must be strictly increasing.
    #[error("slab {index} has limit {limit}, which does not exceed the previous limit {previous}")]
    SlabOrder {
        index: usize,
        limit: f64,
        previous: f64,
    },

    /// Too many sub-meters for one bill.
    #[error("at most {max} sub-meters are supported, got {count}")]
    TooManyMeters { count: usize, max: usize },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
