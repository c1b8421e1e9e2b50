//! # Error Types
//!
//! Domain-specific error types for fuel-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fuel-core errors (this file)                                          │
//! │  ├── LedgerError      - Business rule failures of station operations   │
//! │  ├── ValidationError  - Primitive input validation failures            │
//! │  └── StoreError       - Persistence gateway failures                   │
//! │                                                                         │
//! │  fuel-db errors (separate crate)                                       │
//! │  └── DbError          - SQLite failures, converted into StoreError     │
//! │                                                                         │
//! │  Flow: DbError → StoreError → LedgerError → ServiceResult → caller     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every [`LedgerError`] belongs to exactly one [`FailureKind`]. None of them
//! is fatal: the caller can always retry with corrected input.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::types::FuelType;

// =============================================================================
// Failure Kind
// =============================================================================

/// Closed classification of every failure a ledger operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Column or tank id does not exist.
    NotFound,
    /// Column or tank is disabled.
    InactiveResource,
    /// Insufficient stock, or the target would overflow.
    Capacity,
    /// Fuel type not offered by a column, or transfer endpoints differ.
    TypeMismatch,
    /// Sale attempted while emergency mode is active.
    ModeViolation,
    /// Enable attempted below the tank's safety floor.
    LevelViolation,
    /// Malformed primitive input (non-positive liters, self-transfer).
    InvalidInput,
    /// The persistence gateway failed; nothing was applied.
    Infrastructure,
}

// =============================================================================
// Ledger Error
// =============================================================================

/// Station ledger errors.
///
/// All checks run before any mutation, so when one of these is returned the
/// station state is exactly what it was before the call.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Sales are locked while emergency mode is active.
    #[error("Emergency mode is active, dispensing is locked")]
    EmergencyActive,

    #[error("Column {0} does not exist")]
    ColumnNotFound(u32),

    #[error("Column {0} is inactive")]
    ColumnInactive(u32),

    /// The column does not route the requested fuel type to any tank.
    #[error("Fuel {fuel_type} is not available at column {column_id}")]
    FuelNotOffered { column_id: u32, fuel_type: FuelType },

    #[error("Cistern {0} not found")]
    CisternNotFound(String),

    #[error("Cistern {0} is disabled")]
    CisternInactive(String),

    /// Not enough fuel in the tank.
    ///
    /// ## When This Occurs
    /// - A sale asks for more than the routed tank holds
    /// - A transfer asks for more than the source tank holds
    #[error("Insufficient fuel in cistern {cistern_id}. Available: {available:.1} L")]
    InsufficientFuel {
        cistern_id: String,
        available: f64,
        requested: f64,
    },

    /// The tank cannot take the requested volume.
    ///
    /// ## When This Occurs
    /// - A refuel would push the tank over `max_volume`
    /// - A transfer would overflow the target tank
    #[error("Cistern {cistern_id} would overflow. Free capacity: {headroom:.1} L")]
    Overflow {
        cistern_id: String,
        headroom: f64,
        requested: f64,
    },

    /// Transfers never convert fuel type.
    #[error("Transfer is only possible between cisterns of the same fuel type ({source_fuel} -> {target_fuel})")]
    FuelTypeMismatch {
        source_fuel: FuelType,
        target_fuel: FuelType,
    },

    #[error("Cannot transfer fuel from cistern {0} into itself")]
    SelfTransfer(String),

    /// Enabling a tank below its safety floor.
    #[error("Cannot enable cistern {cistern_id}. Fuel level is below the minimum ({min_level} L)")]
    BelowMinLevel { cistern_id: String, min_level: f64 },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Persistence failed before the change was applied.
    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl LedgerError {
    /// Returns the failure class of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            LedgerError::EmergencyActive => FailureKind::ModeViolation,
            LedgerError::ColumnNotFound(_) | LedgerError::CisternNotFound(_) => {
                FailureKind::NotFound
            }
            LedgerError::ColumnInactive(_) | LedgerError::CisternInactive(_) => {
                FailureKind::InactiveResource
            }
            LedgerError::FuelNotOffered { .. } | LedgerError::FuelTypeMismatch { .. } => {
                FailureKind::TypeMismatch
            }
            LedgerError::InsufficientFuel { .. } | LedgerError::Overflow { .. } => {
                FailureKind::Capacity
            }
            LedgerError::BelowMinLevel { .. } => FailureKind::LevelViolation,
            LedgerError::SelfTransfer(_) | LedgerError::Validation(_) => FailureKind::InvalidInput,
            LedgerError::Storage(_) => FailureKind::Infrastructure,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// The presentation layer validates raw text first; the core re-checks the
/// typed primitives it receives.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format (e.g., a malformed price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Store Error
// =============================================================================

/// Persistence gateway errors, as seen by the core.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the write.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Persisted data could not be decoded.
    #[error("corrupt record in {collection}: {reason}")]
    Corrupt { collection: String, reason: String },

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Convenience type alias for gateway results.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LedgerError::InsufficientFuel {
            cistern_id: "AI-92 #1".to_string(),
            available: 3000.0,
            requested: 5000.0,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient fuel in cistern AI-92 #1. Available: 3000.0 L"
        );

        let err = LedgerError::Overflow {
            cistern_id: "DT #1".to_string(),
            headroom: 9400.0,
            requested: 10000.0,
        };
        assert_eq!(
            err.to_string(),
            "Cistern DT #1 would overflow. Free capacity: 9400.0 L"
        );
    }

    #[test]
    fn test_kinds_are_mapped() {
        assert_eq!(LedgerError::EmergencyActive.kind(), FailureKind::ModeViolation);
        assert_eq!(LedgerError::ColumnNotFound(9).kind(), FailureKind::NotFound);
        assert_eq!(
            LedgerError::CisternInactive("x".into()).kind(),
            FailureKind::InactiveResource
        );
        assert_eq!(
            LedgerError::BelowMinLevel {
                cistern_id: "x".into(),
                min_level: 1000.0
            }
            .kind(),
            FailureKind::LevelViolation
        );
        assert_eq!(
            LedgerError::SelfTransfer("x".into()).kind(),
            FailureKind::InvalidInput
        );
    }

    #[test]
    fn test_conversions() {
        let err: LedgerError = ValidationError::MustBePositive {
            field: "liters".to_string(),
        }
        .into();
        assert_eq!(err.kind(), FailureKind::InvalidInput);

        let err: LedgerError = StoreError::Unavailable("disk full".to_string()).into();
        assert_eq!(err.kind(), FailureKind::Infrastructure);
        assert_eq!(err.to_string(), "Storage failure: backend unavailable: disk full");
    }
}
