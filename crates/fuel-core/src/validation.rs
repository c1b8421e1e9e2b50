//! # Validation Module
//!
//! Checks on the typed primitives the ledger receives.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Presentation                                                  │
//! │  ├── Parses raw text into numbers and ids                              │
//! │  └── Offers only sensible choices (e.g. distinct transfer tanks)        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  └── Re-checks the primitives: finite, positive liters, non-empty ids   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ledger business rules (stock, capacity, activation, mode)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a volume in liters.
///
/// ## Rules
/// - Must be a finite number
/// - Must be strictly positive
///
/// ## Example
/// ```rust
/// use fuel_core::validation::validate_liters;
///
/// assert!(validate_liters(500.0).is_ok());
/// assert!(validate_liters(0.0).is_err());
/// assert!(validate_liters(f64::NAN).is_err());
/// ```
pub fn validate_liters(liters: f64) -> ValidationResult<()> {
    if !liters.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "liters".to_string(),
        });
    }

    if liters <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "liters".to_string(),
        });
    }

    Ok(())
}

/// Validates a cistern identifier.
///
/// ## Rules
/// - Must not be empty or whitespace
pub fn validate_cistern_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "cistern id".to_string(),
        });
    }

    Ok(())
}

/// Validates a history page size.
///
/// ## Rules
/// - Between 1 and 10 000 entries
pub fn validate_history_limit(limit: usize) -> ValidationResult<()> {
    const MAX_HISTORY_LIMIT: usize = 10_000;

    if limit == 0 || limit > MAX_HISTORY_LIMIT {
        return Err(ValidationError::OutOfRange {
            field: "history limit".to_string(),
            min: 1,
            max: MAX_HISTORY_LIMIT as i64,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_liters() {
        assert!(validate_liters(0.5).is_ok());
        assert!(validate_liters(25000.0).is_ok());

        assert!(validate_liters(0.0).is_err());
        assert!(validate_liters(-10.0).is_err());
        assert!(validate_liters(f64::INFINITY).is_err());
        assert!(matches!(
            validate_liters(f64::NAN),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_validate_cistern_id() {
        assert!(validate_cistern_id("AI-92 #1").is_ok());
        assert!(validate_cistern_id("").is_err());
        assert!(validate_cistern_id("   ").is_err());
    }

    #[test]
    fn test_validate_history_limit() {
        assert!(validate_history_limit(10).is_ok());
        assert!(validate_history_limit(0).is_err());
        assert!(validate_history_limit(10_001).is_err());
    }
}
