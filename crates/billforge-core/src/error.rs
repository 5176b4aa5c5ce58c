//! # Error Types
//!
//! Domain-specific error types for billforge-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  billforge-core errors (this file)                              │
//! │  ├── CoreError        - Business rule violations                │
//! │  └── ValidationError  - Input validation failures               │
//! │                                                                 │
//! │  billforge-db errors (separate crate)                           │
//! │  ├── DbError          - Persistence failures                    │
//! │  └── BillingError     - CoreError ∪ DbError at the API boundary │
//! │                                                                 │
//! │  Flow: ValidationError → CoreError → BillingError → caller      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product identity, counts)
//! 3. Errors are enum variants, never String
//! 4. No domain error ever leaves stock or the sequencer mutated

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant carries enough structured detail for a caller to
/// render an actionable message (which product, how many were
/// requested, how many exist).
#[derive(Debug, Error)]
pub enum CoreError {
    /// An invoice was requested with no line items.
    #[error("invoice must contain at least one line item")]
    EmptyInvoice,

    /// A line item carried a non-positive or out-of-range quantity.
    #[error("invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// The requested product key does not resolve to a catalog entry.
    #[error("product not found: {full_name}")]
    UnknownProduct { full_name: String },

    /// Requested more sellable units than the catalog holds.
    ///
    /// Rejection is all-or-nothing: the first shortfall rejects the
    /// whole invoice and nothing is decremented.
    #[error("insufficient stock for {full_name}: available {available}, requested {requested}")]
    InsufficientStock {
        full_name: String,
        available: i64,
        requested: i64,
    },

    /// Requested to restore more units than are marked damaged.
    #[error(
        "insufficient damaged stock for {full_name}: available {available}, requested {requested}"
    )]
    InsufficientDamagedStock {
        full_name: String,
        available: i64,
        requested: i64,
    },

    /// A product with the same (name, weight) key already exists.
    #[error("product already exists: {full_name}")]
    DuplicateProduct { full_name: String },

    /// Concurrent writers oversubscribed the same stock row and the
    /// one automatic retry did not resolve it.
    #[error("concurrent stock conflict on {full_name}, please retry")]
    Conflict { full_name: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur before any business logic runs and are always safe to
/// retry after correcting the input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-digit phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            full_name: "Rice (5kg)".to_string(),
            available: 2,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for Rice (5kg): available 2, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer name".to_string(),
        };
        assert_eq!(err.to_string(), "customer name is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
