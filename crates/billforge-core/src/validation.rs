//! # Validation Module
//!
//! Input validation for catalog entries, customers and invoice
//! requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Validation Layers                           │
//! │                                                                 │
//! │  Layer 1: THIS MODULE (pure, pre-database)                      │
//! │  ├── required fields, lengths, ranges, formats                  │
//! │  └── fails BEFORE any invoice number is allocated or any        │
//! │      stock row is touched                                       │
//! │           │                                                     │
//! │           ▼                                                     │
//! │  Layer 2: Database (SQLite)                                     │
//! │  ├── NOT NULL / UNIQUE constraints                              │
//! │  ├── CHECK (quantity >= 0) as the last line of defense          │
//! │  └── Foreign key constraints                                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use billforge_core::validation::{validate_product_name, validate_quantity};
//!
//! validate_product_name("Rice").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::{CoreError, ValidationError};
use crate::types::{Customer, InvoiceRequestLine};
use crate::{MAX_INVOICE_LINES, MAX_LINE_QUANTITY, MAX_PRICE_PAISE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
///
/// ## Example
/// ```rust
/// use billforge_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Rice").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "product name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "product name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a weight/size variant label, e.g. "5kg" or "500ml".
///
/// ## Rules
/// - May be absent (single-variant products)
/// - When present, at most 50 characters
pub fn validate_weight(weight: Option<&str>) -> ValidationResult<()> {
    if let Some(weight) = weight {
        if weight.trim().len() > 50 {
            return Err(ValidationError::TooLong {
                field: "weight".to_string(),
                max: 50,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Customer Validators
// =============================================================================

/// Validates customer details captured on an invoice.
///
/// ## Rules
/// - Name is required, at most 200 characters
/// - Phone is optional; when present, digits only, 4-15 characters
/// - Address is optional, at most 500 characters
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    let name = customer.name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "customer name".to_string(),
            max: 200,
        });
    }

    if let Some(phone) = customer.phone.as_deref() {
        let phone = phone.trim();
        if !phone.is_empty() {
            if !phone.chars().all(|c| c.is_ascii_digit()) {
                return Err(ValidationError::InvalidFormat {
                    field: "customer phone".to_string(),
                    reason: "must contain only digits".to_string(),
                });
            }
            if phone.len() < 4 || phone.len() > 15 {
                return Err(ValidationError::OutOfRange {
                    field: "customer phone".to_string(),
                    min: 4,
                    max: 15,
                });
            }
        }
    }

    if let Some(address) = customer.address.as_deref() {
        if address.trim().len() > 500 {
            return Err(ValidationError::TooLong {
                field: "customer address".to_string(),
                max: 500,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (9999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in paise.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
/// - Must not exceed MAX_PRICE_PAISE, so line totals
///   (`price × quantity`) stay inside i64 range
///
/// ## Example
/// ```rust
/// use billforge_core::validation::validate_price_paise;
///
/// assert!(validate_price_paise(50_000).is_ok());
/// assert!(validate_price_paise(0).is_ok());
/// assert!(validate_price_paise(-100).is_err());
/// ```
pub fn validate_price_paise(paise: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_PAISE).contains(&paise) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_PAISE,
        });
    }

    Ok(())
}

/// Validates a GST rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_gst_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "gst_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Invoice Request Validation
// =============================================================================

/// Validates a full invoice request before any side effect happens.
///
/// This is the gate in front of number allocation and stock
/// reservation: a request that fails here burns no invoice number
/// and touches no stock row.
///
/// ## Checks
/// - At least one line, at most MAX_INVOICE_LINES
/// - Customer details pass [`validate_customer`]
/// - Every line quantity passes [`validate_quantity`]
pub fn validate_invoice_request(
    customer: &Customer,
    lines: &[InvoiceRequestLine],
) -> Result<(), CoreError> {
    if lines.is_empty() {
        return Err(CoreError::EmptyInvoice);
    }

    if lines.len() > MAX_INVOICE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "invoice lines".to_string(),
            min: 1,
            max: MAX_INVOICE_LINES as i64,
        }
        .into());
    }

    validate_customer(customer)?;

    for line in lines {
        if validate_quantity(line.quantity).is_err() {
            return Err(CoreError::InvalidQuantity {
                quantity: line.quantity,
            });
        }
        validate_product_name(&line.key.name)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductKey;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Rice").is_ok());
        assert!(validate_product_name("  Basmati Rice  ").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_customer() {
        assert!(validate_customer(&Customer::named("Asha")).is_ok());

        let full = Customer {
            name: "Asha".to_string(),
            phone: Some("9876543210".to_string()),
            address: Some("12 Market Road".to_string()),
        };
        assert!(validate_customer(&full).is_ok());

        assert!(validate_customer(&Customer::named("")).is_err());

        let bad_phone = Customer {
            name: "Asha".to_string(),
            phone: Some("98-76".to_string()),
            address: None,
        };
        assert!(validate_customer(&bad_phone).is_err());

        let short_phone = Customer {
            name: "Asha".to_string(),
            phone: Some("91".to_string()),
            address: None,
        };
        assert!(validate_customer(&short_phone).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(9_999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(10_000).is_err());
    }

    #[test]
    fn test_validate_price_paise() {
        assert!(validate_price_paise(0).is_ok());
        assert!(validate_price_paise(50_000).is_ok());
        assert!(validate_price_paise(MAX_PRICE_PAISE).is_ok());
        assert!(validate_price_paise(-1).is_err());
        assert!(validate_price_paise(MAX_PRICE_PAISE + 1).is_err());
    }

    /// The largest accepted price times the largest accepted
    /// quantity must not overflow a line total.
    #[test]
    fn test_accepted_bounds_cannot_overflow_line_totals() {
        let line_total = MAX_PRICE_PAISE.checked_mul(crate::MAX_LINE_QUANTITY);
        assert!(line_total.is_some());

        // A full invoice of such lines still fits
        let invoice_total =
            line_total.unwrap().checked_mul(crate::MAX_INVOICE_LINES as i64);
        assert!(invoice_total.is_some());
    }

    #[test]
    fn test_validate_gst_rate_bps() {
        assert!(validate_gst_rate_bps(0).is_ok());
        assert!(validate_gst_rate_bps(1800).is_ok());
        assert!(validate_gst_rate_bps(10_000).is_ok());
        assert!(validate_gst_rate_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_invoice_request_rejects_empty() {
        let err = validate_invoice_request(&Customer::named("Asha"), &[]).unwrap_err();
        assert!(matches!(err, CoreError::EmptyInvoice));
    }

    #[test]
    fn test_validate_invoice_request_rejects_bad_quantity() {
        let lines = vec![InvoiceRequestLine::new(
            ProductKey::new("Rice", Some("5kg")),
            0,
        )];
        let err = validate_invoice_request(&Customer::named("Asha"), &lines).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { quantity: 0 }));
    }

    #[test]
    fn test_validate_invoice_request_accepts_valid() {
        let lines = vec![
            InvoiceRequestLine::new(ProductKey::new("Rice", Some("5kg")), 3),
            InvoiceRequestLine::new(ProductKey::new("Sugar", None), 1),
        ];
        assert!(validate_invoice_request(&Customer::named("Asha"), &lines).is_ok());
    }
}
