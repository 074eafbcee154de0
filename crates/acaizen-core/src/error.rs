//! # Error Types
//!
//! Domain-specific error types for acaizen-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  acaizen-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule rejections                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  acaizen-db errors (separate crate)                                    │
//! │  └── DbError          - Database failures (+ wrapped CoreError)        │
//! │                                                                         │
//! │  acaizen-print errors (separate crate)                                 │
//! │  └── PrintError       - Print helper failures (logged, not surfaced)   │
//! │                                                                         │
//! │  Terminal API errors (in app)                                          │
//! │  └── ApiError         - What the UI sees (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → UI           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant is raised before any state change, so the caller can show
/// the message and let the cashier retry.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// The selected addon is attached to a different product.
    #[error("Addon {addon_id} does not belong to product {product_id}")]
    AddonNotForProduct { addon_id: i64, product_id: i64 },

    /// Checkout attempted with no lines in the cart.
    #[error("Cannot finalize sale: empty cart")]
    EmptyCart,

    /// Cash payment below the cart total (or with no amount typed at all).
    ///
    /// ## User Workflow
    /// ```text
    /// Total: R$35,80   Received: R$30,00
    ///      │
    ///      ▼
    /// InsufficientAmount { total: 3580, received: Some(3000) }
    ///      │
    ///      ▼
    /// Sale is NOT persisted, cart stays as it was
    /// ```
    #[error("Insufficient amount: received {} for a total of {total}", display_received(.received))]
    InsufficientAmount {
        total: Money,
        received: Option<Money>,
    },

    /// A finalization is already running for this terminal.
    #[error("A sale is already being finalized")]
    CheckoutInProgress,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Category deletion while products still reference it.
    #[error("Category {category_id} is used by {product_count} product(s) and cannot be deleted")]
    CategoryInUse {
        category_id: i64,
        product_count: i64,
    },

    /// Deleting the only remaining administrator.
    #[error("Cannot delete the only administrator account")]
    LastAdmin,

    /// Deleting the account that is currently logged in.
    #[error("Cannot delete the account that is currently logged in")]
    SelfDeletion,

    /// Login with an email that has no account.
    #[error("User not found: {0}")]
    UnknownUser(String),

    /// Login with the wrong password.
    #[error("Incorrect password")]
    WrongPassword,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

fn display_received(received: &Option<Money>) -> String {
    match received {
        Some(amount) => amount.to_string(),
        None => "nothing".to_string(),
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
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

    /// Invalid format (e.g., malformed price, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate email).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
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
    fn test_insufficient_amount_message() {
        let err = CoreError::InsufficientAmount {
            total: Money::from_cents(3580),
            received: Some(Money::from_cents(3000)),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient amount: received R$30,00 for a total of R$35,80"
        );

        let err = CoreError::InsufficientAmount {
            total: Money::from_cents(3580),
            received: None,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient amount: received nothing for a total of R$35,80"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");

        let err = ValidationError::Duplicate {
            field: "email".to_string(),
            value: "a@b.com".to_string(),
        };
        assert_eq!(err.to_string(), "email 'a@b.com' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("email").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
