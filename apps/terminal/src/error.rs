//! # API Error Type
//!
//! Unified error type for terminal commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Açaízen POS                            │
//! │                                                                         │
//! │  UI action                   Rust Backend                               │
//! │  ─────────                   ────────────                               │
//! │                                                                         │
//! │  finalize_sale(...)                                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Rule rejected? ─── CoreError::EmptyCart ───────────┐            │  │
//! │  │         │                                           │            │  │
//! │  │         ▼                                           ▼            │  │
//! │  │  Store failed? ─── DbError::QueryFailed ── (logged) ApiError ──►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Printer failures never reach this type during a sale: the dispatcher  │
//! │  logs and swallows them. Only the printer test surfaces PRINTER_ERROR. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Errors are serializable so a UI can show `message` and branch on `code`.

use acaizen_core::CoreError;
use acaizen_db::DbError;
use acaizen_print::PrintError;
use serde::Serialize;
use tracing::{error, warn};

use crate::state::ConfigError;

/// API error returned from terminal commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "PAYMENT_ERROR",
///   "message": "Insufficient amount: received R$30,00 for a total of R$35,80"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed (missing field, duplicate email, bad price)
    ValidationError,

    /// Store read/write failed
    DatabaseError,

    /// Business rule rejected the operation (category in use, last admin)
    BusinessLogic,

    /// Internal error
    Internal,

    /// Cart operation failed (empty cart, too many lines)
    CartError,

    /// Payment rejected (insufficient cash)
    PaymentError,

    /// Login failed or no operator logged in
    Unauthorized,

    /// Print helper unreachable or refused the job
    PrinterError,

    /// Terminal configuration could not be loaded
    ConfigError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id.to_string()),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }
}

/// Converts database errors to API errors.
///
/// Store failures are logged with their detail and surfaced with a generic
/// message; the caller's in-memory state is left untouched.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Rule(core) => ApiError::from(core),
            DbError::InvalidData(reason) => ApiError::validation(reason),
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ProductNotFound(id) => return ApiError::not_found("Product", id),
            CoreError::EmptyCart
            | CoreError::CartTooLarge { .. }
            | CoreError::AddonNotForProduct { .. } => ErrorCode::CartError,
            CoreError::InsufficientAmount { .. } => ErrorCode::PaymentError,
            CoreError::QuantityTooLarge { .. } | CoreError::Validation(_) => {
                ErrorCode::ValidationError
            }
            CoreError::CheckoutInProgress
            | CoreError::CategoryInUse { .. }
            | CoreError::LastAdmin
            | CoreError::SelfDeletion => ErrorCode::BusinessLogic,
            CoreError::UnknownUser(_) | CoreError::WrongPassword => ErrorCode::Unauthorized,
        };
        let message = match err {
            CoreError::Validation(e) => e.to_string(),
            other => other.to_string(),
        };
        ApiError::new(code, message)
    }
}

/// Converts print helper errors to API errors (printer test only).
impl From<PrintError> for ApiError {
    fn from(err: PrintError) -> Self {
        warn!(error = %err, "Print helper request failed");
        ApiError::new(ErrorCode::PrinterError, err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        error!(error = %err, "Configuration error");
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use acaizen_core::{Money, ValidationError};

    #[test]
    fn test_serializes_code_in_screaming_snake_case() {
        let err = ApiError::new(ErrorCode::PaymentError, "nope");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "PAYMENT_ERROR");
        assert_eq!(json["message"], "nope");
    }

    #[test]
    fn test_query_failure_is_generic() {
        let err = ApiError::from(DbError::QueryFailed("disk I/O error at page 7".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_business_rules_keep_their_message() {
        let err = ApiError::from(DbError::Rule(CoreError::LastAdmin));
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(err.message, "Cannot delete the only administrator account");

        let err = ApiError::from(CoreError::InsufficientAmount {
            total: Money::from_cents(3580),
            received: Some(Money::from_cents(3000)),
        });
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert!(err.message.contains("R$35,80"));
    }

    #[test]
    fn test_validation_message_is_unwrapped() {
        let err = ApiError::from(CoreError::Validation(ValidationError::required("email")));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "email is required");
    }

    #[test]
    fn test_login_failures_are_unauthorized() {
        assert_eq!(ApiError::from(CoreError::WrongPassword).code, ErrorCode::Unauthorized);
        assert_eq!(
            ApiError::from(CoreError::UnknownUser("x@y.com".into())).code,
            ErrorCode::Unauthorized
        );
    }
}
