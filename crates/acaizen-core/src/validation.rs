//! # Validation Module
//!
//! Input validation and referential-integrity rules for Açaízen POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Terminal command (Rust)                                       │
//! │  ├── Type validation (deserialization)                                  │
//! │  └── THIS MODULE: form field rules                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Rule checks (THIS MODULE, fed with counts from the store)     │
//! │  ├── Category in use → reject deletion                                  │
//! │  ├── Last admin / logged-in account → reject deletion                   │
//! │  ├── Last admin → reject demotion to cashier                            │
//! │  └── Raised BEFORE any mutation is attempted                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  └── UNIQUE(email)                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{AddonInput, CategoryInput, ProductInput, UserAccount, UserInput, UserRole};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 1000;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a required display name (product, category, addon, user).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use acaizen_core::validation::validate_name;
///
/// assert!(validate_name("name", "Açaí 300ml").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free addons exist).
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must be at most [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an email address (shape only: `local@domain.tld`).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

/// Validates the product form: name and category are required, the price
/// cannot be negative.
pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_price_cents("price", input.price_cents)?;

    if input.category_id <= 0 {
        return Err(ValidationError::required("category"));
    }

    if input.description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

pub fn validate_category_input(input: &CategoryInput) -> ValidationResult<()> {
    validate_name("name", &input.name)
}

pub fn validate_addon_input(input: &AddonInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_price_cents("price", input.price_cents)?;
    if input.product_id <= 0 {
        return Err(ValidationError::required("product"));
    }
    Ok(())
}

/// Validates the user form.
///
/// The password is required on create. On update a blank password means
/// "keep the current one".
pub fn validate_user_input(input: &UserInput, is_update: bool) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_email(&input.email)?;

    if !is_update && input.password.trim().is_empty() {
        return Err(ValidationError::required("password"));
    }

    Ok(())
}

// =============================================================================
// Referential Integrity Rules
// =============================================================================

/// Rejects deleting a category that still has products.
///
/// ## Example
/// ```rust
/// use acaizen_core::validation::check_category_deletion;
///
/// assert!(check_category_deletion(1, 0).is_ok());
/// assert!(check_category_deletion(1, 3).is_err());
/// ```
pub fn check_category_deletion(category_id: i64, product_count: i64) -> CoreResult<()> {
    if product_count > 0 {
        return Err(CoreError::CategoryInUse {
            category_id,
            product_count,
        });
    }
    Ok(())
}

/// Rejects deleting the logged-in account or the only admin.
///
/// ## Arguments
/// * `target` - The account about to be deleted
/// * `current_user_id` - The account logged in on this terminal, if any
/// * `admin_count` - Number of admin accounts currently stored
pub fn check_user_deletion(
    target: &UserAccount,
    current_user_id: Option<&str>,
    admin_count: i64,
) -> CoreResult<()> {
    if current_user_id == Some(target.id.as_str()) {
        return Err(CoreError::SelfDeletion);
    }

    if target.is_admin() && admin_count <= 1 {
        return Err(CoreError::LastAdmin);
    }

    Ok(())
}

/// Rejects demoting the only admin.
///
/// ## Arguments
/// * `target` - The account as currently stored
/// * `new_role` - The role the update would give it
/// * `admin_count` - Number of admin accounts currently stored
pub fn check_role_change(target: &UserAccount, new_role: UserRole, admin_count: i64) -> CoreResult<()> {
    if target.is_admin() && new_role != UserRole::Admin && admin_count <= 1 {
        return Err(CoreError::LastAdmin);
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserRole;
    use chrono::Utc;

    fn user(id: &str, role: UserRole) -> UserAccount {
        UserAccount {
            id: id.to_string(),
            email: format!("{}@acaizen.com", id),
            password: "secret".to_string(),
            name: id.to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Açaí 500ml").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"a".repeat(201)).is_err());
        // Character count, not bytes
        assert!(validate_name("name", &"í".repeat(200)).is_ok());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("pdvzen1@gmail.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a b@c.com").is_err());
    }

    #[test]
    fn test_product_input_requires_category() {
        let mut input = ProductInput {
            name: "Açaí 300ml".to_string(),
            price_cents: 1590,
            description: String::new(),
            image: None,
            category_id: 0,
            stock: 10,
            has_addons: true,
        };
        assert!(validate_product_input(&input).is_err());

        input.category_id = 1;
        assert!(validate_product_input(&input).is_ok());

        input.price_cents = -1;
        assert!(validate_product_input(&input).is_err());
    }

    #[test]
    fn test_user_input_password_rules() {
        let input = UserInput {
            email: "caixa@acaizen.com".to_string(),
            password: String::new(),
            name: "Caixa".to_string(),
            role: UserRole::Cashier,
        };
        assert!(validate_user_input(&input, false).is_err());
        assert!(validate_user_input(&input, true).is_ok());
    }

    #[test]
    fn test_category_in_use() {
        let err = check_category_deletion(2, 1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::CategoryInUse {
                category_id: 2,
                product_count: 1
            }
        ));
    }

    #[test]
    fn test_user_deletion_rules() {
        let admin = user("admin-1", UserRole::Admin);
        let second_admin = user("admin-2", UserRole::Admin);
        let cashier = user("caixa", UserRole::Cashier);

        // Self deletion always fails
        assert!(matches!(
            check_user_deletion(&cashier, Some("caixa"), 1),
            Err(CoreError::SelfDeletion)
        ));

        // Sole admin cannot be deleted
        assert!(matches!(
            check_user_deletion(&admin, Some("caixa"), 1),
            Err(CoreError::LastAdmin)
        ));

        // A second admin can
        assert!(check_user_deletion(&second_admin, Some("admin-1"), 2).is_ok());

        // Cashiers can be deleted even with a single admin
        assert!(check_user_deletion(&cashier, Some("admin-1"), 1).is_ok());
        assert!(check_user_deletion(&cashier, None, 1).is_ok());
    }

    #[test]
    fn test_role_change_keeps_an_admin() {
        let admin = user("admin-1", UserRole::Admin);
        let cashier = user("caixa", UserRole::Cashier);

        assert!(matches!(
            check_role_change(&admin, UserRole::Cashier, 1),
            Err(CoreError::LastAdmin)
        ));
        assert!(check_role_change(&admin, UserRole::Admin, 1).is_ok());
        assert!(check_role_change(&admin, UserRole::Cashier, 2).is_ok());
        assert!(check_role_change(&cashier, UserRole::Admin, 1).is_ok());
    }
}
