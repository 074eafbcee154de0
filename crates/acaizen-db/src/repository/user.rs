//! # User Repository
//!
//! Operator accounts and login.
//!
//! ## Known Weakness
//! Passwords are stored and compared in plaintext. The backup file format
//! carries them as-is, so hashing would need a new backup version.
//!
//! ## Account Rules
//! ```text
//! create  ──► validate form ──► email unique? ──► INSERT (uuid v4 id)
//! update  ──► validate form ──► email unique among others? ──► UPDATE
//!             (blank password keeps the stored one, the only admin stays admin)
//! delete  ──► not the logged-in account, not the only admin ──► DELETE
//! ```

use acaizen_core::validation::{check_role_change, check_user_deletion, validate_user_input};
use acaizen_core::{CoreError, UserAccount, UserInput, UserRole};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

const SELECT_USER: &str = "SELECT id, email, password, name, role, created_at FROM users";

/// Identity of the account created on first start.
pub const DEFAULT_ADMIN_ID: &str = "admin-1";
/// Login of the account created on first start.
pub const DEFAULT_ADMIN_EMAIL: &str = "pdvzen1@gmail.com";
const DEFAULT_ADMIN_PASSWORD: &str = "Zen2024";
const DEFAULT_ADMIN_NAME: &str = "Administrador";

/// Repository for user account operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Lists every account, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<UserAccount>> {
        let users = sqlx::query_as::<_, UserAccount>(&format!("{SELECT_USER} ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Gets an account by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<UserAccount>> {
        let user = sqlx::query_as::<_, UserAccount>(&format!("{SELECT_USER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Gets an account by email (case-insensitive, column collation).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<UserAccount>> {
        let user = sqlx::query_as::<_, UserAccount>(&format!("{SELECT_USER} WHERE email = ?1"))
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Checks an email/password pair.
    ///
    /// ## Errors
    /// * `CoreError::UnknownUser` - no account with that email
    /// * `CoreError::WrongPassword` - account exists, password differs
    pub async fn authenticate(&self, email: &str, password: &str) -> DbResult<UserAccount> {
        let Some(user) = self.get_by_email(email).await? else {
            warn!(email = %email.trim(), "Login with unknown email");
            return Err(CoreError::UnknownUser(email.trim().to_string()).into());
        };

        if user.password != password {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(CoreError::WrongPassword.into());
        }

        info!(user_id = %user.id, role = user.role.as_str(), "User logged in");
        Ok(user)
    }

    /// Creates an account with a generated id.
    pub async fn create(&self, input: &UserInput) -> DbResult<UserAccount> {
        validate_user_input(input, false)?;
        let email = input.email.trim();

        if self.get_by_email(email).await?.is_some() {
            return Err(DbError::duplicate("email", email));
        }

        let user = UserAccount {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password: input.password.clone(),
            name: input.name.trim().to_string(),
            role: input.role,
            created_at: Utc::now(),
        };
        self.insert(&user).await?;

        info!(user_id = %user.id, role = user.role.as_str(), "User created");
        Ok(user)
    }

    /// Updates an account. A blank password keeps the stored one.
    ///
    /// ## Errors
    /// * `CoreError::LastAdmin` - the update would demote the only admin
    pub async fn update(&self, id: &str, input: &UserInput) -> DbResult<UserAccount> {
        validate_user_input(input, true)?;
        let email = input.email.trim();

        let mut tx = self.pool.begin().await?;

        let mut user = sqlx::query_as::<_, UserAccount>(&format!("{SELECT_USER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))?;

        let other = sqlx::query_as::<_, UserAccount>(&format!("{SELECT_USER} WHERE email = ?1"))
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(other) = other {
            if other.id != user.id {
                return Err(DbError::duplicate("email", email));
            }
        }

        let admin_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?1")
            .bind(UserRole::Admin)
            .fetch_one(&mut *tx)
            .await?;
        check_role_change(&user, input.role, admin_count)?;

        user.email = email.to_string();
        user.name = input.name.trim().to_string();
        user.role = input.role;
        if !input.password.is_empty() {
            user.password = input.password.clone();
        }

        sqlx::query("UPDATE users SET email = ?1, password = ?2, name = ?3, role = ?4 WHERE id = ?5")
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.name)
            .bind(user.role)
            .bind(&user.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(user_id = %user.id, role = user.role.as_str(), "User updated");
        Ok(user)
    }

    /// Deletes an account.
    ///
    /// ## Errors
    /// * `CoreError::SelfDeletion` - `id` is the logged-in account
    /// * `CoreError::LastAdmin` - `id` is the only admin
    pub async fn delete(&self, id: &str, current_user_id: Option<&str>) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let target = sqlx::query_as::<_, UserAccount>(&format!("{SELECT_USER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))?;

        let admin_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?1")
            .bind(UserRole::Admin)
            .fetch_one(&mut *tx)
            .await?;
        check_user_deletion(&target, current_user_id, admin_count)?;

        sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Number of admin accounts.
    pub async fn count_admins(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?1")
            .bind(UserRole::Admin)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Creates the default admin when the store has no accounts at all.
    ///
    /// ## Returns
    /// `true` when the account was created.
    pub async fn ensure_default_admin(&self) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(false);
        }

        self.insert(&UserAccount {
            id: DEFAULT_ADMIN_ID.to_string(),
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
            name: DEFAULT_ADMIN_NAME.to_string(),
            role: UserRole::Admin,
            created_at: Utc::now(),
        })
        .await?;

        warn!(email = DEFAULT_ADMIN_EMAIL, "Default admin account created, change its password");
        Ok(true)
    }

    async fn insert(&self, user: &UserAccount) -> DbResult<()> {
        sqlx::query("INSERT INTO users (id, email, password, name, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.name)
            .bind(user.role)
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
