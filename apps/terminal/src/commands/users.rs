//! # User Commands
//!
//! Login, logout and account management.
//!
//! ```text
//! login(email, password)
//!      │
//!      ├─ unknown email ──► UNAUTHORIZED "User not found: ..."
//!      ├─ wrong password ─► UNAUTHORIZED "Incorrect password"
//!      └─ ok ─────────────► session.sign_in(user), checkout reset
//! ```
//!
//! Account management is for admins. Passwords are compared and stored as
//! plain text, and never sent back in a [`UserView`].

use acaizen_core::{UserAccount, UserInput, UserRole};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{DbState, SessionState};

/// A user account without its password.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for UserView {
    fn from(user: UserAccount) -> Self {
        UserView {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Logs a user in on this terminal.
pub async fn login(
    db: &DbState,
    session: &SessionState,
    email: &str,
    password: &str,
) -> Result<UserView, ApiError> {
    debug!(email = %email, "login command");
    let user = db.inner().users().authenticate(email.trim(), password).await?;
    session.sign_in(user.clone());
    Ok(UserView::from(user))
}

/// Logs out (also used to switch user). The cart is kept.
pub fn logout(session: &SessionState) {
    if let Some(user) = session.current_user() {
        info!(user_id = %user.id, "User logged out");
    }
    session.sign_out();
}

pub fn current_user(session: &SessionState) -> Option<UserView> {
    session.current_user().map(UserView::from)
}

fn require_admin(session: &SessionState) -> Result<UserAccount, ApiError> {
    match session.current_user() {
        Some(user) if user.is_admin() => Ok(user),
        Some(_) => Err(ApiError::unauthorized("Only administrators can manage users")),
        None => Err(ApiError::unauthorized("Not logged in")),
    }
}

pub async fn list_users(db: &DbState, session: &SessionState) -> Result<Vec<UserView>, ApiError> {
    require_admin(session)?;
    let users = db.inner().users().list_all().await?;
    Ok(users.into_iter().map(UserView::from).collect())
}

pub async fn create_user(
    db: &DbState,
    session: &SessionState,
    input: UserInput,
) -> Result<UserView, ApiError> {
    debug!(email = %input.email, "create_user command");
    require_admin(session)?;
    let user = db.inner().users().create(&input).await?;
    info!(user_id = %user.id, role = user.role.as_str(), "User created");
    Ok(UserView::from(user))
}

/// Updates an account. A blank password keeps the current one.
pub async fn update_user(
    db: &DbState,
    session: &SessionState,
    id: &str,
    input: UserInput,
) -> Result<UserView, ApiError> {
    debug!(user_id = %id, "update_user command");
    require_admin(session)?;
    let user = db.inner().users().update(id, &input).await?;

    // Keep the session's copy (name shown on sales) in step
    session.refresh_user(user.clone());
    Ok(UserView::from(user))
}

/// Deletes an account: never the logged-in one, never the last admin.
pub async fn delete_user(db: &DbState, session: &SessionState, id: &str) -> Result<(), ApiError> {
    debug!(user_id = %id, "delete_user command");
    let current = require_admin(session)?;
    db.inner().users().delete(id, Some(&current.id)).await?;
    info!(user_id = %id, "User deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use acaizen_db::repository::user::DEFAULT_ADMIN_EMAIL;

    use crate::error::ErrorCode;
    use crate::test_support::test_context;

    fn cashier_input(email: &str) -> UserInput {
        UserInput {
            email: email.to_string(),
            password: "caixa123".to_string(),
            name: "Caixa".to_string(),
            role: UserRole::Cashier,
        }
    }

    #[tokio::test]
    async fn test_login_errors_and_success() {
        let ctx = test_context().await;
        logout(&ctx.session);
        assert!(current_user(&ctx.session).is_none());

        let err = login(&ctx.db, &ctx.session, "ninguem@acaizen.com", "x").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert!(err.message.contains("not found"));

        let err = login(&ctx.db, &ctx.session, DEFAULT_ADMIN_EMAIL, "errada").await.unwrap_err();
        assert_eq!(err.message, "Incorrect password");
        assert!(current_user(&ctx.session).is_none());

        let user = login(&ctx.db, &ctx.session, DEFAULT_ADMIN_EMAIL, "Zen2024").await.unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(current_user(&ctx.session), Some(user));
    }

    #[tokio::test]
    async fn test_user_view_hides_password() {
        let ctx = test_context().await;
        let view = create_user(&ctx.db, &ctx.session, cashier_input("caixa@acaizen.com"))
            .await
            .unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "cashier");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let ctx = test_context().await;
        create_user(&ctx.db, &ctx.session, cashier_input("caixa@acaizen.com"))
            .await
            .unwrap();
        let err = create_user(&ctx.db, &ctx.session, cashier_input("caixa@acaizen.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let ctx = test_context().await;
        let admin_id = ctx.session.current_user_id().unwrap();

        // Logged-in account
        let err = delete_user(&ctx.db, &ctx.session, &admin_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        // A cashier goes away, exactly that record
        let cashier = create_user(&ctx.db, &ctx.session, cashier_input("caixa@acaizen.com"))
            .await
            .unwrap();
        delete_user(&ctx.db, &ctx.session, &cashier.id).await.unwrap();
        let remaining = list_users(&ctx.db, &ctx.session).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, admin_id);
    }

    #[tokio::test]
    async fn test_cashier_cannot_manage_users() {
        let ctx = test_context().await;
        create_user(&ctx.db, &ctx.session, cashier_input("caixa@acaizen.com"))
            .await
            .unwrap();
        login(&ctx.db, &ctx.session, "caixa@acaizen.com", "caixa123").await.unwrap();

        let err = list_users(&ctx.db, &ctx.session).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_only_admin_cannot_demote_itself() {
        let ctx = test_context().await;
        let admin_id = ctx.session.current_user_id().unwrap();
        let input = UserInput {
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password: String::new(),
            name: "Administrador".to_string(),
            role: UserRole::Cashier,
        };

        let err = update_user(&ctx.db, &ctx.session, &admin_id, input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert!(ctx.session.current_user().unwrap().is_admin());
        assert_eq!(ctx.db.inner().users().count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_refreshes_session_name() {
        let ctx = test_context().await;
        let admin_id = ctx.session.current_user_id().unwrap();
        let input = UserInput {
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password: String::new(),
            name: "Gerente".to_string(),
            role: UserRole::Admin,
        };
        update_user(&ctx.db, &ctx.session, &admin_id, input).await.unwrap();

        assert_eq!(ctx.session.operator().unwrap().name, "Gerente");
        // Blank password kept the old one
        login(&ctx.db, &ctx.session, DEFAULT_ADMIN_EMAIL, "Zen2024").await.unwrap();
    }
}
