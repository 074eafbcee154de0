//! # Açaízen Terminal Library
//!
//! Session state and one command function per UI action of the POS
//! terminal. The `acaizen` binary (main.rs) drives the back-office side of
//! the same commands from the command line.
//!
//! ## Module Organization
//! ```text
//! acaizen_terminal/
//! ├── lib.rs          ◄─── You are here (AppContext & startup)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── TerminalConfig (TOML + ACAIZEN_* environment)
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── cart.rs     ◄─── Cart state management
//! │   ├── session.rs  ◄─── Logged-in user + checkout state
//! │   └── printer.rs  ◄─── Print helper client, swapped on settings save
//! ├── commands/       ◄─── cart, sale, receipt, catalog, users, reports, settings
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State Management
//! One state type per concern; each command takes only the ones it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            AppContext                                   │
//! │                                                                         │
//! │  ┌────────────┐ ┌────────────┐ ┌──────────────┐ ┌──────────────┐       │
//! │  │  DbState   │ │ CartState  │ │ SessionState │ │ PrinterState │       │
//! │  │            │ │            │ │              │ │              │       │
//! │  │ • pool     │ │ • lines    │ │ • user       │ │ • dispatcher │       │
//! │  │ • repos    │ │ • totals   │ │ • checkout   │ │ • timeout    │       │
//! │  └────────────┘ └────────────┘ └──────────────┘ └──────────────┘       │
//! │                                                                         │
//! │  + TerminalConfig (read only after startup)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use acaizen_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use error::ApiError;
use state::{CartState, DbState, LogFormat, LoggingSettings, PrinterState, SessionState, TerminalConfig};

/// Everything one terminal session works with.
#[derive(Clone)]
pub struct AppContext {
    pub db: DbState,
    pub cart: CartState,
    pub session: SessionState,
    pub printer: PrinterState,
    pub config: TerminalConfig,
}

impl AppContext {
    /// Opens the configured database and builds the session state.
    ///
    /// ## Startup Sequence
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────────┐
    /// │  1. Create the data directory when missing                              │
    /// │  2. Connect to SQLite (WAL mode), run pending migrations                │
    /// │  3. Read the store settings, writing the defaults on first start        │
    /// │  4. Create the default admin when there are no accounts                 │
    /// │  5. Point the printer client at the configured print helper             │
    /// └─────────────────────────────────────────────────────────────────────────┘
    /// ```
    pub async fn bootstrap(config: TerminalConfig) -> Result<Self, ApiError> {
        let path = config.database.path.clone();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ApiError::internal(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }

        info!(path = %path.display(), "Opening database");
        let db = Database::new(DbConfig::new(path).max_connections(config.database.max_connections))
            .await?;
        Self::from_database(db, config).await
    }

    /// Builds the session state around an already open database.
    pub async fn from_database(db: Database, config: TerminalConfig) -> Result<Self, ApiError> {
        let store = db.store_config().get_or_init().await?;
        db.users().ensure_default_admin().await?;

        let printer = PrinterState::new(&store, config.printer.request_timeout())?;
        info!(store = %store.store_name, printer = %store.printer_base_url(), "Terminal ready");

        Ok(AppContext {
            db: DbState::new(db),
            cart: CartState::new(),
            session: SessionState::new(),
            printer,
            config,
        })
    }
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Safe to call more than once:
/// later calls are ignored.
pub fn init_tracing(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", settings.level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match settings.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[cfg(test)]
pub(crate) mod test_support {
    use acaizen_core::Product;
    use acaizen_db::repository::user::DEFAULT_ADMIN_ID;
    use acaizen_db::seed::seed_sample_catalog;
    use acaizen_db::{Database, DbConfig};

    use crate::state::TerminalConfig;
    use crate::AppContext;

    /// In-memory store with the sample catalog, the default admin logged in.
    pub async fn test_context() -> AppContext {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_sample_catalog(&db).await.unwrap();

        let ctx = AppContext::from_database(db, TerminalConfig::default()).await.unwrap();
        let admin = ctx
            .db
            .inner()
            .users()
            .get_by_id(DEFAULT_ADMIN_ID)
            .await
            .unwrap()
            .unwrap();
        ctx.session.sign_in(admin);
        ctx
    }

    pub async fn product_named(ctx: &AppContext, name: &str) -> Product {
        ctx.db
            .inner()
            .products()
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.name == name)
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_creates_store_and_admin() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TerminalConfig::default();
        config.database.path = dir.path().join("dados").join("acaizen.db");

        let ctx = AppContext::bootstrap(config).await.unwrap();
        assert!(dir.path().join("dados").join("acaizen.db").exists());

        let users = ctx.db.inner().users().list_all().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].is_admin());
        assert!(ctx.session.current_user().is_none());
        assert_eq!(
            ctx.printer.dispatcher().await.base_url(),
            "http://localhost:3333"
        );
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(&LoggingSettings::default());
        init_tracing(&LoggingSettings::default());
    }
}
