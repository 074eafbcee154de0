//! # Database State
//!
//! Wraps the `Database` connection for use in commands.
//!
//! The `Database` from `acaizen-db` holds a `SqlitePool`, which is
//! thread-safe, so commands query it concurrently without extra locking.

use acaizen_db::Database;

/// Wrapper around `Database` for the terminal state.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let products = db_state.inner().products().list_all().await?;
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
