//! SQLite persistence layer for the churn alert service.
//!
//! This crate stores alerts, their follow-up call logs, per-business severity
//! thresholds and monthly merchant snapshots using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{alert, Database, NewAlert, Severity, AlertType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:churn_alert.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Record an alert
//!     let created = alert::create_alert(
//!         db.pool(),
//!         NewAlert {
//!             severity: Severity::High,
//!             merchant_id: "M1".to_string(),
//!             alert_type: AlertType::GtvDrop,
//!             assigned_to_user: None,
//!             summary: None,
//!             follow_up_reason: None,
//!             comment: None,
//!         },
//!     )
//!     .await?;
//!     println!("{}", created.id);
//!
//!     Ok(())
//! }
//! ```

pub mod alert;
pub mod call_log;
pub mod error;
pub mod filter;
pub mod models;
pub mod severity_threshold;
pub mod timestamp;
pub mod user_snapshot;
pub mod validation;

pub use alert::AlertSearch;
pub use error::{DatabaseError, Result};
pub use filter::{AlertFilter, CallLogFilter, DateRange, PageInfo, Pagination, SeverityStats};
pub use models::{
    Alert, AlertComment, AlertStatus, AlertType, BusinessCategorySeverity, CallLog,
    CallLogChanges, CallStatus, NewAlert, NewCallLog, NewUserSnapshot, Severity, StatusChange,
    ThresholdType, UserSnapshot,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    pub const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    ///
    /// An in-memory URL (`sqlite::memory:`) gives every connection its own
    /// database, so use a pool size of 1 there.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Begin a transaction that reads before it writes.
///
/// Takes the write lock up front; other writers wait on the busy timeout.
pub(crate) async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_support::test_db;

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = test_db().await;
        db.migrate().await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alerts")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let db = test_db().await;
        let result = sqlx::query(
            "INSERT INTO call_logs (id, alert_id, called_by, call_status, created_at) VALUES ('a', 'missing', 'x', 'Bounced', '2025-01-01T00:00:00.000000Z')",
        )
        .execute(db.pool())
        .await;
        assert!(result.is_err());
    }
}
