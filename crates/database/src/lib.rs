//! SQLite persistence layer for the helpdesk.
//!
//! This crate provides async database operations for users, technician
//! profiles and support tickets using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, models::{Role, User, UserStatus}, user};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:helpdesk.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Create a user
//!     let user = User {
//!         id: "c27fb365-0c84-4cf2-8555-814bb065e448".to_string(),
//!         name: "Bob".to_string(),
//!         phone: "+15551234567".to_string(),
//!         email: None,
//!         role: Role::Customer,
//!         status: UserStatus::Approved,
//!         created_at: "2026-10-16 09:00:00".to_string(),
//!     };
//!     user::create_user(db.pool(), &user).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod models;
pub mod technician;
pub mod ticket;
pub mod user;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{
    GeoPoint, NewTicket, Role, Technician, Ticket, TicketStatus, UpdateOutcome, User, UserStatus,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// let db = database::Database::connect("sqlite:data/helpdesk.db?mode=rwc").await?;
    ///
    /// // In-memory databases are per connection, so keep the pool at one.
    /// let db = database::Database::connect_with_pool_size("sqlite::memory:", 1).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
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
