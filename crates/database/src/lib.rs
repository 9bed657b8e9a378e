//! SQLite persistence layer for Learning Copilot.
//!
//! This crate provides async database operations for users, learning paths,
//! module progress and chat history using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{progress, user, Database, ProgressStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and create the schema
//!     let db = Database::connect("sqlite:learning_copilot.db?mode=rwc").await?;
//!     db.init_schema().await?;
//!
//!     // Creating the same user twice returns the same ID
//!     let user_id = user::create_user(db.pool(), "ada").await?;
//!     assert_eq!(user_id, user::create_user(db.pool(), "ada").await?);
//!
//!     Ok(())
//! }
//! ```

pub mod chat_history;
pub mod error;
pub mod learning_path;
pub mod models;
pub mod progress;
pub mod user;

pub use error::{DatabaseError, Result};
pub use models::{ChatMessage, LearningPath, ModuleProgress, ProgressStatus, User};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS learning_paths (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        source_type TEXT NOT NULL,
        source_content TEXT,
        curriculum_json TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (user_id) REFERENCES users (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS progress (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        path_id INTEGER NOT NULL,
        module_id TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'not_started'
            CHECK (status IN ('not_started', 'in_progress', 'completed')),
        projects_completed TEXT,
        notes TEXT,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (user_id, path_id, module_id),
        FOREIGN KEY (user_id) REFERENCES users (id),
        FOREIGN KEY (path_id) REFERENCES learning_paths (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chat_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        path_id INTEGER NOT NULL,
        role TEXT NOT NULL,
        content TEXT NOT NULL,
        timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (user_id) REFERENCES users (id),
        FOREIGN KEY (path_id) REFERENCES learning_paths (id)
    )
    "#,
];

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size. Usage is local and effectively single-user.
    const DEFAULT_POOL_SIZE: u32 = 4;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:learning_copilot.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing; keep a single connection)
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

    /// Create all tables if they do not exist yet.
    ///
    /// Safe to call on every startup.
    pub async fn init_schema(&self) -> Result<()> {
        tracing::info!("Initializing database schema...");

        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        tracing::info!("Schema ready");
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
