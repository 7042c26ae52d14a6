//! Database connection and catalog schema management

pub mod apod;
pub mod sqlite_helpers;

use std::path::Path;

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, info};

pub use apod::{ApodRecord, ApodRepository, CreateApod};

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the SQLite catalog at the given path
    pub async fn connect(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Get the APOD catalog repository
    pub fn apod(&self) -> ApodRepository {
        ApodRepository::new(self.pool.clone())
    }

    /// Ensure the catalog table and its hash index exist
    pub async fn init_schema(&self) -> Result<()> {
        if table_exists(&self.pool, "apod_cache").await? {
            debug!("Catalog table already exists");
            return Ok(());
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS apod_cache (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                apod_date TEXT NOT NULL,
                title TEXT NOT NULL,
                explanation TEXT,
                media_type TEXT NOT NULL,
                source_url TEXT NOT NULL,
                file_path TEXT NOT NULL,
                content_hash TEXT NOT NULL UNIQUE,
                size_bytes INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_apod_cache_content_hash \
             ON apod_cache (content_hash)",
        )
        .execute(&self.pool)
        .await?;

        info!("Created catalog table: apod_cache");
        Ok(())
    }
}

/// Check if a table exists in the database
async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool, sqlx::Error> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
            .bind(table_name)
            .fetch_optional(pool)
            .await?;

    Ok(result.is_some())
}
