//! APOD catalog repository
//!
//! One row per distinct cached image, keyed by SHA-256 content hash.
//! The hash is UNIQUE: re-fetching a date (or a different date that NASA
//! served the same asset for) reuses the existing row instead of storing
//! the bytes twice.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::sqlite_helpers::now_iso8601;

// ============================================================================
// Catalog Record
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApodRecord {
    pub id: i64,
    pub apod_date: String,
    pub title: String,
    pub explanation: Option<String>,
    pub media_type: String,
    pub source_url: String,
    pub file_path: String,
    pub content_hash: String,
    pub size_bytes: i64,
    pub created_at: String,
}

/// Input for inserting a newly cached picture
pub struct CreateApod {
    pub apod_date: String,
    pub title: String,
    pub explanation: Option<String>,
    pub media_type: String,
    pub source_url: String,
    pub file_path: String,
    pub content_hash: String,
    pub size_bytes: i64,
}

// ============================================================================
// Repository
// ============================================================================

pub struct ApodRepository {
    pool: SqlitePool,
}

type ApodRow = (
    i64,
    String,
    String,
    Option<String>,
    String,
    String,
    String,
    String,
    i64,
    String,
);

fn row_to_record(r: ApodRow) -> ApodRecord {
    ApodRecord {
        id: r.0,
        apod_date: r.1,
        title: r.2,
        explanation: r.3,
        media_type: r.4,
        source_url: r.5,
        file_path: r.6,
        content_hash: r.7,
        size_bytes: r.8,
        created_at: r.9,
    }
}

const SELECT_COLUMNS: &str = "id, apod_date, title, explanation, media_type, \
                              source_url, file_path, content_hash, size_bytes, created_at";

impl ApodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new catalog row and return it
    pub async fn insert(&self, apod: CreateApod) -> Result<ApodRecord> {
        let now = now_iso8601();

        let result = sqlx::query(
            r#"
            INSERT INTO apod_cache (
                apod_date, title, explanation, media_type,
                source_url, file_path, content_hash, size_bytes, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&apod.apod_date)
        .bind(&apod.title)
        .bind(&apod.explanation)
        .bind(&apod.media_type)
        .bind(&apod.source_url)
        .bind(&apod.file_path)
        .bind(&apod.content_hash)
        .bind(apod.size_bytes)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to read back inserted catalog row"))
    }

    /// Get a record by id
    pub async fn get(&self, id: i64) -> Result<Option<ApodRecord>> {
        let row = sqlx::query_as::<_, ApodRow>(&format!(
            "SELECT {} FROM apod_cache WHERE id = ?",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_record))
    }

    /// Look up a record by content hash (for deduplication)
    pub async fn find_by_hash(&self, content_hash: &str) -> Result<Option<ApodRecord>> {
        let row = sqlx::query_as::<_, ApodRow>(&format!(
            "SELECT {} FROM apod_cache WHERE content_hash = ?",
            SELECT_COLUMNS
        ))
        .bind(content_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_record))
    }

    /// Get catalog row count
    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM apod_cache")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0)
    }

    /// Get total storage used by cached images
    pub async fn total_storage_bytes(&self) -> Result<i64> {
        let row = sqlx::query_as::<_, (Option<i64>,)>("SELECT SUM(size_bytes) FROM apod_cache")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0.unwrap_or(0))
    }
}
