//! Content-addressed image cache
//!
//! Downloads the day's asset, hashes it, and either reuses the existing
//! catalog row (same bytes already cached under any date) or writes the
//! file and inserts a new row. The SHA-256 hash is the identity of a
//! cached image; file names only exist for human browsing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use url::Url;

use crate::db::{ApodRecord, CreateApod, Database};

use super::apod::ApodEntry;

/// Image cache service: one directory of image files plus the catalog
pub struct ImageCache {
    dir: PathBuf,
    http_client: reqwest::Client,
    db: Database,
}

impl ImageCache {
    pub fn new(dir: PathBuf, db: Database) -> Self {
        Self {
            dir,
            http_client: reqwest::Client::new(),
            db,
        }
    }

    /// Create the image cache directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<()> {
        if self.dir.is_dir() {
            debug!(dir = %self.dir.display(), "Image cache directory already exists");
        } else {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .with_context(|| {
                    format!("Failed to create cache directory {}", self.dir.display())
                })?;
            info!(dir = %self.dir.display(), "Image cache directory created");
        }
        Ok(())
    }

    /// Download the asset for a picture record and store it in the cache
    ///
    /// Returns the catalog record, existing or new.
    pub async fn store(&self, entry: &ApodEntry, source_url: &str) -> Result<ApodRecord> {
        info!(url = %source_url, "Downloading image");

        let response = self
            .http_client
            .get(source_url)
            .send()
            .await
            .context("Failed to download image")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download image: {}", response.status());
        }

        let bytes = response.bytes().await.context("Failed to read image bytes")?;

        self.store_bytes(entry, source_url, &bytes).await
    }

    /// Hash, dedup-check, and persist asset bytes already in hand
    pub async fn store_bytes(
        &self,
        entry: &ApodEntry,
        source_url: &str,
        bytes: &[u8],
    ) -> Result<ApodRecord> {
        if bytes.is_empty() {
            anyhow::bail!("Downloaded image is empty");
        }

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = format!("{:x}", hasher.finalize());
        debug!(sha256 = %hash, size = bytes.len(), "Hashed image content");

        let repo = self.db.apod();

        if let Some(existing) = repo.find_by_hash(&hash).await? {
            info!(
                file = %existing.file_path,
                "Image already cached, reusing catalog entry"
            );
            return Ok(existing);
        }

        let file_path = self.dir.join(cache_file_name(&entry.title, source_url, bytes, &hash));
        debug!(path = %file_path.display(), "Writing image file");

        tokio::fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write image file {}", file_path.display()))?;

        let record = repo
            .insert(CreateApod {
                apod_date: entry.date.format("%Y-%m-%d").to_string(),
                title: entry.title.clone(),
                explanation: entry.explanation.clone(),
                media_type: entry.media_type.clone(),
                source_url: source_url.to_string(),
                file_path: file_path.display().to_string(),
                content_hash: hash,
                size_bytes: bytes.len() as i64,
            })
            .await?;

        info!(id = record.id, file = %record.file_path, "Image added to cache");
        Ok(record)
    }
}

/// Derive a cache file name: sanitized title, short hash, detected extension
fn cache_file_name(title: &str, source_url: &str, bytes: &[u8], hash: &str) -> String {
    let stem = sanitize_filename::sanitize(title.trim())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let stem = if stem.is_empty() { "apod".to_string() } else { stem };

    let short_hash = &hash[..8.min(hash.len())];

    format!(
        "{}-{}.{}",
        stem,
        short_hash,
        image_extension(bytes, source_url)
    )
}

/// Detect the image extension from magic numbers, then the URL path, then jpg
fn image_extension(bytes: &[u8], source_url: &str) -> String {
    if let Some(kind) = infer::get(bytes)
        && kind.matcher_type() == infer::MatcherType::Image
    {
        return kind.extension().to_string();
    }

    if let Ok(url) = Url::parse(source_url)
        && let Some(ext) = Path::new(url.path()).extension().and_then(|e| e.to_str())
        && ext.len() <= 4
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return ext.to_lowercase();
    }

    "jpg".to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

    #[test]
    fn test_extension_from_magic_numbers() {
        assert_eq!(image_extension(PNG_MAGIC, "https://example.com/x.jpg"), "png");
        assert_eq!(image_extension(JPEG_MAGIC, "https://example.com/x.png"), "jpg");
    }

    #[test]
    fn test_extension_from_url_path() {
        assert_eq!(
            image_extension(b"not an image", "https://example.com/path/pic.GIF?size=large"),
            "gif"
        );
    }

    #[test]
    fn test_extension_default() {
        assert_eq!(image_extension(b"not an image", "https://example.com/no-extension"), "jpg");
        assert_eq!(image_extension(b"", "::not a url::"), "jpg");
    }

    #[test]
    fn test_cache_file_name_sanitizes_title() {
        let name = cache_file_name(
            "  The Eagle Nebula: Pillars / of Creation  ",
            "https://example.com/pillars.png",
            b"not an image",
            "deadbeefcafe0123",
        );
        assert_eq!(name, "The_Eagle_Nebula_Pillars_of_Creation-deadbeef.png");
    }

    #[test]
    fn test_cache_file_name_empty_title() {
        let name = cache_file_name("///", "https://example.com/x.jpg", b"", "0123456789abcdef");
        assert_eq!(name, "apod-01234567.jpg");
    }

    // ========================================================================
    // store_bytes: dedup flow against an in-memory catalog
    // ========================================================================

    use chrono::NaiveDate;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_cache(dir: &Path) -> ImageCache {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let db = Database::new(pool);
        db.init_schema().await.unwrap();
        ImageCache::new(dir.to_path_buf(), db)
    }

    fn test_entry() -> ApodEntry {
        ApodEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            title: "Test Nebula".to_string(),
            explanation: Some("A nebula.".to_string()),
            media_type: "image".to_string(),
            url: Some("https://example.com/nebula.png".to_string()),
            hdurl: None,
            thumbnail_url: None,
            copyright: None,
        }
    }

    #[tokio::test]
    async fn test_store_bytes_writes_file_and_catalogs_it() {
        let dir = tempfile::tempdir().unwrap();
        let cache = test_cache(dir.path()).await;

        let record = cache
            .store_bytes(&test_entry(), "https://example.com/nebula.png", PNG_MAGIC)
            .await
            .unwrap();

        assert_eq!(record.title, "Test Nebula");
        assert_eq!(record.apod_date, "2024-03-01");
        assert_eq!(record.size_bytes, PNG_MAGIC.len() as i64);
        assert!(record.file_path.ends_with(".png"));
        assert!(Path::new(&record.file_path).is_file());
        assert_eq!(
            std::fs::read(&record.file_path).unwrap(),
            PNG_MAGIC.to_vec()
        );
    }

    #[tokio::test]
    async fn test_store_bytes_dedups_on_content_hash() {
        let dir = tempfile::tempdir().unwrap();
        let cache = test_cache(dir.path()).await;

        let first = cache
            .store_bytes(&test_entry(), "https://example.com/nebula.png", PNG_MAGIC)
            .await
            .unwrap();

        // Same bytes under a different date and title reuse the first row
        let mut repeat = test_entry();
        repeat.date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        repeat.title = "Repeat Nebula".to_string();

        let second = cache
            .store_bytes(&repeat, "https://example.com/other.png", PNG_MAGIC)
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.title, "Test Nebula");
        assert_eq!(cache.db.apod().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_store_bytes_distinct_content_gets_distinct_rows() {
        let dir = tempfile::tempdir().unwrap();
        let cache = test_cache(dir.path()).await;

        cache
            .store_bytes(&test_entry(), "https://example.com/nebula.png", PNG_MAGIC)
            .await
            .unwrap();
        cache
            .store_bytes(&test_entry(), "https://example.com/nebula.jpg", JPEG_MAGIC)
            .await
            .unwrap();

        let repo = cache.db.apod();
        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(
            repo.total_storage_bytes().await.unwrap(),
            (PNG_MAGIC.len() + JPEG_MAGIC.len()) as i64
        );
    }

    #[tokio::test]
    async fn test_store_bytes_rejects_empty_download() {
        let dir = tempfile::tempdir().unwrap();
        let cache = test_cache(dir.path()).await;

        let result = cache
            .store_bytes(&test_entry(), "https://example.com/nebula.png", b"")
            .await;
        assert!(result.is_err());
        assert_eq!(cache.db.apod().count().await.unwrap(), 0);
    }
}
