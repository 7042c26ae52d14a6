//! Skylight - daily astronomy picture cache and wallpaper setter
//!
//! Fetches NASA's Astronomy Picture of the Day for a target date, stores it
//! in a local content-addressed image cache backed by a SQLite catalog, and
//! hands the cached file to the desktop as its background.

mod cli;
mod config;
mod db;
mod platform;
mod services;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::CliOptions;
use crate::config::Config;
use crate::db::Database;
use crate::services::{ApodClient, ImageCache};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let options = CliOptions::from_args()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skylight=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let target_date = options.resolve_target_date(Local::now().date_naive())?;
    tracing::info!(date = %target_date, "Resolved APOD date");

    // The catalog lives inside the cache directory by default
    if let Some(parent) = config.database_path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let db = Database::connect(&config.database_path).await?;
    db.init_schema().await?;
    tracing::info!(path = %config.database_path.display(), "Catalog opened");

    let cache = ImageCache::new(config.cache_dir.clone(), db.clone());
    cache.ensure_dir().await?;

    let client = ApodClient::new(config.api_key.clone(), config.api_base_url.clone());
    let entry = client.get_picture(target_date).await?;
    tracing::info!(title = %entry.title, media_type = %entry.media_type, "APOD record retrieved");

    let source_url = entry
        .best_image_url()
        .map(str::to_string)
        .context("APOD record has no displayable image URL")?;

    let stored = cache.store(&entry, &source_url).await?;

    let repo = db.apod();
    let record = repo
        .get(stored.id)
        .await?
        .context("Cached record disappeared from the catalog")?;

    let images = repo.count().await?;
    let total_bytes = repo.total_storage_bytes().await?;
    tracing::info!(images, total_bytes, "Cache totals");

    if options.no_wallpaper {
        tracing::info!(file = %record.file_path, "Skipping wallpaper handoff (--no-wallpaper)");
    } else {
        platform::set_desktop_background(Path::new(&record.file_path)).await?;
        tracing::info!(date = %target_date, file = %record.file_path, "Desktop background set");
    }

    Ok(())
}
