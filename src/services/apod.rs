//! NASA APOD (Astronomy Picture of the Day) API client
//!
//! APOD serves one picture per calendar day, starting 1995-06-16.
//! Base URL: https://api.nasa.gov/planetary/apod
//!
//! Rate limiting: the public api.nasa.gov gateway allows 1000 requests per
//! hour per key (30/hour on DEMO_KEY). This client uses rate limiting and
//! retry logic to handle transient failures gracefully.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::rate_limiter::{RateLimitedClient, ResponseExt, RetryConfig, retry_async};

/// APOD API client with rate limiting and retry logic
pub struct ApodClient {
    client: Arc<RateLimitedClient>,
    base_url: String,
    api_key: String,
    retry_config: RetryConfig,
}

/// One day's picture record as returned by the APOD API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApodEntry {
    pub date: NaiveDate,
    pub title: String,
    pub explanation: Option<String>,
    /// "image" or "video"
    pub media_type: String,
    /// Standard-resolution asset URL
    pub url: Option<String>,
    /// High-resolution asset URL (images only)
    pub hdurl: Option<String>,
    /// Video thumbnail URL (present when requested with thumbs=true)
    pub thumbnail_url: Option<String>,
    pub copyright: Option<String>,
}

impl ApodClient {
    /// Create a new APOD client with the given API key
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Arc::new(RateLimitedClient::for_apod()),
            base_url,
            api_key,
            retry_config: RetryConfig::default(),
        }
    }

    /// Fetch the picture record for a single date
    pub async fn get_picture(&self, date: NaiveDate) -> Result<ApodEntry> {
        info!(date = %date, "Fetching APOD record from NASA");

        let client = self.client.clone();
        let url = self.base_url.clone();
        let api_key = self.api_key.clone();
        let date_param = date.format("%Y-%m-%d").to_string();
        let retry_config = self.retry_config.clone();

        let entry = retry_async(
            || {
                let url = url.clone();
                let client = client.clone();
                let key = api_key.clone();
                let date_param = date_param.clone();
                async move {
                    let query: Vec<(&str, String)> = vec![
                        ("api_key", key),
                        ("date", date_param),
                        ("thumbs", "true".to_string()),
                    ];

                    let response = client.get_with_query(&url, &query).await?;

                    if response.is_transient_error() {
                        warn!(status = %response.status(), "APOD API transient error, will retry");
                        anyhow::bail!("APOD request failed with status {}", response.status());
                    }

                    if response.status().as_u16() == 403 {
                        anyhow::bail!("NASA API key was rejected (403)");
                    }

                    if !response.status().is_success() {
                        let status = response.status();
                        anyhow::bail!(
                            "APOD request failed with status {}: {}",
                            status,
                            error_message(response).await
                        );
                    }

                    let entry: ApodEntry = response
                        .json()
                        .await
                        .context("Failed to parse APOD response")?;

                    Ok(entry)
                }
            },
            &retry_config,
            "apod_get_picture",
        )
        .await?;

        debug!(title = %entry.title, media_type = %entry.media_type, "APOD record received");
        Ok(entry)
    }
}

/// Pull the "msg" field out of an APOD error body, if there is one
async fn error_message(response: reqwest::Response) -> String {
    match response.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("msg")
            .or_else(|| body.pointer("/error/message"))
            .and_then(|m| m.as_str())
            .unwrap_or("no error detail")
            .to_string(),
        Err(_) => "no error detail".to_string(),
    }
}

impl ApodEntry {
    /// The URL worth caching for this record.
    ///
    /// Images prefer the high-resolution asset; videos only have a
    /// thumbnail to offer. Returns None when the record carries nothing
    /// displayable.
    pub fn best_image_url(&self) -> Option<&str> {
        if self.media_type == "image" {
            self.hdurl.as_deref().or(self.url.as_deref())
        } else {
            self.thumbnail_url.as_deref()
        }
    }
}
