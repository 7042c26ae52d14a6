//! Application configuration management

use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// NASA API key (DEMO_KEY works, with a much lower quota)
    pub api_key: String,

    /// APOD API endpoint
    pub api_base_url: String,

    /// Image cache directory
    pub cache_dir: PathBuf,

    /// SQLite catalog path
    pub database_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let cache_dir = env::var("CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_cache_dir());

        let database_path = env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| cache_dir.join("skylight.db"));

        Self {
            api_key: env::var("NASA_API_KEY").unwrap_or_else(|_| "DEMO_KEY".to_string()),

            api_base_url: env::var("APOD_API_URL")
                .unwrap_or_else(|_| "https://api.nasa.gov/planetary/apod".to_string()),

            cache_dir,

            database_path,
        }
    }
}

/// Platform-local data directory, or ./data when the platform offers none
fn default_cache_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("./data"))
        .join("skylight")
        .join("images")
}
