//! External service integrations

pub mod apod;
pub mod cache;
pub mod rate_limiter;

pub use apod::ApodClient;
pub use cache::ImageCache;
