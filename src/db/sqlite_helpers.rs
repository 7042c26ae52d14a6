//! SQLite helper utilities for type conversion
//!
//! SQLite has no native timestamp type; the catalog stores ISO8601 TEXT.

use chrono::Utc;

/// Get current UTC timestamp as ISO8601 string for SQLite
#[inline]
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339()
}
