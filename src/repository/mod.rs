//! Repository layer for catalog persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking,
//! running SQLite through diesel-async's SyncConnectionWrapper.

mod job;
pub mod models;
pub mod pool;

pub use job::{CatalogStats, JobRepository};
pub use pool::{AsyncSqlitePool, DieselError};

use chrono::{DateTime, Utc};

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_valid() {
        let dt = parse_datetime("2025-07-01T12:00:00+00:00");
        assert_eq!(dt.to_rfc3339(), "2025-07-01T12:00:00+00:00");
    }

    #[test]
    fn test_parse_datetime_invalid_defaults_to_epoch() {
        assert_eq!(parse_datetime("last tuesday"), DateTime::UNIX_EPOCH);
    }
}
