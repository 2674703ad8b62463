//! Database primitives: connection settings and the key-value storage slots
//! the attendance app persists into.

mod store;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use thiserror::Error;
use tracing::debug;

pub use store::{KeyValueStore, MemoryStore, SlotStore};

/// Shared connection pool alias.
pub type DbPool = DatabaseConnection;

const DEFAULT_URL: &str = "sqlite://attendance.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: DbErr,
    },
    #[error("storage query failed: {0}")]
    Query(#[from] DbErr),
    #[error("in-memory store lock poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Environment-driven connection settings.
#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl DatabaseSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Reads `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`, falling back to a
    /// local SQLite file.
    pub fn from_env() -> Self {
        let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        Self {
            url,
            max_connections,
        }
    }

    /// A private SQLite database living only as long as its single connection.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(settings.max_connections)
        .sqlx_logging(false);
    debug!(url = %settings.url, "connecting to storage database");
    Database::connect(options)
        .await
        .map_err(|source| DbError::Connect {
            url: settings.url.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_settings_pin_a_single_connection() {
        let settings = DatabaseSettings::in_memory();
        assert_eq!(settings.url, "sqlite::memory:");
        assert_eq!(settings.max_connections, 1);
    }

    #[test]
    fn explicit_url_keeps_default_pool_size() {
        let settings = DatabaseSettings::new("postgres://localhost/attendance");
        assert_eq!(settings.url, "postgres://localhost/attendance");
        assert_eq!(settings.max_connections, DEFAULT_MAX_CONNECTIONS);
    }
}
