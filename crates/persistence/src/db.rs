//! Database connection pool management.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// URL that selects the in-process stores instead of PostgreSQL.
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    /// True when the configured URL asks for in-memory stores.
    pub fn is_memory(&self) -> bool {
        self.url.trim() == MEMORY_DATABASE_URL
    }
}

/// Creates a PostgreSQL connection pool with the given configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_memory() {
        let mut config = DatabaseConfig {
            url: "memory://".to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 5,
            idle_timeout_secs: 600,
        };
        assert!(config.is_memory());
        config.url = "postgres://localhost/marketplace".to_string();
        assert!(!config.is_memory());
    }
}
