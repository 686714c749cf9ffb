//! Database connection pool management

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::{sanitize_url, DatabaseError, DatabaseOperation, Error, Result};

const CREATE_ADDRESSES: &str = "CREATE TABLE IF NOT EXISTS Addresses (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    Street TEXT NOT NULL,
    HouseNumber TEXT NOT NULL,
    Postcode TEXT NOT NULL,
    City TEXT NOT NULL,
    Country TEXT NOT NULL
)";

/// Create a SQLite connection pool with retry logic
///
/// Retries connection attempts based on the configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    create_pool_with_retries(config, config.max_retries).await
}

/// Create the `Addresses` table when it does not exist yet
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_ADDRESSES)
        .execute(pool)
        .await
        .map_err(|e| {
            DatabaseError::from(e)
                .with_operation(DatabaseOperation::Schema)
                .with_context("Addresses")
        })?;
    tracing::debug!("Addresses table ready");
    Ok(())
}

/// Create a SQLite connection pool with configurable retries
///
/// Uses exponential backoff strategy for retries. Errors that cannot go away
/// on their own, such as a malformed URL, are returned at once.
async fn create_pool_with_retries(config: &DatabaseConfig, max_retries: u32) -> Result<SqlitePool> {
    let mut attempt = 0;
    let base_delay = Duration::from_secs(config.retry_delay_secs);

    loop {
        match try_create_pool(config).await {
            Ok(pool) => {
                if attempt > 0 {
                    tracing::info!(
                        "Database connection established after {} attempt(s)",
                        attempt + 1
                    );
                } else {
                    tracing::info!(
                        url = %sanitize_url(&config.url),
                        "Database connection pool created: max={}, min={}",
                        config.max_connections,
                        config.min_connections
                    );
                }
                return Ok(pool);
            }
            Err(Error::Database(e)) if !e.is_retriable() => {
                tracing::error!("Database configuration rejected: {}", e);
                return Err(Error::Database(e));
            }
            Err(e) => {
                attempt += 1;

                if attempt > max_retries {
                    tracing::error!(
                        "Failed to connect to database after {} attempts: {}",
                        max_retries + 1,
                        e
                    );
                    return Err(e);
                }

                let delay_multiplier = 2_u32.pow(attempt.saturating_sub(1));
                let delay = base_delay * delay_multiplier;

                tracing::warn!(
                    "Database connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Attempt to create a database pool (single try)
async fn try_create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let url_safe = sanitize_url(&config.url);

    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| DatabaseError::from(e).with_context(url_safe.clone()))?
        .create_if_missing(config.create_if_missing);

    // Every connection to an in-memory database opens a fresh, empty one,
    // so the pool must hold exactly one connection for its whole lifetime.
    let pool_options = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
    };

    let pool = pool_options
        .acquire_timeout(config.connection_timeout())
        .connect_with(options)
        .await
        .map_err(|e| {
            let category = categorize_db_error(&e);
            DatabaseError::connection_failed(format!(
                "Failed to open database at '{}': {}\n\n\
                Troubleshooting:\n\
                1. Check the URL format: sqlite://path/to/file.db or sqlite::memory:\n\
                2. Verify the directory exists and is writable\n\
                3. Set create_if_missing = true to create a new database file\n\n\
                Original error: {}",
                url_safe, category, e
            ))
            .with_context(url_safe.clone())
        })?;

    Ok(pool)
}

/// Categorize database error for better user guidance
fn categorize_db_error(err: &sqlx::Error) -> &'static str {
    use sqlx::Error;
    match err {
        Error::Configuration(_) => "Configuration error",
        Error::Database(_) => "Database error - file may be locked or corrupt",
        Error::Io(_) => "I/O error - check file path and permissions",
        Error::PoolTimedOut => "Connection pool timeout - database may be locked",
        Error::PoolClosed => "Connection pool closed",
        Error::WorkerCrashed => "Database worker crashed",
        _ => "Connection error",
    }
}
