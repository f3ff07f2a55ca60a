// =====================================================
// SQLITE SINK CONNECTIONS
// =====================================================

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::ConnectOptions;
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub const MEMORY_PATH: &str = ":memory:";

// --- Connection ---

fn build_connect_options(db_path: &str) -> Result<SqliteConnectOptions, String> {
    let options = if db_path == MEMORY_PATH {
        SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| format!("Invalid SQLite memory options: {}", e))?
    } else {
        SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
    };

    Ok(options.log_statements(log::LevelFilter::Debug))
}

pub async fn create_pool(db_path: &str) -> Result<Pool<Sqlite>, String> {
    let db_path = db_path.trim();
    if db_path.is_empty() {
        return Err("Database file path is required".to_string());
    }

    let options = build_connect_options(db_path)?;

    // every in-memory connection is its own database, so keep exactly one
    let pool_options = if db_path == MEMORY_PATH {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .idle_timeout(std::time::Duration::from_secs(300))
            .max_lifetime(std::time::Duration::from_secs(1800))
    };

    pool_options
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect_with(options)
        .await
        .map_err(|e| format!("Failed to create SQLite pool: {}", e))
}

#[cfg(test)]
mod tests;
