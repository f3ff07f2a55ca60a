// =====================================================
// MySQL SINK CONNECTIONS
// =====================================================

use crate::db_types::MySqlConnectionConfig;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::ConnectOptions;
use sqlx::{MySql, Pool};

// --- Connection ---

/// Database from the override if non-empty, else from the connection.
pub fn effective_database(
    config: &MySqlConnectionConfig,
    database_override: Option<&str>,
) -> Option<String> {
    database_override
        .map(str::trim)
        .filter(|db| !db.is_empty())
        .or_else(|| {
            config
                .database
                .as_deref()
                .map(str::trim)
                .filter(|db| !db.is_empty())
        })
        .map(str::to_string)
}

pub fn build_connect_options(
    config: &MySqlConnectionConfig,
    database_override: Option<&str>,
) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.username);

    if let Some(pwd) = &config.password {
        options = options.password(pwd);
    }

    if let Some(db) = effective_database(config, database_override) {
        options = options.database(&db);
    }

    options.log_statements(log::LevelFilter::Debug)
}

pub fn describe_connect_error(err_msg: &str, host: &str, port: u16) -> String {
    if err_msg.contains("os error 111") {
        return format!(
            "Connection Refused ({})\n\nCheck if MySQL is running on {}:{}",
            err_msg, host, port
        );
    }
    if err_msg.contains("timed out") {
        return format!(
            "Connection Timed Out\n\nThe server at {}:{} did not respond within 10 seconds.",
            host, port
        );
    }
    format!("Failed to create pool: {}", err_msg)
}

pub async fn create_pool(
    config: &MySqlConnectionConfig,
    database_override: Option<&str>,
) -> Result<Pool<MySql>, String> {
    let options = build_connect_options(config, database_override);

    sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(4)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .idle_timeout(std::time::Duration::from_secs(300))
        .max_lifetime(std::time::Duration::from_secs(1800))
        .connect_with(options)
        .await
        .map_err(|e| describe_connect_error(&e.to_string(), &config.host, config.port))
}
