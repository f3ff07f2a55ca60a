// =====================================================
// COMMON DATABASE TYPES AND STRUCTURES
// =====================================================

use serde::{Deserialize, Serialize};

// --- Database Type Enum ---
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    BigQuery,
    MySQL,
    SQLite,
}

impl DatabaseType {
    pub fn label(&self) -> &'static str {
        match self {
            DatabaseType::BigQuery => "bigquery",
            DatabaseType::MySQL => "mysql",
            DatabaseType::SQLite => "sqlite",
        }
    }
}

fn default_api_base_url() -> String {
    crate::bigquery::DEFAULT_API_BASE_URL.to_string()
}

fn default_mysql_host() -> String {
    "127.0.0.1".to_string()
}

fn default_mysql_port() -> u16 {
    3306
}

// --- Connection Configuration ---
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConnectionConfig {
    BigQuery(BigQueryConnectionConfig),
    MySQL(MySqlConnectionConfig),
    SQLite(SqliteConnectionConfig),
}

impl ConnectionConfig {
    pub fn db_type(&self) -> DatabaseType {
        match self {
            ConnectionConfig::BigQuery(_) => DatabaseType::BigQuery,
            ConnectionConfig::MySQL(_) => DatabaseType::MySQL,
            ConnectionConfig::SQLite(_) => DatabaseType::SQLite,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BigQueryConnectionConfig {
    pub project_id: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Environment variable holding an OAuth bearer token
    #[serde(default)]
    pub access_token_env: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MySqlConnectionConfig {
    #[serde(default = "default_mysql_host")]
    pub host: String,
    #[serde(default = "default_mysql_port")]
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub database: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SqliteConnectionConfig {
    pub path: String,
}
