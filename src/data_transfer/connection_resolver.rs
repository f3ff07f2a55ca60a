use crate::bigquery::BigQueryClient;
use crate::data_transfer::sink::{RowSink, SqlRowSink};
use crate::data_transfer::source::PageSource;
use crate::db_types::{ConnectionConfig, DatabaseType};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ResolvedTransferConnection {
    pub connection_id: String,
    pub db_type: DatabaseType,
    pub config: ConnectionConfig,
}

fn normalize_connection_id(value: &str) -> String {
    value.trim().to_string()
}

pub fn resolve_connection_by_id(
    connections: &HashMap<String, ConnectionConfig>,
    connection_id: &str,
) -> Result<ResolvedTransferConnection, String> {
    let normalized_id = normalize_connection_id(connection_id);
    if normalized_id.is_empty() {
        return Err("connectionId is required".to_string());
    }

    let config = connections
        .iter()
        .find(|(id, _)| id.trim() == normalized_id)
        .map(|(_, config)| config.clone())
        .ok_or_else(|| format!("Connection '{}' not found", normalized_id))?;

    Ok(ResolvedTransferConnection {
        connection_id: normalized_id,
        db_type: config.db_type(),
        config,
    })
}

/// Builds the source collaborator. The bearer token is read from the
/// environment variable named by the connection, if any.
pub fn open_source(connection: &ResolvedTransferConnection) -> Result<Arc<dyn PageSource>, String> {
    match &connection.config {
        ConnectionConfig::BigQuery(config) => {
            let access_token = match config.access_token_env.as_deref().map(str::trim) {
                Some(var) if !var.is_empty() => Some(std::env::var(var).map_err(|_| {
                    format!(
                        "Connection '{}' expects an access token in ${} but it is not set",
                        connection.connection_id, var
                    )
                })?),
                _ => None,
            };
            let client = BigQueryClient::new(config, access_token)?;
            log::info!(
                "Reading source rows from BigQuery project '{}'",
                client.project_id()
            );
            Ok(Arc::new(client))
        }
        _ => Err(format!(
            "Connection '{}' is a {} connection and cannot be used as a transfer source",
            connection.connection_id,
            connection.db_type.label()
        )),
    }
}

/// Builds the sink collaborator; `database_override` replaces the MySQL database.
pub async fn open_sink(
    connection: &ResolvedTransferConnection,
    database_override: Option<&str>,
) -> Result<Arc<dyn RowSink>, String> {
    match &connection.config {
        ConnectionConfig::MySQL(config) => {
            let pool = crate::mysql::create_pool(config, database_override).await?;
            Ok(Arc::new(SqlRowSink::mysql(pool)))
        }
        ConnectionConfig::SQLite(config) => {
            if database_override.is_some_and(|db| !db.trim().is_empty()) {
                log::warn!(
                    "Ignoring database override for SQLite connection '{}'",
                    connection.connection_id
                );
            }
            let pool = crate::sqlite::create_pool(&config.path).await?;
            Ok(Arc::new(SqlRowSink::sqlite(pool)))
        }
        ConnectionConfig::BigQuery(_) => Err(format!(
            "Connection '{}' is a {} connection and cannot be used as a transfer sink",
            connection.connection_id,
            connection.db_type.label()
        )),
    }
}
