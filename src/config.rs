// =====================================================
// JOB FILE (TOML)
// =====================================================

use crate::data_transfer::models::{TransferRequest, WriteMode, DEFAULT_BATCH_SIZE};
use crate::db_types::ConnectionConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_SOURCE_CONNECTION_ID: &str = "google_cloud_default";
pub const DEFAULT_SINK_CONNECTION_ID: &str = "mysql_default";

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_source_connection_id() -> String {
    DEFAULT_SOURCE_CONNECTION_ID.to_string()
}

fn default_sink_connection_id() -> String {
    DEFAULT_SINK_CONNECTION_ID.to_string()
}

/// One transfer job plus the connections it may refer to.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JobFile {
    pub source_table: String,
    pub destination_table: String,
    #[serde(default)]
    pub selected_fields: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub mode: WriteMode,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_source_connection_id")]
    pub source_connection_id: String,
    #[serde(default = "default_sink_connection_id")]
    pub sink_connection_id: String,
    /// Replaces the database named by the sink connection
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

impl JobFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read job file '{}': {}", path.display(), e))?;
        Self::from_toml_str(&raw)
            .map_err(|e| format!("Invalid job file '{}': {}", path.display(), e))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, String> {
        let job = toml::from_str::<JobFile>(raw).map_err(|e| e.to_string())?;
        job.validate()?;
        Ok(job)
    }

    pub fn normalized_database(&self) -> Option<&str> {
        self.database
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Runs before any connection is opened. Table identifiers are parsed later by the engine.
    pub fn validate(&self) -> Result<(), String> {
        if self.source_table.trim().is_empty() {
            return Err("source_table is required".to_string());
        }
        if self.destination_table.trim().is_empty() {
            return Err("destination_table is required".to_string());
        }
        if self.batch_size == 0 {
            return Err("batch_size must be a positive integer".to_string());
        }

        for (field, id) in [
            ("source_connection_id", &self.source_connection_id),
            ("sink_connection_id", &self.sink_connection_id),
        ] {
            let id = id.trim();
            if id.is_empty() {
                return Err(format!("{} is required", field));
            }
            if !self.connections.keys().any(|key| key.trim() == id) {
                return Err(format!(
                    "{} refers to '{}' but no [connections.{}] section exists",
                    field, id, id
                ));
            }
        }

        Ok(())
    }

    pub fn to_request(&self) -> TransferRequest {
        TransferRequest {
            source_table: self.source_table.clone(),
            destination_table: self.destination_table.clone(),
            selected_fields: self.selected_fields.clone(),
            batch_size: self.batch_size,
            mode: self.mode,
            dry_run: self.dry_run,
        }
    }
}
