// Connection and dialect modules
pub mod bigquery;
pub mod db_types;
pub mod mysql;
pub mod sql_utils;
pub mod sqlite;

// Transfer core
pub mod data_transfer;

// Job surface
pub mod config;
pub mod labels;

pub use config::JobFile;
pub use data_transfer::engine::TransferEngine;
pub use data_transfer::error::{ConfigurationError, SinkError, SourceError, TransferError};
pub use data_transfer::models::{TableRef, TransferReport, TransferRequest, WriteMode};
pub use labels::{make_safe_label_value, MAX_LABEL_LEN};
