//! Error types for table transfers

use thiserror::Error;

/// Problems with the job inputs, detected before any source or sink call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Could not parse '{input}' as <namespace>.<table>")]
    MalformedTableIdentifier { input: String },

    #[error("Batch size must be a positive integer")]
    InvalidBatchSize,

    #[error("Destination table is required")]
    EmptyDestinationTable,

    #[error("Page {page_index} with page size {page_size} does not fit in a row offset")]
    PageOffsetOverflow { page_index: u64, page_size: usize },
}

/// Failures raised by the source collaborator while reading a page.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Could not reach the remote source
    #[error("source connection failed: {0}")]
    Connection(String),

    /// The source answered with an error
    #[error("source request failed: {0}")]
    Request(String),

    /// The source answered with something that is not a valid page
    #[error("malformed source response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SourceError::Malformed(e.to_string())
        } else if e.is_connect() || e.is_timeout() {
            SourceError::Connection(e.to_string())
        } else {
            SourceError::Request(e.to_string())
        }
    }
}

/// Failures raised by the sink collaborator while writing a batch.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Could not reach the destination database
    #[error("sink connection failed: {0}")]
    Connection(String),

    /// The destination rejected the write
    #[error("sink write failed: {0}")]
    Write(String),
}

impl From<sqlx::Error> for SinkError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => SinkError::Connection(e.to_string()),
            _ => SinkError::Write(e.to_string()),
        }
    }
}

/// Terminal failure of a transfer. Collaborator errors are carried as-is.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    SourceRead(#[from] SourceError),

    #[error(transparent)]
    SinkWrite(#[from] SinkError),

    #[error("Transfer cancelled after writing {written_rows} rows")]
    Cancelled { written_rows: usize },
}
