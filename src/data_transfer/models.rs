use crate::data_transfer::error::ConfigurationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_BATCH_SIZE: usize = 1_000;

const TABLE_REF_SEPARATOR: char = '.';

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// Two-part `namespace.name` identifier of the source table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    namespace: String,
    name: String,
}

impl TableRef {
    /// Accepts exactly one separator with a non-empty part on each side.
    pub fn parse(input: &str) -> Result<Self, ConfigurationError> {
        let mut parts = input.split(TABLE_REF_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(namespace), Some(name), None) if !namespace.is_empty() && !name.is_empty() => {
                Ok(Self {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(ConfigurationError::MalformedTableIdentifier {
                input: input.to_string(),
            }),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for TableRef {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.namespace, TABLE_REF_SEPARATOR, self.name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    #[default]
    Insert,
    Replace,
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMode::Insert => "insert",
            WriteMode::Replace => "replace",
        }
    }

    pub fn is_replace(&self) -> bool {
        matches!(self, WriteMode::Replace)
    }
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insert" => Ok(WriteMode::Insert),
            "replace" => Ok(WriteMode::Replace),
            other => Err(format!(
                "Unknown write mode '{}' (expected 'insert' or 'replace')",
                other
            )),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of a source row, as reported by the source (`{"v": ...}`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FieldEntry {
    #[serde(rename = "v", default)]
    pub value: Value,
}

/// A source row: its fields in the table's native column order (`{"f": [...]}`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SourceRow {
    #[serde(rename = "f", default)]
    pub fields: Vec<FieldEntry>,
}

impl SourceRow {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            fields: values
                .into_iter()
                .map(|value| FieldEntry { value })
                .collect(),
        }
    }
}

/// One bounded fetch result. `columns` is shared by every row of the page.
#[derive(Debug, Clone)]
pub struct Page {
    columns: Arc<[String]>,
    rows: Vec<SourceRow>,
}

impl Page {
    pub fn new(columns: Arc<[String]>, rows: Vec<SourceRow>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[SourceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Arc<[String]>, Vec<SourceRow>) {
        (self.columns, self.rows)
    }
}

pub type NormalizedRow = Vec<Value>;

/// The write-ready form of a page.
#[derive(Debug, Clone)]
pub struct Batch {
    columns: Arc<[String]>,
    rows: Vec<NormalizedRow>,
}

impl Batch {
    pub fn new(columns: Arc<[String]>, rows: Vec<NormalizedRow>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
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
}

impl TransferRequest {
    pub fn new(source_table: impl Into<String>, destination_table: impl Into<String>) -> Self {
        Self {
            source_table: source_table.into(),
            destination_table: destination_table.into(),
            selected_fields: None,
            batch_size: DEFAULT_BATCH_SIZE,
            mode: WriteMode::default(),
            dry_run: false,
        }
    }

    pub fn normalized_destination_table(&self) -> String {
        self.destination_table.trim().to_string()
    }

    /// Comma separated field list; `None` when nothing usable was given.
    pub fn normalized_projection(&self) -> Option<Vec<String>> {
        let fields = self
            .selected_fields
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();

        if fields.is_empty() {
            None
        } else {
            Some(fields)
        }
    }

    pub fn validate(&self) -> Result<TableRef, ConfigurationError> {
        let table = TableRef::parse(&self.source_table)?;
        if self.batch_size == 0 {
            return Err(ConfigurationError::InvalidBatchSize);
        }
        if self.normalized_destination_table().is_empty() {
            return Err(ConfigurationError::EmptyDestinationTable);
        }
        Ok(table)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransferReport {
    pub operation_id: String,
    pub source_table: String,
    pub destination_table: String,
    pub mode: WriteMode,
    pub dry_run: bool,
    pub pages_fetched: usize,
    pub batches_written: usize,
    pub source_rows: usize,
    pub written_rows: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TransferReport {
    pub fn start(table: &TableRef, request: &TransferRequest) -> Self {
        Self {
            operation_id: uuid::Uuid::new_v4().to_string(),
            source_table: table.to_string(),
            destination_table: request.normalized_destination_table(),
            mode: request.mode,
            dry_run: request.dry_run,
            pages_fetched: 0,
            batches_written: 0,
            source_rows: 0,
            written_rows: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}
