use crate::data_transfer::error::SinkError;
use crate::data_transfer::models::{Batch, NormalizedRow, WriteMode};
use crate::db_types::DatabaseType;
use crate::sql_utils::{placeholder_list, qualified_table_name};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{MySql, Pool, Sqlite};
use std::sync::Arc;

/// Relational store that accepts whole batches of positional rows.
#[async_trait]
pub trait RowSink: Send + Sync {
    /// Writes `rows` in order. With `replace`, rows whose key collides with an
    /// existing row overwrite it; the key is whatever the table declares.
    async fn insert_rows(
        &self,
        table: &str,
        rows: &[NormalizedRow],
        replace: bool,
    ) -> Result<usize, SinkError>;
}

#[derive(Debug, Clone)]
pub enum SinkPool {
    MySQL(Pool<MySql>),
    SQLite(Pool<Sqlite>),
}

/// sqlx-backed sink. Each call runs in one transaction.
#[derive(Debug, Clone)]
pub struct SqlRowSink {
    pool: SinkPool,
}

impl SqlRowSink {
    pub fn mysql(pool: Pool<MySql>) -> Self {
        Self {
            pool: SinkPool::MySQL(pool),
        }
    }

    pub fn sqlite(pool: Pool<Sqlite>) -> Self {
        Self {
            pool: SinkPool::SQLite(pool),
        }
    }

    pub fn db_type(&self) -> DatabaseType {
        match self.pool {
            SinkPool::MySQL(_) => DatabaseType::MySQL,
            SinkPool::SQLite(_) => DatabaseType::SQLite,
        }
    }
}

#[async_trait]
impl RowSink for SqlRowSink {
    async fn insert_rows(
        &self,
        table: &str,
        rows: &[NormalizedRow],
        replace: bool,
    ) -> Result<usize, SinkError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mode = if replace {
            WriteMode::Replace
        } else {
            WriteMode::Insert
        };
        let statement = build_write_statement(&self.db_type(), table, mode, row_width(rows)?)?;

        match &self.pool {
            SinkPool::MySQL(pool) => insert_rows_mysql(pool, &statement, rows).await,
            SinkPool::SQLite(pool) => insert_rows_sqlite(pool, &statement, rows).await,
        }
    }
}

/// Batch Writer: hands a normalized batch to the sink with the job's mode.
pub struct BatchWriter {
    sink: Arc<dyn RowSink>,
}

impl BatchWriter {
    pub fn new(sink: Arc<dyn RowSink>) -> Self {
        Self { sink }
    }

    pub async fn write(
        &self,
        destination_table: &str,
        batch: &Batch,
        mode: WriteMode,
    ) -> Result<usize, SinkError> {
        if batch.is_empty() {
            return Ok(0);
        }
        self.sink
            .insert_rows(destination_table, batch.rows(), mode.is_replace())
            .await
    }
}

/// `INSERT INTO` or `REPLACE INTO` without a column list; values bind by position.
pub fn build_write_statement(
    db_type: &DatabaseType,
    table: &str,
    mode: WriteMode,
    width: usize,
) -> Result<String, SinkError> {
    if table.trim().is_empty() {
        return Err(SinkError::Write("Destination table name is empty".to_string()));
    }
    if width == 0 {
        return Err(SinkError::Write("Rows have no values to write".to_string()));
    }

    let verb = match mode {
        WriteMode::Insert => "INSERT INTO",
        WriteMode::Replace => "REPLACE INTO",
    };

    Ok(format!(
        "{} {} VALUES ({})",
        verb,
        qualified_table_name(db_type, table),
        placeholder_list(width)
    ))
}

fn row_width(rows: &[NormalizedRow]) -> Result<usize, SinkError> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    if let Some(position) = rows.iter().position(|row| row.len() != width) {
        return Err(SinkError::Write(format!(
            "Row {} has {} values but the batch has {} columns",
            position,
            rows[position].len(),
            width
        )));
    }
    Ok(width)
}

#[derive(Debug, Clone, PartialEq)]
enum SinkValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

fn sink_value(value: &Value) -> SinkValue {
    match value {
        Value::Null => SinkValue::Null,
        Value::Bool(b) => SinkValue::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SinkValue::Integer(i)
            } else if n.is_u64() {
                // above i64::MAX; text keeps every digit
                SinkValue::Text(n.to_string())
            } else {
                n.as_f64()
                    .map(SinkValue::Float)
                    .unwrap_or_else(|| SinkValue::Text(n.to_string()))
            }
        }
        Value::String(s) => SinkValue::Text(s.clone()),
        Value::Object(_) | Value::Array(_) => SinkValue::Text(value.to_string()),
    }
}

fn bind_mysql<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: SinkValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        SinkValue::Null => query.bind(None::<String>),
        SinkValue::Text(v) => query.bind(v),
        SinkValue::Integer(v) => query.bind(v),
        SinkValue::Float(v) => query.bind(v),
        SinkValue::Boolean(v) => query.bind(v),
    }
}

fn bind_sqlite<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: SinkValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SinkValue::Null => query.bind(None::<String>),
        SinkValue::Text(v) => query.bind(v),
        SinkValue::Integer(v) => query.bind(v),
        SinkValue::Float(v) => query.bind(v),
        SinkValue::Boolean(v) => query.bind(v),
    }
}

async fn insert_rows_mysql(
    pool: &Pool<MySql>,
    statement: &str,
    rows: &[NormalizedRow],
) -> Result<usize, SinkError> {
    let mut tx = pool.begin().await?;
    for row in rows {
        let query = row
            .iter()
            .map(sink_value)
            .fold(sqlx::query(statement), bind_mysql);
        query.execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(rows.len())
}

async fn insert_rows_sqlite(
    pool: &Pool<Sqlite>,
    statement: &str,
    rows: &[NormalizedRow],
) -> Result<usize, SinkError> {
    let mut tx = pool.begin().await?;
    for row in rows {
        let query = row
            .iter()
            .map(sink_value)
            .fold(sqlx::query(statement), bind_sqlite);
        query.execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(rows.len())
}
