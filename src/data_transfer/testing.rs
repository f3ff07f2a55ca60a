//! In-memory collaborators shared by the data_transfer tests.

use crate::data_transfer::error::{SinkError, SourceError};
use crate::data_transfer::models::{NormalizedRow, SourceRow, TableRef};
use crate::data_transfer::sink::RowSink;
use crate::data_transfer::source::{project_native_order, PageSource};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::Mutex;

/// Source table held in memory; projected rows keep the native column order.
pub struct MemoryTableSource {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    list_calls: AtomicUsize,
    schema_calls: AtomicUsize,
    requested_offsets: Mutex<Vec<u64>>,
    fail_on_call: Option<usize>,
}

impl MemoryTableSource {
    pub fn new(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows,
            list_calls: AtomicUsize::new(0),
            schema_calls: AtomicUsize::new(0),
            requested_offsets: Mutex::new(Vec::new()),
            fail_on_call: None,
        }
    }

    /// Table `(id, name)` with ids `1..=count`.
    pub fn numbered(count: usize) -> Self {
        let rows = (1..=count)
            .map(|id| vec![json!(id.to_string()), json!(format!("row-{}", id))])
            .collect();
        Self::new(&["id", "name"], rows)
    }

    /// The `call`-th list_rows call (1-based) fails.
    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn schema_calls(&self) -> usize {
        self.schema_calls.load(Ordering::SeqCst)
    }

    pub fn requested_offsets(&self) -> Vec<u64> {
        self.requested_offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for MemoryTableSource {
    async fn column_order(
        &self,
        _table: &TableRef,
        projection: Option<&[String]>,
    ) -> Result<Vec<String>, SourceError> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        project_native_order(&self.columns, projection)
    }

    async fn list_rows(
        &self,
        _table: &TableRef,
        projection: Option<&[String]>,
        max_results: usize,
        start_index: u64,
    ) -> Result<Vec<SourceRow>, SourceError> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requested_offsets.lock().unwrap().push(start_index);
        if self.fail_on_call == Some(call) {
            return Err(SourceError::Request(format!("list_rows call {} failed", call)));
        }

        let kept = project_native_order(&self.columns, projection)?;
        let indices = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| kept.contains(column))
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        Ok(self
            .rows
            .iter()
            .skip(start_index as usize)
            .take(max_results)
            .map(|row| SourceRow::from_values(indices.iter().map(|&index| row[index].clone())))
            .collect())
    }
}

/// Sink that records every batch it receives.
#[derive(Default)]
pub struct RecordingSink {
    writes: Mutex<Vec<(String, Vec<NormalizedRow>, bool)>>,
    fail_on_write: Option<usize>,
}

impl RecordingSink {
    /// The `write`-th insert_rows call (1-based) fails without recording.
    pub fn failing_on_write(write: usize) -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            fail_on_write: Some(write),
        }
    }

    pub fn writes(&self) -> Vec<(String, Vec<NormalizedRow>, bool)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn write_sizes(&self) -> Vec<usize> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .map(|(_, rows, _)| rows.len())
            .collect()
    }
}

#[async_trait]
impl RowSink for RecordingSink {
    async fn insert_rows(
        &self,
        table: &str,
        rows: &[NormalizedRow],
        replace: bool,
    ) -> Result<usize, SinkError> {
        let mut writes = self.writes.lock().unwrap();
        if self.fail_on_write == Some(writes.len() + 1) {
            return Err(SinkError::Write("duplicate entry for key 'PRIMARY'".to_string()));
        }
        writes.push((table.to_string(), rows.to_vec(), replace));
        Ok(rows.len())
    }
}

/// Sink wrapper that fails the `write`-th call and delegates the rest.
pub struct FailingSink {
    inner: Arc<dyn RowSink>,
    calls: AtomicUsize,
    fail_on_write: usize,
}

impl FailingSink {
    pub fn new(inner: Arc<dyn RowSink>, fail_on_write: usize) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            fail_on_write,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RowSink for FailingSink {
    async fn insert_rows(
        &self,
        table: &str,
        rows: &[NormalizedRow],
        replace: bool,
    ) -> Result<usize, SinkError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on_write {
            return Err(SinkError::Write(format!("injected failure on write {}", call)));
        }
        self.inner.insert_rows(table, rows, replace).await
    }
}
