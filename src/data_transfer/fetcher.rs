use crate::data_transfer::error::{ConfigurationError, SourceError, TransferError};
use crate::data_transfer::models::{Page, TableRef};
use crate::data_transfer::source::PageSource;
use std::sync::Arc;

/// Pull-based page reader. The only state carried between calls is the
/// next page index and the column order loaded on the first fetch.
pub struct PageFetcher {
    source: Arc<dyn PageSource>,
    table: TableRef,
    projection: Option<Vec<String>>,
    page_size: usize,
    next_page: u64,
    columns: Option<Arc<[String]>>,
}

impl PageFetcher {
    pub fn new(
        source: Arc<dyn PageSource>,
        table: TableRef,
        projection: Option<Vec<String>>,
        page_size: usize,
    ) -> Result<Self, ConfigurationError> {
        if page_size == 0 {
            return Err(ConfigurationError::InvalidBatchSize);
        }

        Ok(Self {
            source,
            table,
            projection,
            page_size,
            next_page: 0,
            columns: None,
        })
    }

    pub fn next_page_index(&self) -> u64 {
        self.next_page
    }

    /// Fetches the page after the last one returned by this method.
    pub async fn next_page(&mut self) -> Result<Page, TransferError> {
        let page = self.fetch(self.next_page).await?;
        self.next_page = self.next_page.saturating_add(1);
        Ok(page)
    }

    /// Reads at most `page_size` rows starting at `page_index * page_size`.
    /// An empty page means the offset is at or past the end of the table.
    pub async fn fetch(&mut self, page_index: u64) -> Result<Page, TransferError> {
        let start_index = page_offset(page_index, self.page_size)?;
        let columns = self.load_columns().await?;

        let rows = self
            .source
            .list_rows(
                &self.table,
                self.projection.as_deref(),
                self.page_size,
                start_index,
            )
            .await?;

        if rows.len() > self.page_size {
            return Err(SourceError::Malformed(format!(
                "Requested at most {} rows from {} but received {}",
                self.page_size,
                self.table,
                rows.len()
            ))
            .into());
        }

        if let Some((position, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.fields.len() != columns.len())
        {
            return Err(SourceError::Malformed(format!(
                "Row {} of {} has {} fields but the table exposes {} columns",
                start_index.saturating_add(position as u64),
                self.table,
                row.fields.len(),
                columns.len()
            ))
            .into());
        }

        log::debug!(
            "Fetched {} rows from {} at offset {}",
            rows.len(),
            self.table,
            start_index
        );

        Ok(Page::new(columns, rows))
    }

    async fn load_columns(&mut self) -> Result<Arc<[String]>, SourceError> {
        if let Some(columns) = &self.columns {
            return Ok(Arc::clone(columns));
        }

        let columns: Arc<[String]> = self
            .source
            .column_order(&self.table, self.projection.as_deref())
            .await?
            .into();
        self.columns = Some(Arc::clone(&columns));
        Ok(columns)
    }
}

pub fn page_offset(page_index: u64, page_size: usize) -> Result<u64, ConfigurationError> {
    u64::try_from(page_size)
        .ok()
        .and_then(|size| page_index.checked_mul(size))
        .ok_or(ConfigurationError::PageOffsetOverflow {
            page_index,
            page_size,
        })
}

#[cfg(test)]
mod tests;
