use crate::data_transfer::error::TransferError;
use crate::data_transfer::fetcher::PageFetcher;
use crate::data_transfer::models::{TransferReport, TransferRequest};
use crate::data_transfer::normalizer::normalize;
use crate::data_transfer::sink::{BatchWriter, RowSink};
use crate::data_transfer::source::PageSource;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Drives one transfer: fetch a page, normalize it, write it, repeat until
/// the source returns an empty page. Exactly one page is held at a time and
/// batches are written in page order.
pub struct TransferEngine {
    source: Arc<dyn PageSource>,
    sink: Arc<dyn RowSink>,
    cancellation: Option<CancellationToken>,
}

impl TransferEngine {
    pub fn new(source: Arc<dyn PageSource>, sink: Arc<dyn RowSink>) -> Self {
        Self {
            source,
            sink,
            cancellation: None,
        }
    }

    /// The token is checked before each page fetch.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    pub async fn run(&self, request: &TransferRequest) -> Result<TransferReport, TransferError> {
        let table = request.validate()?;
        let destination_table = request.normalized_destination_table();
        let mut report = TransferReport::start(&table, request);

        log::info!(
            "Fetching data from namespace '{}' table '{}'",
            table.namespace(),
            table.name()
        );

        let mut fetcher = PageFetcher::new(
            Arc::clone(&self.source),
            table,
            request.normalized_projection(),
            request.batch_size,
        )?;
        let writer = BatchWriter::new(Arc::clone(&self.sink));

        loop {
            if self.is_cancelled() {
                log::warn!(
                    "Transfer {} cancelled after {} rows",
                    report.operation_id,
                    report.written_rows
                );
                return Err(TransferError::Cancelled {
                    written_rows: report.written_rows,
                });
            }

            let page_index = fetcher.next_page_index();
            let page = match fetcher.next_page().await {
                Ok(page) => page,
                Err(err) => {
                    log::error!(
                        "Transfer {} failed reading page {}: {}",
                        report.operation_id,
                        page_index,
                        err
                    );
                    return Err(err);
                }
            };

            if page.is_empty() {
                break;
            }

            report.pages_fetched += 1;
            report.source_rows += page.len();
            log::info!("Total extracted rows: {}", report.source_rows);

            let batch = normalize(page);
            if request.dry_run {
                log::debug!("Dry run, skipping write of {} rows", batch.len());
                continue;
            }

            match writer.write(&destination_table, &batch, request.mode).await {
                Ok(written) => {
                    report.batches_written += 1;
                    report.written_rows += written;
                    log::debug!(
                        "Wrote batch {} ({} rows, mode {}) to {}",
                        page_index,
                        written,
                        request.mode,
                        destination_table
                    );
                }
                Err(err) => {
                    log::error!(
                        "Transfer {} failed writing batch {} to {}: {}",
                        report.operation_id,
                        page_index,
                        destination_table,
                        err
                    );
                    return Err(err.into());
                }
            }
        }

        report.finish();
        log::info!(
            "Transfer finished: {} rows read, {} rows written",
            report.source_rows,
            report.written_rows
        );
        Ok(report)
    }
}
