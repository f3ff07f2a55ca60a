use super::*;
use crate::data_transfer::error::SourceError;
use crate::data_transfer::models::SourceRow;
use crate::data_transfer::testing::MemoryTableSource;
use async_trait::async_trait;
use serde_json::json;

fn fetcher_for(source: Arc<MemoryTableSource>, page_size: usize) -> PageFetcher {
    PageFetcher::new(source, TableRef::parse("ds.t").unwrap(), None, page_size).unwrap()
}

#[test]
fn test_page_offset_multiplies_index_by_size() {
    assert_eq!(page_offset(0, 1000).unwrap(), 0);
    assert_eq!(page_offset(3, 1000).unwrap(), 3000);
    assert_eq!(
        page_offset(u64::MAX, 2).unwrap_err(),
        ConfigurationError::PageOffsetOverflow {
            page_index: u64::MAX,
            page_size: 2
        }
    );
}

#[test]
fn test_zero_page_size_is_rejected() {
    let source = Arc::new(MemoryTableSource::numbered(1));
    let result = PageFetcher::new(source, TableRef::parse("ds.t").unwrap(), None, 0);
    assert_eq!(result.err(), Some(ConfigurationError::InvalidBatchSize));
}

#[tokio::test]
async fn test_page_lengths_follow_remaining_rows() {
    let source = Arc::new(MemoryTableSource::numbered(25));
    let mut fetcher = fetcher_for(source.clone(), 10);

    let mut lengths = Vec::new();
    loop {
        let page = fetcher.next_page().await.unwrap();
        lengths.push(page.len());
        if page.is_empty() {
            break;
        }
    }

    assert_eq!(lengths, vec![10, 10, 5, 0]);
    assert_eq!(source.requested_offsets(), vec![0, 10, 20, 30]);
    assert_eq!(fetcher.next_page_index(), 4);
}

#[tokio::test]
async fn test_exact_multiple_ends_with_single_empty_page() {
    let source = Arc::new(MemoryTableSource::numbered(20));
    let mut fetcher = fetcher_for(source.clone(), 10);

    assert_eq!(fetcher.fetch(0).await.unwrap().len(), 10);
    assert_eq!(fetcher.fetch(1).await.unwrap().len(), 10);
    assert!(fetcher.fetch(2).await.unwrap().is_empty());
    assert!(fetcher.fetch(7).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_is_idempotent_for_fixed_offset() {
    let source = Arc::new(MemoryTableSource::numbered(12));
    let mut fetcher = fetcher_for(source, 5);

    let first = fetcher.fetch(1).await.unwrap();
    let again = fetcher.fetch(1).await.unwrap();
    assert_eq!(first.rows(), again.rows());
    assert_eq!(first.rows()[0].fields[0].value, json!("6"));
}

#[tokio::test]
async fn test_column_order_is_loaded_once() {
    let source = Arc::new(MemoryTableSource::numbered(3));
    let mut fetcher = fetcher_for(source.clone(), 2);

    let page = fetcher.next_page().await.unwrap();
    fetcher.next_page().await.unwrap();
    fetcher.next_page().await.unwrap();

    assert_eq!(page.columns(), ["id".to_string(), "name".to_string()]);
    assert_eq!(source.schema_calls(), 1);
    assert_eq!(source.list_calls(), 3);
}

#[tokio::test]
async fn test_projected_page_keeps_native_column_order() {
    let source = Arc::new(MemoryTableSource::new(
        &["a", "b", "c"],
        vec![vec![json!("a1"), json!("b1"), json!("c1")]],
    ));
    let mut fetcher = PageFetcher::new(
        source,
        TableRef::parse("ds.t").unwrap(),
        Some(vec!["c".to_string(), "a".to_string()]),
        10,
    )
    .unwrap();

    let page = fetcher.fetch(0).await.unwrap();
    assert_eq!(page.columns(), ["a".to_string(), "c".to_string()]);
    assert_eq!(
        page.rows()[0],
        SourceRow::from_values(vec![json!("a1"), json!("c1")])
    );
}

#[tokio::test]
async fn test_source_failure_does_not_advance_cursor() {
    let source = Arc::new(MemoryTableSource::numbered(30).failing_on_call(2));
    let mut fetcher = fetcher_for(source, 10);

    fetcher.next_page().await.unwrap();
    let err = fetcher.next_page().await.unwrap_err();
    assert!(matches!(err, TransferError::SourceRead(SourceError::Request(_))));
    assert_eq!(fetcher.next_page_index(), 1);
}

struct RaggedSource;

#[async_trait]
impl PageSource for RaggedSource {
    async fn column_order(
        &self,
        _table: &TableRef,
        _projection: Option<&[String]>,
    ) -> Result<Vec<String>, SourceError> {
        Ok(vec!["a".to_string(), "b".to_string()])
    }

    async fn list_rows(
        &self,
        _table: &TableRef,
        _projection: Option<&[String]>,
        _max_results: usize,
        _start_index: u64,
    ) -> Result<Vec<SourceRow>, SourceError> {
        Ok(vec![
            SourceRow::from_values(vec![json!(1), json!(2)]),
            SourceRow::from_values(vec![json!(3)]),
        ])
    }
}

#[tokio::test]
async fn test_ragged_rows_fail_the_whole_page() {
    let mut fetcher =
        PageFetcher::new(Arc::new(RaggedSource), TableRef::parse("ds.t").unwrap(), None, 10)
            .unwrap();

    let err = fetcher.fetch(0).await.unwrap_err();
    match err {
        TransferError::SourceRead(SourceError::Malformed(message)) => {
            assert!(message.contains("Row 1"), "{}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_oversized_page_is_rejected() {
    let mut fetcher =
        PageFetcher::new(Arc::new(RaggedSource), TableRef::parse("ds.t").unwrap(), None, 1)
            .unwrap();

    let err = fetcher.fetch(0).await.unwrap_err();
    assert!(matches!(err, TransferError::SourceRead(SourceError::Malformed(_))));
}
