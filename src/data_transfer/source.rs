use crate::data_transfer::error::SourceError;
use crate::data_transfer::models::{SourceRow, TableRef};
use async_trait::async_trait;

/// Remote tabular store that can be read in offset/limit slices.
///
/// Rows always come back with their fields in the table's native column
/// order, whatever order the projection names them in.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Native column order of `table`, restricted to `projection` when given.
    async fn column_order(
        &self,
        table: &TableRef,
        projection: Option<&[String]>,
    ) -> Result<Vec<String>, SourceError>;

    /// Up to `max_results` rows starting at row `start_index`.
    async fn list_rows(
        &self,
        table: &TableRef,
        projection: Option<&[String]>,
        max_results: usize,
        start_index: u64,
    ) -> Result<Vec<SourceRow>, SourceError>;
}

/// Keeps the native order of `native` and drops columns not in `projection`.
/// Names are matched case-insensitively; unknown names are an error.
pub fn project_native_order(
    native: &[String],
    projection: Option<&[String]>,
) -> Result<Vec<String>, SourceError> {
    let Some(selected) = projection else {
        return Ok(native.to_vec());
    };

    for name in selected {
        if !native.iter().any(|column| column.eq_ignore_ascii_case(name)) {
            return Err(SourceError::Request(format!(
                "Selected field '{}' does not exist in the source table",
                name
            )));
        }
    }

    Ok(native
        .iter()
        .filter(|column| selected.iter().any(|name| name.eq_ignore_ascii_case(column)))
        .cloned()
        .collect())
}
