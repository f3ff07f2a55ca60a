use crate::data_transfer::models::{Batch, NormalizedRow, Page, SourceRow};

/// Reshapes a page into write-ready rows.
///
/// Values keep the order in which the source reported the fields, which is the
/// table's native column order and not the order of the requested projection.
/// Sinks insert positionally, so changing this order would shift values into
/// the wrong destination columns. Values are passed through without coercion.
pub fn normalize(page: Page) -> Batch {
    let (columns, rows) = page.into_parts();
    let rows = rows.into_iter().map(normalize_row).collect();
    Batch::new(columns, rows)
}

pub fn normalize_row(row: SourceRow) -> NormalizedRow {
    row.fields.into_iter().map(|entry| entry.value).collect()
}
