//! Header-row guard against schema drift.

use drafts_core::ColumnSchema;

use crate::sheets::SheetStore;
use crate::SyncError;

/// Fetch the first row of `sheet` and check it against `schema`.
///
/// A sheet with no header row at all counts as zero columns.
pub fn validate_header<S: SheetStore + ?Sized>(
    store: &mut S,
    schema: &ColumnSchema,
    sheet: &str,
) -> Result<(), SyncError> {
    let rows = store.read_range(&schema.header_range(sheet))?;
    let header = rows.into_iter().next().unwrap_or_default();
    schema.validate_header(&header.0)?;
    tracing::debug!("header of '{}' matches {} columns", sheet, schema.len());
    Ok(())
}
