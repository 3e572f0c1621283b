//! Reconciliation of extracted records against rows already in the sheet.
//!
//! The sheet is append-only from this side:
//!
//! 1. Records whose id is already in the sheet are dropped.
//! 2. The rest are appended in one batch, in discovery order.
//! 3. Rows editors have not yet actioned, and whose id no longer appears in
//!    any scanned record, are reported as orphans.
//!
//! Reading and appending are separate calls with no lock in between, so two
//! concurrent runs can both append the same new id.

use std::collections::HashSet;

use drafts_core::{
    ColumnKey, ColumnSchema, DraftImageId, DraftImageRecord, SheetRow, ADDED_TO_WORKSHEET_MARKER,
};

use crate::sheets::SheetStore;
use crate::SyncError;

/// What a reconciliation decided, before or after it was applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcilePlan {
    /// Records to append, in discovery order.
    pub to_append: Vec<DraftImageRecord>,
    /// Ids of unactioned rows that no scanned record refers to.
    pub orphaned: Vec<DraftImageId>,
}

impl ReconcilePlan {
    /// Compare `candidates` against the sheet's `existing` data rows.
    pub fn compute(
        schema: &ColumnSchema,
        existing: &[SheetRow],
        candidates: &[DraftImageRecord],
    ) -> Self {
        let id_col = schema.index_of(ColumnKey::Id).unwrap_or(0);
        let added_col = schema
            .index_of(ColumnKey::AddedToWorksheet)
            .unwrap_or(schema.len().saturating_sub(1));

        let existing_ids: HashSet<&str> = existing.iter().map(|row| row.cell(id_col)).collect();

        let to_append: Vec<DraftImageRecord> = candidates
            .iter()
            .filter(|record| match &record.id {
                Some(id) => !existing_ids.contains(id.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        let candidate_ids: HashSet<&str> = candidates
            .iter()
            .filter_map(|record| record.id.as_ref().map(DraftImageId::as_str))
            .collect();

        let orphaned = existing
            .iter()
            .filter(|row| row.cell(added_col) != ADDED_TO_WORKSHEET_MARKER)
            .map(|row| row.cell(id_col))
            .filter(|id| !id.is_empty() && !candidate_ids.contains(id))
            .map(DraftImageId::from)
            .collect();

        Self {
            to_append,
            orphaned,
        }
    }
}

/// Read existing rows, append what is new, and return the plan.
///
/// With `dry_run` set nothing is written. An empty plan skips the append
/// call entirely.
pub fn reconcile<S: SheetStore + ?Sized>(
    store: &mut S,
    schema: &ColumnSchema,
    sheet: &str,
    candidates: &[DraftImageRecord],
    dry_run: bool,
) -> Result<ReconcilePlan, SyncError> {
    let existing = store.read_range(&schema.data_range(sheet))?;
    let plan = ReconcilePlan::compute(schema, &existing, candidates);

    for record in plan.to_append.iter().filter(|r| r.id.is_none()) {
        tracing::warn!(
            "DraftImage without a literal id in {}; appending with an empty id",
            record.document_name
        );
    }

    tracing::info!(
        "{} existing row(s), {} candidate(s), {} new",
        existing.len(),
        candidates.len(),
        plan.to_append.len()
    );

    if plan.to_append.is_empty() {
        return Ok(plan);
    }
    if dry_run {
        tracing::info!("[dry-run] would append {} row(s)", plan.to_append.len());
        return Ok(plan);
    }

    let rows: Vec<SheetRow> = plan.to_append.iter().map(|r| schema.row_for(r)).collect();
    store.append_rows(&schema.data_range(sheet), &rows)?;
    Ok(plan)
}
