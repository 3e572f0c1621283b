//! End-to-end sync run: diff, extract, validate, reconcile.

use std::path::PathBuf;

use drafts_core::{ColumnSchema, DraftImageId, DraftImageRecord};
use drafts_extractor::Extractor;

use crate::changeset::{self, DEFAULT_EXTENSION};
use crate::error::io_err;
use crate::reconcile::reconcile;
use crate::sheets::{SheetStore, DEFAULT_SHEET_NAME};
use crate::validate::validate_header;
use crate::SyncError;

/// Inputs for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Repository root the diff runs in and changed paths are relative to.
    pub repo: PathBuf,
    pub before: String,
    pub current: String,
    pub extension: String,
    pub sheet_name: String,
    pub schema: ColumnSchema,
    pub dry_run: bool,
}

impl RunConfig {
    pub fn new(
        repo: impl Into<PathBuf>,
        before: impl Into<String>,
        current: impl Into<String>,
    ) -> Self {
        Self {
            repo: repo.into(),
            before: before.into(),
            current: current.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            schema: ColumnSchema::standard(),
            dry_run: false,
        }
    }
}

/// Summary of a run that reached the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Changed files that matched the extension, in diff order.
    pub changed_files: Vec<String>,
    /// Number of `DraftImage` elements found across those files.
    pub candidates: usize,
    /// Records appended (or, in a dry run, that would have been).
    pub appended: Vec<DraftImageRecord>,
    /// Unactioned sheet ids no longer referenced by any scanned element.
    pub orphaned: Vec<DraftImageId>,
    pub dry_run: bool,
}

/// Result of [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No changed file matched the extension; the sheet was not contacted.
    NothingToDo,
    Synced(SyncReport),
}

/// Run the pipeline.
///
/// `connect` opens the sheet and is only called once there is at least one
/// matching changed file, so a run with nothing to do needs no credentials
/// and makes no network calls.
pub fn run<S, F>(config: &RunConfig, connect: F) -> Result<RunOutcome, SyncError>
where
    S: SheetStore,
    F: FnOnce() -> Result<S, SyncError>,
{
    let changed = changeset::resolve(
        &config.repo,
        &config.before,
        &config.current,
        &config.extension,
    )?;
    if changed.is_empty() {
        tracing::info!("no changed '{}' files; nothing to do", config.extension);
        return Ok(RunOutcome::NothingToDo);
    }

    let candidates = collect_candidates(config, &changed)?;

    let mut store = connect()?;
    validate_header(&mut store, &config.schema, &config.sheet_name)?;
    let plan = reconcile(
        &mut store,
        &config.schema,
        &config.sheet_name,
        &candidates,
        config.dry_run,
    )?;

    if !plan.orphaned.is_empty() {
        let list: Vec<&str> = plan.orphaned.iter().map(DraftImageId::as_str).collect();
        tracing::warn!(
            "{} unactioned row(s) not found in scanned files: {}",
            list.len(),
            list.join(", ")
        );
    }

    Ok(RunOutcome::Synced(SyncReport {
        changed_files: changed,
        candidates: candidates.len(),
        appended: plan.to_append,
        orphaned: plan.orphaned,
        dry_run: config.dry_run,
    }))
}

/// Extract records from every file in `paths`, file order then in-file order.
pub fn collect_candidates(
    config: &RunConfig,
    paths: &[String],
) -> Result<Vec<DraftImageRecord>, SyncError> {
    let mut extractor = Extractor::new()?;
    let mut records = Vec::new();
    for path in paths {
        let full = config.repo.join(path);
        let source = std::fs::read_to_string(&full).map_err(|e| io_err(&full, e))?;
        records.extend(extractor.extract(path, &source)?);
    }
    Ok(records)
}
