//! # drafts-sync
//!
//! Change-set resolution, Google Sheets access, and reconciliation.
//!
//! Call [`pipeline::run`] with a [`RunConfig`] and a way to open the sheet;
//! it diffs the two revisions, extracts `DraftImage` records from the
//! changed files, checks the sheet header, and appends the new rows.

pub mod auth;
pub mod changeset;
pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod sheets;
pub mod validate;

pub use error::SyncError;
pub use pipeline::{run, RunConfig, RunOutcome, SyncReport};
pub use reconcile::{reconcile, ReconcilePlan};
pub use sheets::{GoogleSheets, SheetStore, SheetsSettings};
