//! Draft image core library: domain types and the fixed column schema.
//!
//! - [`types`]: records and sheet rows
//! - [`schema`]: [`ColumnSchema`] and header validation
//! - [`error`]: [`SchemaError`]

pub mod error;
pub mod schema;
pub mod types;

pub use error::SchemaError;
pub use schema::{Column, ColumnSchema, ADDED_TO_WORKSHEET_MARKER};
pub use types::{ColumnKey, DraftImageId, DraftImageRecord, SheetRow};
