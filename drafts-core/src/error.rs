//! Error types for drafts-core.

use thiserror::Error;

/// Structural mismatch between the live header row and the [`ColumnSchema`].
///
/// [`ColumnSchema`]: crate::schema::ColumnSchema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The header row has the wrong number of cells.
    #[error("sheet header has {actual} columns, expected {expected}")]
    ColumnCount { expected: usize, actual: usize },

    /// A header cell does not carry the expected title.
    #[error("sheet header column {index}: expected title '{expected}', found '{actual}'")]
    Title {
        index: usize,
        expected: String,
        actual: String,
    },
}
