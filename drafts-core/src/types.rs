//! Domain types for draft image tracking.
//!
//! A [`DraftImageRecord`] is produced for every `DraftImage` element found in
//! source, and becomes exactly one [`SheetRow`] when appended to the sheet.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identifier of a draft image (the `id` attribute / `UUID` column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftImageId(pub String);

impl DraftImageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DraftImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DraftImageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DraftImageId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Metadata collected from one `DraftImage` element.
///
/// `id`, `original_url` and `comment` are `None` when the attribute is
/// missing or was written as a non-literal expression. The remaining review
/// fields are owned by editors and always start out empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftImageRecord {
    pub id: Option<DraftImageId>,
    pub original_url: Option<String>,
    pub comment: Option<String>,
    /// Final path segment of the file the element was found in.
    pub document_name: String,
    #[serde(default)]
    pub figma_url: String,
    #[serde(default)]
    pub design_review: String,
    #[serde(default)]
    pub new_url: String,
    #[serde(default)]
    pub editor_review: String,
    #[serde(default)]
    pub added_to_worksheet: String,
}

impl DraftImageRecord {
    /// Build a record with every review field at its default.
    pub fn new(
        id: Option<DraftImageId>,
        original_url: Option<String>,
        comment: Option<String>,
        document_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            original_url,
            comment,
            document_name: document_name.into(),
            figma_url: String::new(),
            design_review: String::new(),
            new_url: String::new(),
            editor_review: String::new(),
            added_to_worksheet: String::new(),
        }
    }

    /// Value of the cell this record contributes to `column`.
    ///
    /// Absent attributes become empty cells.
    pub fn cell(&self, column: ColumnKey) -> String {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        match column {
            ColumnKey::Id => self.id.as_ref().map(|id| id.0.clone()).unwrap_or_default(),
            ColumnKey::OriginalUrl => opt(&self.original_url),
            ColumnKey::Comment => opt(&self.comment),
            ColumnKey::DocumentName => self.document_name.clone(),
            ColumnKey::FigmaUrl => self.figma_url.clone(),
            ColumnKey::DesignReview => self.design_review.clone(),
            ColumnKey::NewUrl => self.new_url.clone(),
            ColumnKey::EditorReview => self.editor_review.clone(),
            ColumnKey::AddedToWorksheet => self.added_to_worksheet.clone(),
        }
    }
}

/// Logical identifier of a sheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Id,
    OriginalUrl,
    Comment,
    DocumentName,
    FigmaUrl,
    DesignReview,
    NewUrl,
    EditorReview,
    AddedToWorksheet,
}

/// One row of cells as read from, or written to, the sheet.
///
/// The Sheets API drops trailing empty cells, so rows read back may be
/// shorter than the schema.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetRow(pub Vec<String>);

impl SheetRow {
    /// Cell at `index`, or `""` when the row is too short.
    pub fn cell(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }
}

impl From<Vec<String>> for SheetRow {
    fn from(cells: Vec<String>) -> Self {
        Self(cells)
    }
}

impl<const N: usize> From<[&str; N]> for SheetRow {
    fn from(cells: [&str; N]) -> Self {
        Self(cells.iter().map(|c| c.to_string()).collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
