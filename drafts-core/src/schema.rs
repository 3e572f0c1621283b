//! Column schema of the draft images sheet.
//!
//! The schema is a plain value passed to whoever needs it: header validation
//! reads titles from it and the row builder reads column order from it.
//! Position in the list is the column's index; the spreadsheet letter is
//! derived from that index.

use crate::error::SchemaError;
use crate::types::{ColumnKey, DraftImageRecord, SheetRow};

/// Value of the `Added to Worksheet?` cell once editors have actioned a row.
pub const ADDED_TO_WORKSHEET_MARKER: &str = "TRUE";

/// One column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: ColumnKey,
    pub title: String,
}

impl Column {
    pub fn new(key: ColumnKey, title: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
        }
    }
}

/// Ordered, immutable list of sheet columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<Column>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::standard()
    }
}

impl ColumnSchema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// The layout editors work against. Must match the live header row.
    pub fn standard() -> Self {
        Self::new(vec![
            Column::new(ColumnKey::Id, "UUID"),
            Column::new(ColumnKey::OriginalUrl, "Original URL"),
            Column::new(ColumnKey::Comment, "Comment"),
            Column::new(ColumnKey::DocumentName, "Document"),
            Column::new(ColumnKey::FigmaUrl, "Figma URL"),
            Column::new(ColumnKey::DesignReview, "Design Review"),
            Column::new(
                ColumnKey::NewUrl,
                "New URL to add to jsx-images.mathspace.co",
            ),
            Column::new(ColumnKey::EditorReview, "Editor review"),
            Column::new(ColumnKey::AddedToWorksheet, "Added to Worksheet?"),
        ])
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Positional index of `key`, if the schema has that column.
    pub fn index_of(&self, key: ColumnKey) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    /// A1 range covering only the header row, e.g. `'Draft Images'!A1:I1`.
    pub fn header_range(&self, sheet: &str) -> String {
        format!("{}!A1:{}1", quote_sheet(sheet), self.last_letter())
    }

    /// A1 range covering every data row below the header.
    pub fn data_range(&self, sheet: &str) -> String {
        format!("{}!A2:{}", quote_sheet(sheet), self.last_letter())
    }

    /// Check a live header row against this schema.
    ///
    /// The count is checked first; titles are compared in order and the
    /// first mismatch is reported.
    pub fn validate_header(&self, header: &[String]) -> Result<(), SchemaError> {
        if header.len() != self.columns.len() {
            return Err(SchemaError::ColumnCount {
                expected: self.columns.len(),
                actual: header.len(),
            });
        }
        for (index, (column, actual)) in self.columns.iter().zip(header).enumerate() {
            if &column.title != actual {
                return Err(SchemaError::Title {
                    index,
                    expected: column.title.clone(),
                    actual: actual.clone(),
                });
            }
        }
        Ok(())
    }

    /// Lay out `record` as a row in schema column order.
    pub fn row_for(&self, record: &DraftImageRecord) -> SheetRow {
        SheetRow(self.columns.iter().map(|c| record.cell(c.key)).collect())
    }

    fn last_letter(&self) -> String {
        column_letter(self.columns.len().saturating_sub(1))
    }
}

/// Spreadsheet column letter for a zero-based index: 0 → `A`, 25 → `Z`,
/// 26 → `AA`.
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn quote_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DraftImageId;

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(8), "I");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn standard_ranges_span_nine_columns() {
        let schema = ColumnSchema::standard();
        assert_eq!(schema.header_range("Draft Images"), "'Draft Images'!A1:I1");
        assert_eq!(schema.data_range("Draft Images"), "'Draft Images'!A2:I");
    }

    #[test]
    fn sheet_names_with_quotes_are_escaped() {
        let schema = ColumnSchema::standard();
        assert_eq!(schema.header_range("Editor's"), "'Editor''s'!A1:I1");
    }

    #[test]
    fn added_to_worksheet_is_last_column() {
        let schema = ColumnSchema::standard();
        assert_eq!(schema.index_of(ColumnKey::AddedToWorksheet), Some(8));
        assert!(schema.header_range("Draft Images").ends_with(":I1"));
    }

    #[test]
    fn row_follows_schema_order() {
        let schema = ColumnSchema::standard();
        let record = DraftImageRecord::new(
            Some(DraftImageId::from("id-1")),
            Some("https://img/1.png".into()),
            Some("crop tighter".into()),
            "Fractions.jsx",
        );
        let row = schema.row_for(&record);
        assert_eq!(row.0.len(), 9);
        assert_eq!(row.cell(0), "id-1");
        assert_eq!(row.cell(1), "https://img/1.png");
        assert_eq!(row.cell(2), "crop tighter");
        assert_eq!(row.cell(3), "Fractions.jsx");
        assert!(row.0[4..].iter().all(String::is_empty));
    }

    #[test]
    fn reordered_schema_reorders_cells() {
        let schema = ColumnSchema::new(vec![
            Column::new(ColumnKey::DocumentName, "Document"),
            Column::new(ColumnKey::Id, "UUID"),
        ]);
        let record = DraftImageRecord::new(Some("x".into()), None, None, "A.jsx");
        assert_eq!(schema.row_for(&record), SheetRow::from(["A.jsx", "x"]));
    }
}
