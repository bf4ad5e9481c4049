//! Records as ordered column/value pairs

use crate::columns::ColumnSchema;
use crate::normalize::{normalize_cell, ColumnKind};
use std::fmt;

/// One record read from an export: ordered column name to raw cell text
///
/// Cells past the end of the header carry an empty column name and are never
/// normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

/// A cell rewritten by normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    /// 1-based data row number (the header is not counted)
    pub row: usize,
    pub column: String,
    pub before: String,
    pub after: String,
}

impl fmt::Display for CellChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}, column {}: '{}' -> '{}'",
            self.row, self.column, self.before, self.after
        )
    }
}

impl Row {
    pub fn new() -> Self {
        Row { cells: Vec::new() }
    }

    /// Pair cells with header names by position
    pub fn from_cells<H, C>(headers: &[H], cells: impl IntoIterator<Item = C>) -> Self
    where
        H: AsRef<str>,
        C: Into<String>,
    {
        let cells = cells
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let column = headers
                    .get(index)
                    .map(|header| header.as_ref().to_string())
                    .unwrap_or_default();
                (column, value.into())
            })
            .collect();
        Row { cells }
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.push((column.into(), value.into()));
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Replace the value of an existing column; returns false if it is absent
    pub fn set(&mut self, column: &str, value: impl Into<String>) -> bool {
        match self.cells.iter_mut().find(|(name, _)| name == column) {
            Some(cell) => {
                cell.1 = value.into();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, value)| value.as_str())
    }

    /// True when every cell is empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.trim().is_empty())
    }

    /// Normalize every cell whose column the schema classifies as JSON
    pub fn normalize(&mut self, schema: &ColumnSchema, row_number: usize) -> Vec<CellChange> {
        let targets: Vec<(usize, ColumnKind)> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, (name, _))| !name.is_empty())
            .map(|(index, (name, _))| (index, schema.kind_of(name)))
            .filter(|(_, kind)| kind.is_json())
            .collect();

        targets
            .into_iter()
            .filter_map(|(index, kind)| self.normalize_at(index, kind, row_number))
            .collect()
    }

    pub(crate) fn normalize_at(
        &mut self,
        index: usize,
        kind: ColumnKind,
        row_number: usize,
    ) -> Option<CellChange> {
        let (column, value) = self.cells.get_mut(index)?;
        let normalized = normalize_cell(value.as_str(), kind);
        if normalized == *value {
            return None;
        }

        let before = std::mem::replace(value, normalized);
        Some(CellChange {
            row: row_number,
            column: column.clone(),
            before,
            after: value.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cells_names_overflow_cells_empty() {
        let row = Row::from_cells(&["a", "b"], ["1", "2", "3"]);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["a", "b", ""]);
        assert_eq!(row.values().collect::<Vec<_>>(), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_get_and_set() {
        let mut row = Row::new();
        row.push("title", "Catan");
        assert_eq!(row.get("title"), Some("Catan"));
        assert!(row.set("title", "Settlers of Catan"));
        assert!(!row.set("missing", "x"));
        assert_eq!(row.get("title"), Some("Settlers of Catan"));
    }

    #[test]
    fn test_is_blank() {
        assert!(Row::from_cells(&["a", "b"], ["", "  "]).is_blank());
        assert!(Row::new().is_blank());
        assert!(!Row::from_cells(&["a"], ["x"]).is_blank());
    }

    #[test]
    fn test_normalize_reports_changes() {
        let schema = ColumnSchema::default();
        let mut row = Row::from_cells(
            &["title", "designers", "metadata", "categories"],
            ["Wingspan", "Elizabeth Hargrave", "", "[\"Animals\"]"],
        );

        let changes = row.normalize(&schema, 3);

        assert_eq!(row.get("title"), Some("Wingspan"));
        assert_eq!(row.get("designers"), Some(r#"["Elizabeth Hargrave"]"#));
        assert_eq!(row.get("metadata"), Some("{}"));
        assert_eq!(row.get("categories"), Some(r#"["Animals"]"#));

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].row, 3);
        assert_eq!(changes[0].column, "designers");
        assert_eq!(changes[0].before, "Elizabeth Hargrave");
        assert_eq!(
            changes[1].to_string(),
            "row 3, column metadata: '' -> '{}'"
        );
    }

    #[test]
    fn test_normalize_twice_changes_nothing() {
        let schema = ColumnSchema::default();
        let mut row = Row::from_cells(&["mechanics"], ["{Drafting,\"Set Collection\"}"]);
        assert_eq!(row.normalize(&schema, 1).len(), 1);
        assert!(row.normalize(&schema, 1).is_empty());
    }
}
