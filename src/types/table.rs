//! Tabular query results.
//!
//! Produced by the SQL executor, consumed by the chart renderer and the
//! text formatter. Never mutated after construction.

use serde::Serialize;

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Real(f64),
    Text(String),
    Null,
}

impl CellValue {
    /// Numeric view of the cell, if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Real(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Render the cell for textual table output.
    pub fn render(&self) -> String {
        match self {
            CellValue::Int(v) => v.to_string(),
            CellValue::Real(v) => v.to_string(),
            CellValue::Text(v) => v.clone(),
            CellValue::Null => "NULL".to_string(),
        }
    }
}

/// Rows x named columns result set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableData {
    /// Column names, in select order.
    pub columns: Vec<String>,

    /// Row-major cell values; every row has `columns.len()` cells.
    pub rows: Vec<Vec<CellValue>>,
}

impl TableData {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// A column is numeric when it has at least one non-null cell and every
    /// non-null cell is a number.
    pub fn is_numeric_column(&self, col: usize) -> bool {
        let mut seen_number = false;
        for row in &self.rows {
            match &row[col] {
                CellValue::Null => {}
                cell if cell.is_number() => seen_number = true,
                _ => return false,
            }
        }
        seen_number
    }

    /// Indices of numeric columns, in column order.
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.column_count())
            .filter(|&c| self.is_numeric_column(c))
            .collect()
    }

    /// Indices of non-numeric (categorical) columns, in column order.
    pub fn categorical_columns(&self) -> Vec<usize> {
        (0..self.column_count())
            .filter(|&c| !self.is_numeric_column(c))
            .collect()
    }

    /// One f64 per row for the given column; non-numeric and null cells
    /// become NaN so rows stay aligned across columns.
    pub fn numeric_values(&self, col: usize) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row[col].as_f64().unwrap_or(f64::NAN))
            .collect()
    }

    /// Stringified cells of the given column, one per row.
    pub fn rendered_column(&self, col: usize) -> Vec<String> {
        self.rows.iter().map(|row| row[col].render()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> TableData {
        TableData {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn test_numeric_column_detection() {
        let t = table(
            &["city", "total"],
            vec![
                vec![CellValue::Text("Paris".into()), CellValue::Real(10.5)],
                vec![CellValue::Text("Tokyo".into()), CellValue::Int(3)],
            ],
        );

        assert!(!t.is_numeric_column(0));
        assert!(t.is_numeric_column(1));
        assert_eq!(t.numeric_columns(), vec![1]);
        assert_eq!(t.categorical_columns(), vec![0]);
    }

    #[test]
    fn test_nulls_do_not_break_numeric_classification() {
        let t = table(
            &["n"],
            vec![
                vec![CellValue::Null],
                vec![CellValue::Int(7)],
                vec![CellValue::Null],
            ],
        );

        assert!(t.is_numeric_column(0));
    }

    #[test]
    fn test_all_null_column_is_not_numeric() {
        let t = table(&["n"], vec![vec![CellValue::Null], vec![CellValue::Null]]);

        assert!(!t.is_numeric_column(0));
    }

    #[test]
    fn test_numeric_values_keep_row_alignment() {
        let t = table(
            &["n"],
            vec![
                vec![CellValue::Int(1)],
                vec![CellValue::Null],
                vec![CellValue::Real(2.5)],
            ],
        );

        let values = t.numeric_values(0);
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 2.5);
    }

    #[test]
    fn test_cell_render() {
        assert_eq!(CellValue::Int(42).render(), "42");
        assert_eq!(CellValue::Real(999.99).render(), "999.99");
        assert_eq!(CellValue::Text("Laptop".into()).render(), "Laptop");
        assert_eq!(CellValue::Null.render(), "NULL");
    }
}
