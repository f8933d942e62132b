//! SQL execution against a file-backed SQLite database.
//!
//! The connection is opened and closed per call; there is no pooling and no
//! transaction spanning calls. The query string is passed through unmodified
//! (the model is instructed to produce read-only SELECTs, nothing enforces
//! it here).

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::types::{CellValue, Result, TableData};

/// Fixed sentinel returned for an empty result set.
pub const NO_RESULTS: &str = "Query executed successfully but returned no results.";

/// List all user tables with their column names and declared types.
///
/// Internal `sqlite_%` tables are filtered out so the report covers exactly
/// the tables the user created.
pub fn list_tables(db_path: &Path) -> Result<String> {
    let conn = Connection::open(db_path)?;

    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut report = String::from("Database Tables:\n\n");
    for name in names {
        report.push_str(&format!("Table: {name}\n"));
        report.push_str("Columns:\n");

        let mut info = conn.prepare(&format!("PRAGMA table_info({name})"))?;
        let columns = info.query_map([], |row| {
            Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?;
        for column in columns {
            let (col_name, col_type) = column?;
            report.push_str(&format!("  - {col_name} ({col_type})\n"));
        }
        report.push('\n');
    }

    tracing::debug!(db = %db_path.display(), "listed tables");
    Ok(report)
}

/// Execute a query and return the results as formatted text.
///
/// Empty result sets return [`NO_RESULTS`]; otherwise a row-count header
/// plus an aligned rendering of all rows.
pub fn execute_sql(db_path: &Path, sql_query: &str) -> Result<String> {
    let table = execute_sql_for_viz(db_path, sql_query)?;

    if table.is_empty() {
        return Ok(NO_RESULTS.to_string());
    }

    Ok(format!(
        "Query Results ({} rows):\n\n{}",
        table.row_count(),
        render_table(&table)
    ))
}

/// Execute a query and return the structured table, for the chart renderer.
///
/// Unlike [`execute_sql`], failures here stay typed: the caller is expected
/// to propagate them.
pub fn execute_sql_for_viz(db_path: &Path, sql_query: &str) -> Result<TableData> {
    let conn = Connection::open(db_path)?;
    let mut stmt = conn.prepare(sql_query)?;

    let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut result_rows = stmt.query([])?;
    while let Some(row) = result_rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(match row.get_ref(i)? {
                ValueRef::Null => CellValue::Null,
                ValueRef::Integer(v) => CellValue::Int(v),
                ValueRef::Real(v) => CellValue::Real(v),
                ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
                ValueRef::Blob(_) => CellValue::Text("<blob>".to_string()),
            });
        }
        rows.push(cells);
    }

    tracing::debug!(db = %db_path.display(), rows = rows.len(), "executed query");
    Ok(TableData { columns, rows })
}

/// Column-aligned rendering of a result set, header row first.
fn render_table(table: &TableData) -> String {
    let rendered: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(CellValue::render).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(String::len).collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:>width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = format_row(&table.columns);
    out.push('\n');
    for row in &rendered {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out
}
