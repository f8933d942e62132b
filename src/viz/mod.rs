//! Chart rendering of tabular query results.

pub mod chart;
pub mod render;

use std::path::Path;

use chrono::Local;

use crate::db::executor;
use crate::types::Result;

pub use chart::{detect_chart_kind, ChartKind};

/// Execute a query and render its result as a chart image.
///
/// `chart_kind` is one of `bar`/`line`/`pie`/`scatter`/`heatmap`, or `auto`
/// to infer a kind from the result's shape. The image is written as
/// `viz_<YYYYMMDD_HHMMSS>.png` under `output_dir` (created if absent) and
/// the saved path is returned as a message.
pub fn visualize_data(
    db_path: &Path,
    sql_query: &str,
    chart_kind: &str,
    output_dir: &Path,
) -> Result<String> {
    let table = executor::execute_sql_for_viz(db_path, sql_query)?;

    if table.is_empty() {
        return Ok("Cannot visualize: Query returned no results.".to_string());
    }

    let kind = if chart_kind == "auto" {
        detect_chart_kind(&table)
    } else {
        ChartKind::parse(chart_kind)
    };

    std::fs::create_dir_all(output_dir)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let output_path = output_dir.join(format!("viz_{timestamp}.png"));

    render::render_chart(&table, kind, &output_path)?;

    tracing::info!(kind = ?kind, path = %output_path.display(), "chart rendered");
    Ok(format!("Visualization saved to: {}", output_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::example::create_example_database;
    use tempfile::TempDir;

    #[test]
    fn test_empty_result_returns_message_without_file() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("example.db");
        create_example_database(&db).unwrap();
        let out_dir = dir.path().join("visualizations");

        let message = visualize_data(
            &db,
            "SELECT city, COUNT(*) FROM customers WHERE 0 = 1 GROUP BY city",
            "auto",
            &out_dir,
        )
        .unwrap();

        assert_eq!(message, "Cannot visualize: Query returned no results.");
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_query_failure_propagates_typed_error() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("example.db");
        create_example_database(&db).unwrap();

        let result = visualize_data(&db, "SELECT * FROM nope", "auto", dir.path());

        assert!(result.is_err());
    }
}
