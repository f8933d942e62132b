//! Chart kind selection.

use crate::types::TableData;

/// Supported chart kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
    Heatmap,
}

impl ChartKind {
    /// Parse a kind name; anything unrecognized falls back to a bar chart.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "bar" => ChartKind::Bar,
            "line" => ChartKind::Line,
            "pie" => ChartKind::Pie,
            "scatter" => ChartKind::Scatter,
            "heatmap" => ChartKind::Heatmap,
            _ => ChartKind::Bar,
        }
    }
}

/// Infer a chart kind from the result's shape.
///
/// Decision order:
/// 1. a single row with more than one numeric column reads as a bar chart
/// 2. one categorical + one numeric column: pie for small positive-sum
///    breakdowns (<= 10 rows), otherwise bar
/// 3. two or more numeric columns read as a scatter plot
/// 4. everything else falls back to bar
pub fn detect_chart_kind(table: &TableData) -> ChartKind {
    let numeric = table.numeric_columns();
    let categorical = table.categorical_columns();

    if table.row_count() == 1 && numeric.len() > 1 {
        return ChartKind::Bar;
    }

    if categorical.len() == 1 && numeric.len() == 1 {
        if table.row_count() <= 10 {
            let sum: f64 = table
                .numeric_values(numeric[0])
                .into_iter()
                .filter(|v| v.is_finite())
                .sum();
            return if sum > 0.0 {
                ChartKind::Pie
            } else {
                ChartKind::Bar
            };
        }
        return ChartKind::Bar;
    }

    if numeric.len() >= 2 {
        return ChartKind::Scatter;
    }

    ChartKind::Bar
}
