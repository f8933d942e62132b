//! Chart drawing on the plotters bitmap backend.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::types::{AgentError, Result, TableData};
use crate::viz::chart::ChartKind;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Render the table as the given chart kind into a PNG at `path`.
pub fn render_chart(table: &TableData, kind: ChartKind, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    match kind {
        ChartKind::Bar => draw_bar(&root, table)?,
        ChartKind::Line => draw_line(&root, table)?,
        ChartKind::Pie => draw_pie(&root, table)?,
        ChartKind::Scatter => draw_scatter(&root, table)?,
        ChartKind::Heatmap => draw_heatmap(&root, table)?,
    }

    root.present().map_err(draw_err)?;
    Ok(())
}

fn draw_err<E: std::fmt::Display>(e: E) -> AgentError {
    AgentError::viz(e.to_string())
}

fn draw_bar(root: &Area<'_>, table: &TableData) -> Result<()> {
    if table.column_count() == 2 {
        draw_labeled_bars(root, table)
    } else {
        draw_grouped_bars(root, table)
    }
}

/// Two-column table: column 0 provides bar labels, column 1 the heights.
fn draw_labeled_bars(root: &Area<'_>, table: &TableData) -> Result<()> {
    if !table.is_numeric_column(1) {
        return Err(AgentError::viz("bar chart needs a numeric value column"));
    }
    let labels = table.rendered_column(0);
    let values = table.numeric_values(1);
    let n = values.len();
    let (y_min, y_max) = bar_range(values.iter().copied());

    let mut chart = ChartBuilder::on(root)
        .caption("Bar Chart", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), y_min..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n.min(12))
        .x_label_formatter(&|seg| match seg {
            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
                labels.get(*i).cloned().unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        })
        .x_desc(table.columns[0].clone())
        .y_desc(table.columns[1].clone())
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.mix(0.6).filled())
                .margin(4)
                .data(values.iter().enumerate().map(|(i, v)| (i, *v))),
        )
        .map_err(draw_err)?;

    Ok(())
}

/// Every numeric column as grouped bars against the row index.
fn draw_grouped_bars(root: &Area<'_>, table: &TableData) -> Result<()> {
    let numeric = table.numeric_columns();
    if numeric.is_empty() {
        return Err(AgentError::viz("bar chart needs at least one numeric column"));
    }
    let n = table.row_count();
    let k = numeric.len();
    let (y_min, y_max) = bar_range(numeric.iter().flat_map(|&c| table.numeric_values(c)));

    let mut chart = ChartBuilder::on(root)
        .caption("Bar Chart", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n.min(20))
        .x_label_formatter(&|x| format!("{}", x.round() as i64))
        .draw()
        .map_err(draw_err)?;

    let group_width = 0.8 / k as f64;
    for (j, &col) in numeric.iter().enumerate() {
        let color = Palette99::pick(j).to_rgba();
        let offset = -0.4 + j as f64 * group_width;
        let values = table.numeric_values(col);

        chart
            .draw_series(
                values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.is_finite())
                    .map(move |(i, v)| {
                        let x0 = i as f64 + offset;
                        Rectangle::new([(x0, 0.0), (x0 + group_width, *v)], color.filled())
                    }),
            )
            .map_err(draw_err)?
            .label(table.columns[col].clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(draw_err)?;

    Ok(())
}

fn draw_line(root: &Area<'_>, table: &TableData) -> Result<()> {
    let numeric = table.numeric_columns();
    if numeric.is_empty() {
        return Err(AgentError::viz("line chart needs at least one numeric column"));
    }
    let n = table.row_count();
    let x_max = n.saturating_sub(1).max(1) as f64;

    // two columns with a single numeric one: plot that pair as one series,
    // the other column providing the x labels
    if table.column_count() == 2 && numeric.len() == 1 {
        let value_col = numeric[0];
        let label_col = 1 - value_col;
        let labels = table.rendered_column(label_col);
        let values = table.numeric_values(value_col);
        let (y_min, y_max) = data_range(values.iter().copied());

        let mut chart = ChartBuilder::on(root)
            .caption("Line Chart", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..x_max, y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_labels(n.min(12))
            .x_label_formatter(&|x| label_at(&labels, *x))
            .x_desc(table.columns[label_col].clone())
            .y_desc(table.columns[value_col].clone())
            .draw()
            .map_err(draw_err)?;

        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, v)| (i as f64, *v))
            .collect();
        let color = BLUE.to_rgba();
        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .map_err(draw_err)?;
        chart
            .draw_series(points.iter().map(|p| Circle::new(*p, 3, color.filled())))
            .map_err(draw_err)?;
        return Ok(());
    }

    // every numeric column as its own labeled series against the row index
    let (y_min, y_max) = data_range(numeric.iter().flat_map(|&c| table.numeric_values(c)));
    let mut chart = ChartBuilder::on(root)
        .caption("Line Chart", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_labels(n.min(20))
        .x_label_formatter(&|x| format!("{}", x.round() as i64))
        .draw()
        .map_err(draw_err)?;

    for (j, &col) in numeric.iter().enumerate() {
        let color = Palette99::pick(j).to_rgba();
        let points: Vec<(f64, f64)> = table
            .numeric_values(col)
            .into_iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, v)| (i as f64, v))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .map_err(draw_err)?
            .label(table.columns[col].clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2)));
        chart
            .draw_series(points.iter().map(|p| Circle::new(*p, 3, color.filled())))
            .map_err(draw_err)?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(draw_err)?;

    Ok(())
}

/// Column 0 as slice labels, column 1 as slice values, with percentage
/// annotations.
fn draw_pie(root: &Area<'_>, table: &TableData) -> Result<()> {
    if table.column_count() < 2 {
        return Err(AgentError::viz("pie chart needs at least two columns"));
    }
    let labels = table.rendered_column(0);
    let sizes: Vec<f64> = table
        .numeric_values(1)
        .into_iter()
        .map(|v| if v.is_finite() { v } else { 0.0 })
        .collect();
    if sizes.iter().any(|v| *v < 0.0) || sizes.iter().sum::<f64>() <= 0.0 {
        return Err(AgentError::viz("pie chart needs positive slice values"));
    }

    let title_style = TextStyle::from(("sans-serif", 24).into_font()).color(&BLACK);
    let root = root.titled("Pie Chart", title_style).map_err(draw_err)?;

    let dims = root.dim_in_pixel();
    let center = (dims.0 as i32 / 2, dims.1 as i32 / 2);
    let radius = f64::from(dims.0.min(dims.1)) * 0.35;
    let colors: Vec<RGBColor> = (0..sizes.len()).map(series_rgb).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(TextStyle::from(("sans-serif", 18).into_font()).color(&BLACK));
    pie.percentages(TextStyle::from(("sans-serif", 14).into_font()).color(&BLACK));
    root.draw(&pie).map_err(draw_err)?;

    Ok(())
}

/// First two numeric columns plotted against each other.
fn draw_scatter(root: &Area<'_>, table: &TableData) -> Result<()> {
    let numeric = table.numeric_columns();
    if numeric.len() < 2 {
        return Err(AgentError::viz(
            "scatter plot needs at least two numeric columns",
        ));
    }
    let xs = table.numeric_values(numeric[0]);
    let ys = table.numeric_values(numeric[1]);
    let points: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();

    let (x_min, x_max) = data_range(points.iter().map(|p| p.0));
    let (y_min, y_max) = data_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .caption("Scatter Plot", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc(table.columns[numeric[0]].clone())
        .y_desc(table.columns[numeric[1]].clone())
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 4, BLUE.mix(0.6).filled())),
        )
        .map_err(draw_err)?;

    Ok(())
}

/// Pairwise correlation of all numeric columns as an annotated color grid.
fn draw_heatmap(root: &Area<'_>, table: &TableData) -> Result<()> {
    let numeric = table.numeric_columns();
    if numeric.is_empty() {
        return Err(AgentError::viz("heatmap needs at least one numeric column"));
    }
    let names: Vec<String> = numeric.iter().map(|&c| table.columns[c].clone()).collect();
    let series: Vec<Vec<f64>> = numeric.iter().map(|&c| table.numeric_values(c)).collect();
    let m = numeric.len();

    let mut chart = ChartBuilder::on(root)
        .caption("Correlation Heatmap", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(80)
        .y_label_area_size(100)
        .build_cartesian_2d(0f64..m as f64, 0f64..m as f64)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(m)
        .y_labels(m)
        .x_label_formatter(&|x| label_at(&names, *x))
        .y_label_formatter(&|y| label_at(&names, *y))
        .draw()
        .map_err(draw_err)?;

    let annotation = TextStyle::from(("sans-serif", 15).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));

    for row in 0..m {
        for col in 0..m {
            let r = pearson(&series[col], &series[row]);
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [
                        (col as f64, row as f64),
                        (col as f64 + 1.0, row as f64 + 1.0),
                    ],
                    correlation_color(r).filled(),
                )))
                .map_err(draw_err)?;

            let text = if r.is_finite() {
                format!("{r:.2}")
            } else {
                "n/a".to_string()
            };
            chart
                .draw_series(std::iter::once(Text::new(
                    text,
                    (col as f64 + 0.5, row as f64 + 0.5),
                    annotation.clone(),
                )))
                .map_err(draw_err)?;
        }
    }

    Ok(())
}

/// Axis label for integer positions on a f64 axis; blank elsewhere.
fn label_at(names: &[String], position: f64) -> String {
    let rounded = position.round();
    if (position - rounded).abs() < 1e-6 {
        names.get(rounded as usize).cloned().unwrap_or_default()
    } else {
        String::new()
    }
}

/// Value range for bar charts; always includes the zero baseline.
fn bar_range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let mut min = 0.0f64;
    let mut max = 0.0f64;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if (max - min).abs() < f64::EPSILON {
        max = min + 1.0;
    }
    let pad = (max - min) * 0.05;
    (if min < 0.0 { min - pad } else { min }, max + pad)
}

/// Padded min/max of the finite values; (0, 1) when there are none.
fn data_range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 0.5, max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

/// Pearson correlation over the rows where both values are finite.
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        cov / denom
    }
}

fn correlation_color(r: f64) -> RGBColor {
    if !r.is_finite() {
        return RGBColor(200, 200, 200);
    }
    let r = r.clamp(-1.0, 1.0);
    if r >= 0.0 {
        let fade = (255.0 * (1.0 - r)) as u8;
        RGBColor(255, fade, fade)
    } else {
        let fade = (255.0 * (1.0 + r)) as u8;
        RGBColor(fade, fade, 255)
    }
}

fn series_rgb(i: usize) -> RGBColor {
    const COLORS: [RGBColor; 10] = [
        RGBColor(31, 119, 180),
        RGBColor(255, 127, 14),
        RGBColor(44, 160, 44),
        RGBColor(214, 39, 40),
        RGBColor(148, 103, 189),
        RGBColor(140, 86, 75),
        RGBColor(227, 119, 194),
        RGBColor(127, 127, 127),
        RGBColor(188, 189, 34),
        RGBColor(23, 190, 207),
    ];
    COLORS[i % COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_perfect_correlation() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];

        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_perfect_anticorrelation() {
        let xs = [1.0, 2.0, 3.0];
        let ys = [3.0, 2.0, 1.0];

        assert!((pearson(&xs, &ys) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_constant_column_is_nan() {
        let xs = [1.0, 1.0, 1.0];
        let ys = [1.0, 2.0, 3.0];

        assert!(pearson(&xs, &ys).is_nan());
    }

    #[test]
    fn test_pearson_skips_nan_rows() {
        let xs = [1.0, f64::NAN, 2.0, 3.0];
        let ys = [2.0, 5.0, 4.0, 6.0];

        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_color_extremes() {
        assert_eq!(correlation_color(1.0), RGBColor(255, 0, 0));
        assert_eq!(correlation_color(-1.0), RGBColor(0, 0, 255));
        assert_eq!(correlation_color(0.0), RGBColor(255, 255, 255));
    }

    #[test]
    fn test_bar_range_includes_zero_baseline() {
        let (min, max) = bar_range([3.0, 8.0].into_iter());
        assert_eq!(min, 0.0);
        assert!(max > 8.0);

        let (min, max) = bar_range([-4.0, 2.0].into_iter());
        assert!(min < -4.0);
        assert!(max > 2.0);
    }

    #[test]
    fn test_data_range_fallback_without_finite_values() {
        assert_eq!(data_range(std::iter::empty()), (0.0, 1.0));
        assert_eq!(data_range([f64::NAN].into_iter()), (0.0, 1.0));
    }
}
