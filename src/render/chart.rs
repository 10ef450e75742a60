//! Line chart of per-process queue level over rebased ticks.

use crate::Result;
use crate::model::SeriesSet;
use anyhow::bail;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

/// Draw one line per non-empty series into `out`. The backend is picked by
/// extension: `.svg` or `.png`.
pub fn render_chart(data: &SeriesSet, out: &str, size: (u32, u32)) -> Result<()> {
    if data.non_empty().next().is_none() {
        bail!("no records to plot");
    }

    let ext = Path::new(out)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("svg") => draw(&SVGBackend::new(out, size).into_drawing_area(), data),
        Some("png") => draw(&BitMapBackend::new(out, size).into_drawing_area(), data),
        _ => bail!("unsupported output format for {}: expected .svg or .png", out),
    }
}

fn draw<DB>(root: &DrawingArea<DB, Shift>, data: &SeriesSet) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let (x_range, y_range) = axis_ranges(data);

    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Ticks")
        .y_desc("Level")
        .draw()?;

    for (idx, series) in data.non_empty().enumerate() {
        let color = Palette99::pick(idx).mix(0.9);
        chart
            .draw_series(LineSeries::new(
                series.points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(format!("proc {}", series.pid))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.7))
        .border_style(BLACK.mix(0.3))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Axis ranges padded so single-point and flat series still render.
fn axis_ranges(data: &SeriesSet) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let mut x_max = f64::MIN;
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;
    for series in data.non_empty() {
        for &(x, y) in &series.points {
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    // First record is always at x = 0, so the x range starts there.
    if x_max <= 0.0 {
        x_max = 1.0;
    }
    if y_min == y_max {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = (y_max - y_min) * 0.05;

    (0.0..x_max, (y_min - pad)..(y_max + pad))
}
