//! Horizontal bar chart of feature attributions (SVG)

use super::importance::FeatureImportance;
use crate::error::{FusionarError, Result};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use std::path::Path;

/// Chart title
pub const CHART_CAPTION: &str = "Mean |SHAP value| per feature";

const ROW_HEIGHT: u32 = 28;
const BAR_COLOR: RGBColor = RGBColor(30, 136, 229);

fn plot_err(e: impl std::fmt::Display) -> FusionarError {
    FusionarError::Plot {
        message: e.to_string(),
    }
}

/// Render `rows` (largest first) as a bar chart, largest bar on top.
pub fn render_importance_bar(rows: &[FeatureImportance], path: &Path) -> Result<()> {
    if rows.is_empty() {
        return Err(plot_err("no features to plot"));
    }

    // bottom-to-top order so the largest bar sits at the top
    let bars: Vec<&FeatureImportance> = rows.iter().rev().collect();
    let n = bars.len();
    let max_value = bars.iter().map(|b| b.importance).fold(0.0_f64, f64::max);
    let x_max = if max_value > 0.0 { max_value * 1.1 } else { 1.0 };
    let label_width = bars.iter().map(|b| b.feature.len()).max().unwrap_or(0) as u32 * 8 + 20;

    let height = 120 + ROW_HEIGHT * n as u32;
    let root = SVGBackend::new(path, (900, height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(CHART_CAPTION, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(label_width)
        .build_cartesian_2d(0.0..x_max, (0usize..n).into_segmented())
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                bars.get(*i).map(|b| b.feature.clone()).unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        })
        .x_desc("mean(|SHAP value|)")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, bar)| {
            let top = if i + 1 == n {
                SegmentValue::Last
            } else {
                SegmentValue::Exact(i + 1)
            };
            let mut rect = Rectangle::new(
                [(0.0, SegmentValue::Exact(i)), (bar.importance, top)],
                BAR_COLOR.filled(),
            );
            rect.set_margin(3, 3, 0, 0);
            rect
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    tracing::debug!(path = %path.display(), bars = n, "rendered attribution chart");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rows() -> Vec<FeatureImportance> {
        [("commits", 0.3), ("stars", 0.1), ("forks", 0.0)]
            .iter()
            .map(|(f, v)| FeatureImportance {
                feature: f.to_string(),
                importance: *v,
            })
            .collect()
    }

    #[test]
    fn test_renders_svg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bar.svg");
        render_importance_bar(&rows(), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn test_all_zero_values_still_render() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zero.svg");
        let zero: Vec<_> = rows()
            .into_iter()
            .map(|mut r| {
                r.importance = 0.0;
                r
            })
            .collect();
        render_importance_bar(&zero, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_empty_is_error() {
        let dir = TempDir::new().unwrap();
        let err = render_importance_bar(&[], &dir.path().join("none.svg")).unwrap_err();
        assert!(matches!(err, FusionarError::Plot { .. }));
    }
}
