//! Bar chart of the manufacturers with the most products.
//!
//! Rendering lives behind the `chart` cargo feature. Without it the export is
//! skipped with a warning instead of failing the run.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::stats::SitemapStats;

pub const CHART_FILE: &str = "top_manufacturers.svg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutcome {
    Written(PathBuf),
    Skipped(&'static str),
}

pub fn export_chart(stats: &SitemapStats, output_dir: &Path, top: usize) -> Result<ChartOutcome> {
    let ranked = stats.top_manufacturers(top);
    if ranked.is_empty() {
        warn!(action = "skip", component = "chart_export", "No manufacturers to chart");
        return Ok(ChartOutcome::Skipped("no manufacturers were extracted"));
    }

    render(&ranked, output_dir)
}

#[cfg(feature = "chart")]
fn render(ranked: &[(&str, usize)], output_dir: &Path) -> Result<ChartOutcome> {
    use anyhow::Context;
    use plotters::prelude::*;
    use tracing::info;

    crate::utils::ensure_dir(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;
    let path = output_dir.join(CHART_FILE);

    let max_count = ranked.iter().map(|(_, count)| *count).max().unwrap_or(1);
    let y_max = max_count + max_count / 10 + 1;
    let draw_error = |e: &dyn std::fmt::Display| anyhow::anyhow!("Failed to draw chart: {}", e);

    {
        let root = SVGBackend::new(&path, (1200, 800)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| draw_error(&e))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Top {} Manufacturers by Product Count", ranked.len()),
                ("sans-serif", 28),
            )
            .margin(20)
            .x_label_area_size(160)
            .y_label_area_size(60)
            .build_cartesian_2d((0..ranked.len()).into_segmented(), 0..y_max)
            .map_err(|e| draw_error(&e))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(ranked.len())
            .x_label_style(
                ("sans-serif", 14)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .x_label_formatter(&|segment: &SegmentValue<usize>| match segment {
                SegmentValue::CenterOf(i) => ranked
                    .get(*i)
                    .map(|(name, _)| name.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .x_desc("Manufacturer")
            .y_desc("Number of Products")
            .draw()
            .map_err(|e| draw_error(&e))?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(BLUE.mix(0.7).filled())
                    .margin(4)
                    .data(ranked.iter().enumerate().map(|(i, (_, count))| (i, *count))),
            )
            .map_err(|e| draw_error(&e))?;

        root.present().map_err(|e| draw_error(&e))?;
    }

    info!(action = "write", component = "chart_export", file_path = ?path, bar_count = ranked.len(), "Chart saved");
    Ok(ChartOutcome::Written(path))
}

#[cfg(not(feature = "chart"))]
fn render(_ranked: &[(&str, usize)], _output_dir: &Path) -> Result<ChartOutcome> {
    warn!(
        action = "skip",
        component = "chart_export",
        "Chart support is not compiled in; rebuild with `--features chart` to enable it"
    );
    Ok(ChartOutcome::Skipped("built without the `chart` feature"))
}
