use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::stats::{AnalysisResult, SitemapStats};
use crate::utils::{ensure_dir, format_number};

pub const TEXT_REPORT_FILE: &str = "sitemap_results.txt";

/// Summary lines shared by the console output and the text report.
///
/// With `top` set, only the `top` largest manufacturers are listed instead
/// of all of them in name order.
pub fn render_summary(stats: &SitemapStats, top: Option<usize>) -> String {
    let mut out = String::new();
    // fmt::Write into a String cannot fail
    let _ = writeln!(out, "Total URLs: {}", format_number(stats.total_urls));
    let _ = writeln!(out, "Categories: {}", format_number(stats.num_categories));
    let _ = writeln!(out, "Products: {}", format_number(stats.num_products));
    let _ = writeln!(out, "Manufacturers: {}", format_number(stats.num_manufacturers));
    let _ = writeln!(out, "Other pages: {}", format_number(stats.num_other));

    let _ = writeln!(out, "\n=== CATEGORIES ===");
    for name in &stats.category_names {
        let _ = writeln!(out, "- {}", name);
    }

    match top {
        Some(limit) => {
            let ranked = stats.top_manufacturers(limit);
            let _ = writeln!(
                out,
                "\n=== TOP {} MANUFACTURERS BY PRODUCTS ===",
                ranked.len()
            );
            for (manufacturer, count) in ranked {
                let _ = writeln!(out, "- {}: {} products", manufacturer, format_number(count));
            }
        }
        None => {
            let _ = writeln!(out, "\n=== PRODUCTS BY MANUFACTURER ===");
            for (manufacturer, count) in &stats.products_by_manufacturer {
                let _ = writeln!(out, "- {}: {} products", manufacturer, format_number(*count));
            }
        }
    }

    out
}

pub fn print_analysis_results(result: &AnalysisResult, top: Option<usize>) {
    println!("\n--- Sitemap Analysis: {} ---", result.source);
    print!("{}", render_summary(&result.stats, top));
}

pub fn write_text_report(result: &AnalysisResult, output_dir: &Path) -> Result<PathBuf> {
    ensure_dir(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;
    let path = output_dir.join(TEXT_REPORT_FILE);

    let mut content = format!(
        "Sitemap: {}\nGenerated: {}\n\n",
        result.source,
        result.finished_at.format("%Y-%m-%d %H:%M:%S")
    );
    content.push_str(&render_summary(&result.stats, None));

    fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;
    info!(action = "write", component = "text_report", file_path = ?path, "Text report saved");
    Ok(path)
}
