use anyhow::{Context, Result};
use chrono::Local;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

use crate::chart::{self, ChartOutcome};
use crate::classify::classify_urls;
use crate::config::Config;
use crate::fetch::{self, SitemapSource};
use crate::patterns::PatternSet;
use crate::sitemap;
use crate::stats::{self, AnalysisResult, SitemapStats};
use crate::{export, report, Args};

/// Load the config file and apply command-line overrides.
pub fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::load(&args.config)?;
    if let Some(url) = &args.url {
        config.sitemap_url = url.clone();
    }
    if let Some(output) = &args.output {
        config.output.directory = output.clone();
    }
    Ok(config)
}

pub fn analyze_sitemap(config: &Config, patterns: &PatternSet) -> Result<AnalysisResult> {
    let total_start_time = Instant::now();
    info!(
        action = "start",
        component = "sitemap_analysis",
        "Starting sitemap analysis"
    );

    let source = SitemapSource::parse(&config.sitemap_url)?;
    let content = fetch::fetch_sitemap(&source, Duration::from_secs(config.output.timeout_secs))
        .with_context(|| format!("Failed to fetch sitemap from {}", source))?;
    let urls = sitemap::extract_urls(&content).context("Failed to parse sitemap")?;
    drop(content);

    let stats = classify_and_aggregate(urls, patterns);

    info!(
        action = "complete",
        component = "sitemap_analysis",
        total_urls = stats.total_urls,
        duration_ms = total_start_time.elapsed().as_millis(),
        "Analysis completed successfully"
    );

    Ok(AnalysisResult {
        source: source.to_string(),
        finished_at: Local::now(),
        stats,
    })
}

pub fn classify_and_aggregate(urls: Vec<String>, patterns: &PatternSet) -> SitemapStats {
    let start_time = Instant::now();
    let classification = classify_urls(urls, patterns);
    info!(
        action = "classify",
        component = "url_classification",
        categories = classification.categories.len(),
        products = classification.products.len(),
        other = classification.other.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "URLs classified"
    );

    let aggregate_start_time = Instant::now();
    let stats = stats::aggregate(&classification, patterns);
    info!(
        action = "aggregate",
        component = "statistics",
        category_names = stats.category_names.len(),
        manufacturers = stats.num_manufacturers,
        duration_ms = aggregate_start_time.elapsed().as_millis(),
        "Statistics generated"
    );
    stats
}

/// Write every enabled export into `output_dir`.
pub fn export_results(
    result: &AnalysisResult,
    output_dir: &Path,
    chart_top: usize,
    args: &Args,
) -> Result<()> {
    if !args.no_txt {
        let path = report::write_text_report(result, output_dir)?;
        println!("\nResults saved to {}", path.display());
    }

    if !args.no_csv {
        export::write_csv_files(&result.stats, output_dir)?;
        println!("CSV files saved in {}", output_dir.display());
    }

    if !args.no_chart {
        match chart::export_chart(&result.stats, output_dir, chart_top)? {
            ChartOutcome::Written(path) => println!("Chart saved to {}", path.display()),
            ChartOutcome::Skipped(reason) => println!("Chart not generated: {}", reason),
        }
    }

    Ok(())
}
