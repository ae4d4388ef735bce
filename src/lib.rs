pub mod analysis;
pub mod args;
pub mod chart;
pub mod classify;
pub mod config;
pub mod export;
pub mod fetch;
pub mod patterns;
pub mod report;
pub mod sitemap;
pub mod stats;
pub mod utils;

pub use analysis::{analyze_sitemap, classify_and_aggregate, export_results, load_config};
pub use args::Args;
pub use classify::{classify_urls, Classification};
pub use config::{init_default_config, Config};
pub use patterns::PatternSet;
pub use stats::{aggregate, AnalysisResult, SitemapStats};
